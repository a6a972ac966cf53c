//! Decomposition of a monolithic document into a tree of files.
//!
//! # Overview
//!
//! The [`Decomposer`] turns one large document into:
//! - one file per path, below the paths directory, bundling the request and
//!   response definitions only that path needs,
//! - one file per shared definition, grouped by the tag of the operations using it,
//! - a root document referencing the path files.
//!
//! Every `$ref` is rewritten relative to the file it ends up in, so the layout
//! can be consumed by any tool resolving relative references.
//!
//! # Example
//!
//! ```rust,no_run
//! use oasplit_core::Document;
//! use oasplit_core::split::{Decomposer, DocumentSplitExt, SplitConfig, write_layout};
//! use std::path::Path;
//!
//! let config = SplitConfig::default().with_shared_label("common");
//! let document = Document::load("openapi.yaml")?;
//!
//! let result = document.split_with(Decomposer::new(config.clone()));
//! write_layout(&result, Path::new("decomposed"), &config)?;
//! # Ok::<(), oasplit_core::SplitError>(())
//! ```
//!
//! Each step is also available on its own ([`unify_duplicates`],
//! [`Classification`], [`PlacementResolver`], [`rewrite_references`]) for
//! tools that need a different layout.

mod classify;
mod config;
mod decomposer;
mod fragment;
mod output;
mod paths;
mod placement;
mod rewrite;
mod root;
mod splitter;
mod unify;

pub use classify::{Classification, DefinitionClass};
pub use config::SplitConfig;
pub use decomposer::Decomposer;
pub use fragment::{Fragment, FragmentKind, SplitResult};
pub use output::write_layout;
pub use paths::{
    OPERATIONS_KEY, PathPlan, local_closure, order_operations, path_file_name, path_subdir,
};
pub use placement::{Placement, PlacementMap, PlacementResolver};
pub use rewrite::{
    Location, LocationMap, dangling_pointers, file_component, normalize, relative_path,
    resolve_relative, rewrite_references, to_ref_path,
};
pub use root::assemble_root;
pub use splitter::{DocumentSplitExt, DocumentSplitter};
pub use unify::{DuplicateMap, canonical_name, duplicate_map, unify_duplicates};
