//! # oasplit Core
//!
//! Decompose a monolithic OpenAPI document into a tree of small files, and audit the result.
//!
//! This crate provides three main tools:
//! - **[`Decomposer`](split::Decomposer)** - split a document into path files, definition files and a root document
//! - **[`check_cycles`](graph::check_cycles)** - detect reference cycles between the files of a layout
//! - **[`compare_files`](compare::compare_files)** - check two documents are structurally identical
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oasplit_core::Document;
//! use oasplit_core::split::{Decomposer, DocumentSplitExt, SplitConfig, write_layout};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), oasplit_core::SplitError> {
//! let config = SplitConfig::default();
//! let document = Document::load("openapi.yaml")?;
//!
//! let result = document.split_with(Decomposer::new(config.clone()));
//! write_layout(&result, Path::new("api"), &config)?;
//!
//! let report = oasplit_core::graph::check_cycles("api")?;
//! assert!(report.is_clean());
//! # Ok(())
//! # }
//! ```
//!
//! ## Output Layout
//!
//! With the default [`SplitConfig`](split::SplitConfig):
//!
//! ```text
//! api/
//! ├── root.yaml                          # metadata, paths as $refs, other components
//! ├── paths/
//! │   └── users/
//! │       ├── users.yaml                 # operations + bundled CreateUserRequest
//! │       └── users__id.yaml
//! └── components/schemas/
//!     ├── Health.yaml                    # used by no tagged operation
//!     ├── shared/Money.yaml              # used by several tags
//!     └── users/User.yaml                # used by the `users` tag only
//! ```
//!
//! Definitions whose name ends with `Request`, `Response`, `RequestBody` or
//! `ResponseBody` are bundled in the file of the first path using them. Other
//! definitions get their own file, placed after the tags of the operations
//! depending on them, directly or through other definitions.
//!
//! Only schemas move out of the root. Other component pointers used by an
//! operation, such as `#/components/parameters/Page`, are kept as written in the
//! path file, where they do not resolve; decomposition logs each of them with
//! `warn!` (see [`dangling_pointers`](split::dangling_pointers)).
//!
//! ## Duplicate Definitions
//!
//! Generators often emit `User` and `User_1` for the same type. Before
//! decomposing, every `<Name>_<digits>` definition whose `<Name>` also exists is
//! merged into it (see [`unify_duplicates`](split::unify_duplicates)).
//!
//! ## Checking the Result
//!
//! [`reassemble`](bundle::reassemble) rebuilds a single document from a layout,
//! and [`compare_documents`](compare::compare_documents) tells whether it matches
//! the input:
//!
//! ```rust
//! use oasplit_core::Document;
//! use oasplit_core::bundle::reassemble;
//! use oasplit_core::compare::compare_documents;
//! use oasplit_core::split::{Decomposer, DocumentSplitExt};
//!
//! # fn main() -> Result<(), oasplit_core::SplitError> {
//! let document = Document::parse(r"
//! openapi: 3.0.3
//! paths:
//!   /ping:
//!     get:
//!       responses:
//!         '200':
//!           content:
//!             application/json:
//!               schema:
//!                 $ref: '#/components/schemas/Pong'
//! components:
//!   schemas:
//!     Pong:
//!       type: string
//! ")?;
//!
//! let layout = document.clone().split_with(Decomposer::default());
//! let reassembled = reassemble(&layout)?;
//!
//! assert!(compare_documents(document.into_node(), reassembled.into_node()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns a [`SplitError`]. Decomposition itself never
//! fails once the document is loaded: references to unknown definitions are left
//! untouched, and logged at `debug` level through [`tracing`].

mod error;

pub mod bundle;
pub mod compare;
pub mod graph;
pub mod model;
pub mod split;
pub mod yaml;

pub use self::error::SplitError;
pub use self::model::{Document, Mapping, Node, RefTarget, Reference, Scalar};
pub use self::yaml::ToYaml;
