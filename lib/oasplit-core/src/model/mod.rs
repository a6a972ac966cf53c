//! In-memory representation of API description documents.
//!
//! A document is a tree of [`Node`]s. References are first-class: any mapping
//! holding a string `$ref` is turned into a [`Reference`] while parsing, with its
//! target classified as a [`RefTarget`].

mod document;
mod node;
mod reference;

pub use document::{COMPONENTS_KEY, Document, PATHS_KEY, SCHEMAS_KEY};
pub use node::{Mapping, Node, REF_KEY, Scalar};
pub use reference::{DEFINITIONS_POINTER, RefTarget, Reference};
