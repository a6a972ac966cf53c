//! Structural comparison of two documents.
//!
//! Two documents are structurally identical when they hold the same data once
//! normalized, regardless of mapping key order. Normalization absorbs the
//! differences tools commonly introduce when rewriting a document:
//!
//! - an empty or null `paths` section is the same as no section,
//! - `explode` and `style` of path parameters are dropped (they only restate defaults),
//! - keys of mapping-valued `example` entries are sorted.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::SplitError;
use crate::model::{Mapping, Node, PATHS_KEY};
use crate::yaml::load_node;

const PARAMETERS_KEY: &str = "parameters";
const EXAMPLE_KEY: &str = "example";

/// Normalizes a document in place before comparison.
pub fn normalize(document: &mut Node) {
    if let Node::Mapping(root) = document {
        if root.get(PATHS_KEY).is_some_and(Node::is_empty) {
            root.shift_remove(PATHS_KEY);
        }
    }
    normalize_node(document);
}

fn normalize_node(node: &mut Node) {
    match node {
        Node::Mapping(mapping) => {
            if let Some(Node::Sequence(parameters)) = mapping.get_mut(PARAMETERS_KEY) {
                parameters
                    .iter_mut()
                    .filter_map(Node::as_mapping_mut)
                    .filter(|parameter| {
                        parameter.get("in").and_then(Node::as_str) == Some("path")
                    })
                    .for_each(|parameter| {
                        parameter.shift_remove("explode");
                        parameter.shift_remove("style");
                    });
            }
            if let Some(Node::Mapping(example)) = mapping.get_mut(EXAMPLE_KEY) {
                example.sort_keys();
            }
            mapping.values_mut().for_each(normalize_node);
        }
        Node::Sequence(items) => items.iter_mut().for_each(normalize_node),
        Node::Reference(reference) => reference.siblings.values_mut().for_each(normalize_node),
        Node::Scalar(_) => {}
    }
}

/// Deep equality ignoring mapping key order.
///
/// Sequences compare in order, scalars by type and value, references by target
/// and siblings.
#[must_use]
pub fn structurally_equal(left: &Node, right: &Node) -> bool {
    match (left, right) {
        (Node::Mapping(left), Node::Mapping(right)) => mappings_equal(left, right),
        (Node::Sequence(left), Node::Sequence(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(left, right)| structurally_equal(left, right))
        }
        (Node::Scalar(left), Node::Scalar(right)) => left == right,
        (Node::Reference(left), Node::Reference(right)) => {
            left.target == right.target && mappings_equal(&left.siblings, &right.siblings)
        }
        _ => false,
    }
}

fn mappings_equal(left: &Mapping, right: &Mapping) -> bool {
    left.len() == right.len()
        && left.iter().all(|(key, value)| {
            right
                .get(key)
                .is_some_and(|other| structurally_equal(value, other))
        })
}

/// Normalizes both documents, then compares them.
#[must_use]
pub fn compare_documents(mut left: Node, mut right: Node) -> bool {
    normalize(&mut left);
    normalize(&mut right);
    structurally_equal(&left, &right)
}

/// Verdict of a file comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// First file.
    pub left: PathBuf,
    /// Second file.
    pub right: PathBuf,
    /// `true` when both files are structurally identical.
    pub identical: bool,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.identical { "identical" } else { "different" };
        write!(
            f,
            "YAML files '{}' and '{}' are structurally {verdict}.",
            self.left.display(),
            self.right.display()
        )
    }
}

/// Loads two YAML files and compares them structurally.
///
/// # Errors
///
/// Fails if either file cannot be read or parsed.
pub fn compare_files(
    left: impl AsRef<Path>,
    right: impl AsRef<Path>,
) -> Result<Comparison, SplitError> {
    let (left, right) = (left.as_ref(), right.as_ref());
    let identical = compare_documents(load_node(left)?, load_node(right)?);
    debug!(left = %left.display(), right = %right.display(), identical, "compared files");

    Ok(Comparison {
        left: left.to_path_buf(),
        right: right.to_path_buf(),
        identical,
    })
}
