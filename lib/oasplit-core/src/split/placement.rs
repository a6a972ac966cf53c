//! Placement of global definitions in the definitions tree, inferred from the
//! operation tags that consume them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::warn;

use crate::Document;
use crate::model::Node;

use super::SplitConfig;
use super::rewrite::file_component;

const TAGS_KEY: &str = "tags";

/// Subdirectory of a global definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placement {
    /// Not consumed by any tagged operation: top of the definitions tree.
    Root,
    /// Consumed by operations of a single tag.
    Tag(String),
    /// Consumed by operations of several tags.
    Shared,
}

impl Placement {
    /// Derives the placement from the set of consuming tags.
    ///
    /// Any multiplicity collapses to [`Placement::Shared`], regardless of order.
    #[must_use]
    pub fn from_tags<S: AsRef<str>>(tags: &BTreeSet<S>) -> Self {
        let mut iter = tags.iter();
        match (iter.next(), iter.next()) {
            (None, _) => Self::Root,
            (Some(tag), None) => Self::Tag(tag.as_ref().to_string()),
            (Some(_), Some(_)) => Self::Shared,
        }
    }

    /// Directory of the definition files with this placement, relative to the output directory.
    ///
    /// A tag always gives a single directory below the definitions directory:
    /// separators are replaced, and a tag with nothing usable left (`..`) falls
    /// back to the shared directory.
    #[must_use]
    pub fn directory(&self, config: &SplitConfig) -> PathBuf {
        let base = config.definitions_dir();
        match self {
            Self::Root => base.to_path_buf(),
            Self::Tag(tag) => match file_component(tag) {
                Some(label) => base.join(label),
                None => {
                    warn!(%tag, "tag is not a valid directory name, using the shared directory");
                    base.join(config.shared_label())
                }
            },
            Self::Shared => base.join(config.shared_label()),
        }
    }
}

/// Global definition name to placement.
pub type PlacementMap = BTreeMap<String, Placement>;

#[derive(Debug)]
struct OperationUsage<'a> {
    tags: Vec<&'a str>,
    definitions: BTreeSet<&'a str>,
}

/// Resolves which operation tags depend on a definition, directly or through
/// other definitions.
///
/// The reference graph is indexed once; every resolution then walks it
/// backwards, from a definition to the definitions referencing it.
#[derive(Debug)]
pub struct PlacementResolver<'a> {
    operations: Vec<OperationUsage<'a>>,
    referrers: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> PlacementResolver<'a> {
    /// Indexes the operations and definitions of `document`.
    #[must_use]
    pub fn new(document: &'a Document) -> Self {
        let operations = document
            .paths()
            .into_iter()
            .flat_map(|paths| paths.values())
            .filter_map(Node::as_mapping)
            .flat_map(|item| item.values())
            .filter(|operation| operation.as_mapping().is_some())
            .map(|operation| OperationUsage {
                tags: operation_tags(operation),
                definitions: operation.definition_refs(),
            })
            .collect();

        let mut referrers: BTreeMap<&'a str, BTreeSet<&'a str>> = BTreeMap::new();
        for (name, body) in document.definitions().into_iter().flatten() {
            for target in body.definition_refs() {
                if target != name {
                    referrers.entry(target).or_default().insert(name.as_str());
                }
            }
        }

        Self {
            operations,
            referrers,
        }
    }

    /// Tags of the operations depending on `name`, directly or transitively.
    ///
    /// Each definition is visited at most once per resolution, so shared
    /// ancestors and cycles are walked a single time.
    #[must_use]
    pub fn tags_for(&self, name: &str) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut pending = vec![name];

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            for operation in &self.operations {
                if operation.definitions.contains(current) {
                    tags.extend(operation.tags.iter().copied());
                }
            }
            if let Some(referrers) = self.referrers.get(current) {
                pending.extend(referrers.iter().copied());
            }
        }

        tags.into_iter().map(String::from).collect()
    }

    /// Placement of a single definition.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Placement {
        Placement::from_tags(&self.tags_for(name))
    }

    /// Placements of all `names`.
    pub fn resolve_all<'n, I>(&self, names: I) -> PlacementMap
    where
        I: IntoIterator<Item = &'n String>,
    {
        names
            .into_iter()
            .map(|name| (name.clone(), self.resolve(name)))
            .collect()
    }
}

fn operation_tags(operation: &Node) -> Vec<&str> {
    operation
        .get(TAGS_KEY)
        .and_then(Node::as_sequence)
        .unwrap_or_default()
        .iter()
        .filter_map(Node::as_str)
        .collect()
}
