//! Fragment types for decomposed documents.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// What a fragment holds, used to read a layout back.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FragmentKind {
    /// A single global definition; the whole file is its body.
    Definition(String),
    /// The operations of one path, plus the local definitions it bundles.
    Path(String),
}

/// A piece of the input document written to its own file.
///
/// # Type Parameters
///
/// * `T` - The type of content in this fragment. Must implement [`Serialize`] for file output.
///
/// # Example
///
/// ```rust
/// use oasplit_core::Node;
/// use oasplit_core::split::{Fragment, FragmentKind};
/// use std::path::PathBuf;
///
/// let fragment = Fragment::new(
///     "components/schemas/users/User.yaml",
///     FragmentKind::Definition("User".to_string()),
///     Node::mapping(),
/// );
/// assert_eq!(fragment.path, PathBuf::from("components/schemas/users/User.yaml"));
/// ```
#[derive(Debug, Clone)]
pub struct Fragment<T: Serialize> {
    /// Path of the file, relative to the output directory.
    pub path: PathBuf,

    /// What the file holds.
    pub kind: FragmentKind,

    /// The content to serialize into the fragment file.
    pub content: T,
}

impl<T: Serialize> Fragment<T> {
    /// Creates a new fragment with the given path, kind and content.
    pub fn new(path: impl Into<PathBuf>, kind: FragmentKind, content: T) -> Self {
        Self {
            path: path.into(),
            kind,
            content,
        }
    }
}

/// The result of decomposing a document.
///
/// Contains the entry document (whose paths are `$ref`s to the path files) and
/// the fragments to be written next to it. All paths are relative to the output
/// directory.
///
/// # Type Parameters
///
/// * `T` - The type of content in the fragments. Must implement [`Serialize`].
#[derive(Debug, Clone)]
pub struct SplitResult<T: Serialize> {
    /// Path of the entry document.
    pub main_path: PathBuf,

    /// The entry document with `$ref` references to the fragments.
    pub main: T,

    /// Fragments to be written to separate files.
    pub fragments: Vec<Fragment<T>>,
}

impl<T: Serialize> SplitResult<T> {
    /// Creates a new split result with no fragments.
    pub fn new(main_path: impl Into<PathBuf>, main: T) -> Self {
        Self {
            main_path: main_path.into(),
            main,
            fragments: Vec::new(),
        }
    }

    /// Adds a fragment to the result.
    pub fn add_fragment(&mut self, fragment: Fragment<T>) {
        self.fragments.push(fragment);
    }

    /// Returns `true` if there are no fragments (no splitting occurred).
    #[must_use]
    pub fn is_unsplit(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the number of fragments.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Finds the fragment written at `path`.
    #[must_use]
    pub fn fragment(&self, path: &Path) -> Option<&Fragment<T>> {
        self.fragments.iter().find(|fragment| fragment.path == path)
    }

    /// Fragments holding a single definition.
    pub fn definition_fragments(&self) -> impl Iterator<Item = &Fragment<T>> {
        self.fragments
            .iter()
            .filter(|fragment| matches!(fragment.kind, FragmentKind::Definition(_)))
    }

    /// Fragments holding path operations.
    pub fn path_fragments(&self) -> impl Iterator<Item = &Fragment<T>> {
        self.fragments
            .iter()
            .filter(|fragment| matches!(fragment.kind, FragmentKind::Path(_)))
    }
}
