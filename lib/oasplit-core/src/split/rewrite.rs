//! Rewriting of definition references into file-relative references.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::model::{Node, RefTarget};

/// Final location of a definition in the decomposed layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Location {
    /// File holding the definition, relative to the output directory.
    pub file: PathBuf,
    /// In-file JSON pointer (without `#`), `None` when the file is the definition itself.
    pub anchor: Option<String>,
}

impl Location {
    /// A definition that is a whole file.
    pub fn file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            anchor: None,
        }
    }

    /// A definition living inside a file, at `anchor`.
    pub fn anchored(file: impl Into<PathBuf>, anchor: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            anchor: Some(anchor.into()),
        }
    }
}

/// Definition name to final location.
pub type LocationMap = BTreeMap<String, Location>;

/// Rewrites every definition reference of `node` into a reference relative to `file`.
///
/// `file` is where `node` will be written; both it and the locations are relative
/// to the output directory. References to definitions absent from `locations`
/// are left untouched, and so are anchored references to the file itself, which
/// stay in-document pointers.
///
/// Returns the number of rewritten references.
pub fn rewrite_references(node: &mut Node, file: &Path, locations: &LocationMap) -> usize {
    let base = file.parent().unwrap_or(Path::new(""));
    let mut rewritten = 0;

    node.visit_references_mut(&mut |reference| {
        let RefTarget::Definition(name) = &reference.target else {
            return;
        };
        let Some(location) = locations.get(name) else {
            debug!(%name, file = %file.display(), "reference left unchanged");
            return;
        };
        if location.file == file && location.anchor.is_some() {
            return;
        }

        reference.target = RefTarget::External {
            path: to_ref_path(&relative_path(base, &location.file)),
            anchor: location.anchor.clone(),
        };
        rewritten += 1;
    });

    rewritten
}

/// In-document references of `node` that do not resolve inside `node`.
///
/// A fragment keeps pointers such as `#/components/parameters/Page` as they
/// were in the input; once written to its own file they point nowhere.
#[must_use]
pub fn dangling_pointers(node: &Node) -> Vec<String> {
    let mut dangling = Vec::new();
    node.visit_references(&mut |reference| {
        if matches!(reference.target, RefTarget::External { .. }) {
            return;
        }
        let raw = reference.target.to_string();
        let resolved = raw
            .strip_prefix('#')
            .is_some_and(|pointer| node.pointer(pointer).is_some());
        if !resolved {
            dangling.push(raw);
        }
    });
    dangling
}

/// Turns a free-form label (a tag, a path segment) into a single file name component.
///
/// Separators become `_`; labels that would still leave the directory
/// (`..`, `.`, empty, drive prefixes) give `None`.
///
/// ```rust
/// use oasplit_core::split::file_component;
///
/// assert_eq!(file_component("orders").as_deref(), Some("orders"));
/// assert_eq!(file_component("../escaped").as_deref(), Some(".._escaped"));
/// assert_eq!(file_component("/admin").as_deref(), Some("_admin"));
/// assert_eq!(file_component(".."), None);
/// ```
#[must_use]
pub fn file_component(label: &str) -> Option<String> {
    let candidate = label.replace(['/', '\\'], "_");
    let mut components = Path::new(&candidate).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    single.then_some(candidate)
}

/// Computes `target` relative to the directory `base`, both relative to the same root.
///
/// ```rust
/// use oasplit_core::split::relative_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     relative_path(Path::new("paths/users"), Path::new("components/schemas/User.yaml")),
///     PathBuf::from("../../components/schemas/User.yaml")
/// );
/// ```
#[must_use]
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = normalize(base);
    let target = normalize(target);
    let base_parts: Vec<_> = base.components().collect();
    let target_parts: Vec<_> = target.components().collect();

    let common = base_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(left, right)| left == right)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push(Component::ParentDir);
    }
    for part in target_parts.iter().skip(common) {
        result.push(part);
    }
    result
}

/// Resolves a reference path found in `file` against the directory of `file`.
#[must_use]
pub fn resolve_relative(file: &Path, reference: &str) -> PathBuf {
    let base = file.parent().unwrap_or(Path::new(""));
    normalize(&base.join(reference))
}

/// Lexically removes `.` and `..` components.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }
    parts.iter().collect()
}

/// Formats a path with forward slashes, as `$ref` values require.
#[must_use]
pub fn to_ref_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
