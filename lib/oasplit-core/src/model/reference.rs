use std::fmt;

use super::{Mapping, Node};

/// JSON pointer prefix of named definitions inside a single document.
pub const DEFINITIONS_POINTER: &str = "#/components/schemas/";

/// The target of a `$ref`, classified once at parse time.
///
/// Matching references structurally on this enum avoids any textual search:
/// a definition named `User` never matches a reference to `UserList`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefTarget {
    /// A named definition of the same document (`#/components/schemas/<name>`).
    Definition(String),

    /// Another file, optionally anchored (`../User.yaml`, `./paths/users.yaml#/operations`).
    ///
    /// The anchor is stored without its leading `#`.
    External {
        /// File path, relative to the referencing file or absolute (URL).
        path: String,
        /// In-file JSON pointer, without the `#`.
        anchor: Option<String>,
    },

    /// Any other in-document pointer (`#/components/responses/NotFound`).
    Pointer(String),
}

impl RefTarget {
    /// Classifies a raw `$ref` string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(DEFINITIONS_POINTER) {
            if !name.is_empty() && !name.contains('/') {
                return Self::Definition(name.to_string());
            }
        }
        if raw.starts_with('#') {
            return Self::Pointer(raw.to_string());
        }
        match raw.split_once('#') {
            Some((path, anchor)) => Self::External {
                path: path.to_string(),
                anchor: Some(anchor.to_string()),
            },
            None => Self::External {
                path: raw.to_string(),
                anchor: None,
            },
        }
    }

    /// Builds an in-document reference to a named definition.
    pub fn definition(name: impl Into<String>) -> Self {
        Self::Definition(name.into())
    }

    /// Returns the definition name when this targets a named definition.
    #[must_use]
    pub fn definition_name(&self) -> Option<&str> {
        match self {
            Self::Definition(name) => Some(name),
            Self::External { .. } | Self::Pointer(_) => None,
        }
    }
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition(name) => write!(f, "{DEFINITIONS_POINTER}{name}"),
            Self::External {
                path,
                anchor: Some(anchor),
            } => write!(f, "{path}#{anchor}"),
            Self::External { path, anchor: None } => f.write_str(path),
            Self::Pointer(raw) => f.write_str(raw),
        }
    }
}

/// A `$ref` node.
///
/// Keys living next to `$ref` in the same mapping (`description`, `summary`, ...)
/// are kept as siblings so the node serializes back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// What the reference points to.
    pub target: RefTarget,
    /// The other keys of the `$ref` mapping, in document order.
    pub siblings: Mapping,
}

impl Reference {
    /// Creates a reference without siblings.
    #[must_use]
    pub fn new(target: RefTarget) -> Self {
        Self {
            target,
            siblings: Mapping::new(),
        }
    }
}

impl From<Reference> for Node {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}
