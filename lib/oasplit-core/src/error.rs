use std::path::PathBuf;

use crate::yaml::YamlError;

/// Errors that can occur while loading, decomposing or writing documents.
///
/// Every variant carries enough context (file path, origin or offending reference)
/// to be reported as-is to the user.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum SplitError {
    /// File system error on a specific path.
    ///
    /// Occurs when reading an input document, writing an output file or swapping
    /// the staged output tree into place.
    #[display("I/O error on '{}': {source}", path.display())]
    #[from(skip)]
    Io {
        /// The path being read, written or moved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The YAML text could not be parsed.
    #[display("Failed to parse YAML from {origin}: {source}")]
    #[from(skip)]
    Parse {
        /// Where the text came from, usually a file path.
        origin: String,
        /// The underlying parser error.
        source: serde_saphyr::Error,
    },

    /// A node could not be serialized to YAML.
    Serialize(YamlError),

    /// The document does not have the expected shape.
    ///
    /// Occurs when the root is not a mapping, or when `paths` / `components`
    /// hold something other than a mapping.
    #[display("Invalid document: {reason}")]
    #[from(skip)]
    InvalidDocument {
        /// Description of the structural problem.
        reason: String,
    },

    /// A reference in a decomposed layout points to a file that is not part of it.
    #[display("Unresolved reference '{target}' in '{}'", file.display())]
    #[from(skip)]
    UnresolvedReference {
        /// The file holding the reference.
        file: PathBuf,
        /// The raw reference target.
        target: String,
    },
}

impl SplitError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }
}
