//! The `DocumentSplitter` trait for decomposing documents.

use serde::Serialize;

use super::SplitResult;
use crate::Document;

/// Trait for splitting a document into an entry document and fragments.
///
/// # Implementing Custom Splitters
///
/// ```rust
/// use oasplit_core::{Document, Node};
/// use oasplit_core::split::{DocumentSplitter, SplitResult};
///
/// /// Keeps everything in a single file.
/// struct KeepWhole;
///
/// impl DocumentSplitter for KeepWhole {
///     type Fragment = Node;
///
///     fn split(&self, document: Document) -> SplitResult<Self::Fragment> {
///         SplitResult::new("openapi.yaml", document.into_node())
///     }
/// }
/// ```
///
/// # Built-in Implementations
///
/// * [`Decomposer`](super::Decomposer) - one file per path and per global definition
pub trait DocumentSplitter {
    /// The type of content extracted into fragments.
    type Fragment: Serialize;

    /// Splits the document into an entry document and fragments.
    ///
    /// This method consumes the input document and returns:
    /// - The entry document with `$ref` pointing to the fragment files
    /// - The fragments to be written to separate files
    fn split(&self, document: Document) -> SplitResult<Self::Fragment>;
}

/// Extension trait for convenient splitting of documents.
pub trait DocumentSplitExt {
    /// Splits this document using the provided splitter.
    ///
    /// This is a convenience method that calls `splitter.split(self)`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use oasplit_core::split::{Decomposer, DocumentSplitExt};
    ///
    /// let document = Document::load("openapi.yaml")?;
    /// let result = document.split_with(Decomposer::default());
    /// ```
    fn split_with<S: DocumentSplitter>(self, splitter: S) -> SplitResult<S::Fragment>;
}

impl DocumentSplitExt for Document {
    fn split_with<S: DocumentSplitter>(self, splitter: S) -> SplitResult<S::Fragment> {
        splitter.split(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    struct NoOpSplitter;

    impl DocumentSplitter for NoOpSplitter {
        type Fragment = Node;

        fn split(&self, document: Document) -> SplitResult<Self::Fragment> {
            SplitResult::new("root.yaml", document.into_node())
        }
    }

    #[test]
    fn should_implement_split_ext() {
        let document = Document::parse("openapi: 3.0.3\n").expect("a valid document");
        let result = document.split_with(NoOpSplitter);

        assert!(result.is_unsplit());
        assert!(result.main.get("openapi").is_some());
    }
}
