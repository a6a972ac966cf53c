use std::path::Path;

use super::{Mapping, Node};
use crate::SplitError;
use crate::yaml::{from_yaml, load_node};

/// Key of the operations-by-path section.
pub const PATHS_KEY: &str = "paths";
/// Key of the components section.
pub const COMPONENTS_KEY: &str = "components";
/// Key of the named definitions inside the components section.
pub const SCHEMAS_KEY: &str = "schemas";

/// A parsed API description document.
///
/// The root is guaranteed to be a mapping, and `paths`, `components` and
/// `components.schemas` are mappings whenever they are present.
#[derive(Debug, Clone, PartialEq, derive_more::Deref)]
pub struct Document {
    sections: Mapping,
}

impl Document {
    /// Wraps a node, checking the section shapes.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidDocument`] when the root or one of the known
    /// sections is not a mapping.
    pub fn from_node(node: Node) -> Result<Self, SplitError> {
        let Node::Mapping(sections) = node else {
            return Err(SplitError::invalid("the document root must be a mapping"));
        };
        check_section(PATHS_KEY, sections.get(PATHS_KEY))?;
        let components = sections.get(COMPONENTS_KEY);
        check_section(COMPONENTS_KEY, components)?;
        check_section(
            "components.schemas",
            components.and_then(|components| components.get(SCHEMAS_KEY)),
        )?;
        Ok(Self { sections })
    }

    /// Parses a YAML string into a document.
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML or on an invalid document shape.
    pub fn parse(yaml: &str) -> Result<Self, SplitError> {
        Self::from_node(from_yaml(yaml, "<input>")?)
    }

    /// Reads a YAML document from a file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not YAML, or has an invalid shape.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SplitError> {
        Self::from_node(load_node(path)?)
    }

    /// All top-level sections, in document order.
    #[must_use]
    pub fn sections(&self) -> &Mapping {
        &self.sections
    }

    /// The operations-by-path section.
    #[must_use]
    pub fn paths(&self) -> Option<&Mapping> {
        self.sections.get(PATHS_KEY).and_then(Node::as_mapping)
    }

    /// The components section.
    #[must_use]
    pub fn components(&self) -> Option<&Mapping> {
        self.sections.get(COMPONENTS_KEY).and_then(Node::as_mapping)
    }

    /// The named definitions (`components.schemas`).
    #[must_use]
    pub fn definitions(&self) -> Option<&Mapping> {
        self.components()
            .and_then(|components| components.get(SCHEMAS_KEY))
            .and_then(Node::as_mapping)
    }

    /// Mutable access to the named definitions.
    pub fn definitions_mut(&mut self) -> Option<&mut Mapping> {
        self.sections
            .get_mut(COMPONENTS_KEY)
            .and_then(|components| components.get_mut(SCHEMAS_KEY))
            .and_then(Node::as_mapping_mut)
    }

    /// Calls `visit` on every reference of the whole document.
    pub fn visit_references_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&mut super::Reference),
    {
        for value in self.sections.values_mut() {
            value.visit_references_mut(visit);
        }
    }

    /// Unwraps the document into its root node.
    #[must_use]
    pub fn into_node(self) -> Node {
        Node::Mapping(self.sections)
    }
}

fn check_section(name: &str, section: Option<&Node>) -> Result<(), SplitError> {
    match section {
        None | Some(Node::Mapping(_)) => Ok(()),
        Some(node) if node.is_empty() => Ok(()),
        Some(_) => Err(SplitError::invalid(format!(
            "the '{name}' section must be a mapping"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_sections() {
        let document = Document::parse(
            r"
openapi: 3.0.3
info:
  title: Pets
  version: 1.0.0
paths:
  /pets:
    get:
      tags: [pets]
components:
  schemas:
    Pet:
      type: object
",
        )
        .expect("a valid document");

        assert_eq!(
            document.sections().keys().collect::<Vec<_>>(),
            vec!["openapi", "info", "paths", "components"]
        );
        assert!(document.paths().is_some_and(|paths| paths.contains_key("/pets")));
        assert!(
            document
                .definitions()
                .is_some_and(|definitions| definitions.contains_key("Pet"))
        );
    }

    #[test]
    fn should_accept_empty_sections() {
        let document = Document::parse("openapi: 3.0.3\npaths: {}\ncomponents:\n")
            .expect("a valid document");

        assert!(document.definitions().is_none());
        assert!(document.paths().is_some_and(Mapping::is_empty));
    }

    #[test]
    fn should_reject_non_mapping_root() {
        let result = Document::parse("- a\n- b\n");

        assert!(matches!(result, Err(SplitError::InvalidDocument { .. })));
    }

    #[test]
    fn should_reject_non_mapping_paths() {
        let result = Document::parse("paths:\n  - /pets\n");

        let Err(SplitError::InvalidDocument { reason }) = result else {
            panic!("expected an invalid document error");
        };
        assert_eq!(reason, "the 'paths' section must be a mapping");
    }
}
