//! The entry document of a decomposed layout.

use std::path::{Component, Path};

use crate::Document;
use crate::model::{COMPONENTS_KEY, Mapping, Node, PATHS_KEY, RefTarget, Reference, SCHEMAS_KEY};

use super::paths::OPERATIONS_KEY;
use super::rewrite::{LocationMap, relative_path, rewrite_references, to_ref_path};
use super::{PathPlan, SplitConfig};

/// Builds the root document.
///
/// Metadata sections are copied in document order, `paths` maps every path to
/// the operations of its file, and non-schema components stay in the root with
/// their references rewritten relative to it.
#[must_use]
pub fn assemble_root(
    document: &Document,
    plans: &[PathPlan],
    locations: &LocationMap,
    config: &SplitConfig,
) -> Node {
    let root_file = config.root_file();
    let root_dir = root_file.parent().unwrap_or(Path::new(""));

    let mut root = Mapping::new();
    for (key, value) in document.sections() {
        match key.as_str() {
            PATHS_KEY => {
                root.insert(key.clone(), path_references(root_dir, plans));
            }
            COMPONENTS_KEY => {
                if let Some(components) = remaining_components(value) {
                    root.insert(key.clone(), components);
                }
            }
            _ => {
                root.insert(key.clone(), value.clone());
            }
        }
    }
    if !root.contains_key(PATHS_KEY) {
        root.insert(PATHS_KEY.to_string(), path_references(root_dir, plans));
    }

    let mut root = Node::Mapping(root);
    rewrite_references(&mut root, root_file, locations);
    root
}

fn path_references(root_dir: &Path, plans: &[PathPlan]) -> Node {
    let paths = plans
        .iter()
        .map(|plan| {
            let target = RefTarget::External {
                path: explicit_relative(&relative_path(root_dir, &plan.file)),
                anchor: Some(format!("/{OPERATIONS_KEY}")),
            };
            (plan.path.clone(), Node::from(Reference::new(target)))
        })
        .collect();
    Node::Mapping(paths)
}

fn remaining_components(components: &Node) -> Option<Node> {
    let Node::Mapping(sections) = components else {
        return None;
    };
    let remaining: Mapping = sections
        .iter()
        .filter(|(key, _)| key.as_str() != SCHEMAS_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    (!remaining.is_empty()).then_some(Node::Mapping(remaining))
}

/// Prefixes `./` to a path staying below the root directory.
fn explicit_relative(path: &Path) -> String {
    let path_ref = to_ref_path(path);
    match path.components().next() {
        Some(Component::ParentDir) => path_ref,
        _ => format!("./{path_ref}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{Classification, rewrite::Location};

    fn document() -> Document {
        Document::parse(
            r"
openapi: 3.0.3
info:
  title: Users
  version: '1'
paths:
  /users:
    get:
      responses:
        '404':
          $ref: '#/components/responses/NotFound'
components:
  schemas:
    User:
      type: object
  responses:
    NotFound:
      description: Not found
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/User'
tags:
  - name: users
",
        )
        .expect("a valid document")
    }

    fn plans(document: &Document, config: &SplitConfig) -> Vec<PathPlan> {
        document
            .paths()
            .into_iter()
            .flatten()
            .map(|(path, item)| {
                PathPlan::new(path, item, &Mapping::new(), &Classification::default(), config)
            })
            .collect()
    }

    #[test]
    fn should_keep_metadata_and_reference_path_files() {
        let document = document();
        let config = SplitConfig::default();
        let locations = LocationMap::from([(
            "User".to_string(),
            Location::file("components/schemas/User.yaml"),
        )]);

        let root = assemble_root(&document, &plans(&document, &config), &locations, &config);

        let keys: Vec<_> = root
            .as_mapping()
            .map(|root| root.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, ["openapi", "info", "paths", "components", "tags"]);

        let users = root
            .get(PATHS_KEY)
            .and_then(|paths| paths.get("/users"))
            .and_then(Node::as_reference)
            .map(|reference| reference.target.to_string());
        assert_eq!(users.as_deref(), Some("./paths/users/users.yaml#/operations"));

        let components = root.get(COMPONENTS_KEY).expect("components kept");
        assert!(components.get(SCHEMAS_KEY).is_none());
        let schema = components
            .get("responses")
            .and_then(|responses| responses.get("NotFound"))
            .and_then(|response| response.get("content"))
            .and_then(|content| content.get("application/json"))
            .and_then(|media| media.get("schema"))
            .and_then(Node::as_reference)
            .map(|reference| reference.target.to_string());
        assert_eq!(schema.as_deref(), Some("components/schemas/User.yaml"));
    }

    #[test]
    fn should_always_emit_paths() {
        let document = Document::parse("openapi: 3.0.3\n").expect("a valid document");
        let config = SplitConfig::default();

        let root = assemble_root(&document, &[], &LocationMap::new(), &config);

        assert_eq!(root.get(PATHS_KEY), Some(&Node::mapping()));
    }
}
