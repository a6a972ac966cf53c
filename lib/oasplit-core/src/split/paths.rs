//! One file per operation path.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::model::{COMPONENTS_KEY, Mapping, Node, SCHEMAS_KEY};

use super::rewrite::file_component;
use super::{Classification, SplitConfig};

/// Key holding the path item inside a path file.
pub const OPERATIONS_KEY: &str = "operations";

const INDEX_FILE: &str = "index";

/// Subdirectory of a path file: the first segment without a template parameter.
///
/// ```rust
/// use oasplit_core::split::path_subdir;
///
/// assert_eq!(path_subdir("/users/{id}"), Some("users"));
/// assert_eq!(path_subdir("/{tenant}/orders"), Some("orders"));
/// assert_eq!(path_subdir("/{id}"), None);
/// ```
#[must_use]
pub fn path_subdir(path: &str) -> Option<&str> {
    path.split('/')
        .find(|segment| !segment.is_empty() && !segment.contains('{'))
}

/// File stem of a path file (`/users/{id}` gives `users__id`, `/` gives `index`).
#[must_use]
pub fn path_file_name(path: &str) -> String {
    let flattened = path.replace(['/', '\\'], "__").replace(['{', '}'], "");
    let stem = flattened.strip_prefix("__").unwrap_or(&flattened);
    if stem.is_empty() {
        INDEX_FILE.to_string()
    } else {
        stem.to_string()
    }
}

/// Reorders a path item: verbs of `verb_order` first, in that order, then every
/// other key in document order.
#[must_use]
pub fn order_operations(item: &Mapping, verb_order: &[String]) -> Mapping {
    let rank = |key: &str| {
        verb_order
            .iter()
            .position(|verb| verb == key)
            .unwrap_or(verb_order.len())
    };
    let mut entries: Vec<_> = item.iter().collect();
    entries.sort_by_key(|(key, _)| rank(key.as_str()));
    entries
        .into_iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Local definitions a path item needs: those it references directly, and the
/// local definitions they reference in turn.
#[must_use]
pub fn local_closure(
    item: &Node,
    definitions: &Mapping,
    classification: &Classification,
) -> BTreeSet<String> {
    let is_bundled = |name: &str| classification.is_local(name) && definitions.contains_key(name);

    let mut closure = BTreeSet::new();
    let mut pending: Vec<String> = item
        .definition_refs()
        .into_iter()
        .filter(|name| is_bundled(*name))
        .map(String::from)
        .collect();

    while let Some(name) = pending.pop() {
        if !closure.insert(name.clone()) {
            continue;
        }
        if let Some(body) = definitions.get(&name) {
            pending.extend(
                body.definition_refs()
                    .into_iter()
                    .filter(|target| is_bundled(*target) && !closure.contains(*target))
                    .map(String::from),
            );
        }
    }
    closure
}

/// Where and how a single path is decomposed.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlan {
    /// The path template (`/users/{id}`).
    pub path: String,
    /// Target file, relative to the output directory.
    pub file: PathBuf,
    /// The path item, with its operations in emission order.
    pub operations: Node,
    /// Local definitions the path depends on.
    pub locals: BTreeSet<String>,
}

impl PathPlan {
    /// Plans the file of `path`.
    #[must_use]
    pub fn new(
        path: &str,
        item: &Node,
        definitions: &Mapping,
        classification: &Classification,
        config: &SplitConfig,
    ) -> Self {
        let mut file = config.paths_dir().to_path_buf();
        if let Some(subdir) = path_subdir(path).and_then(file_component) {
            file.push(subdir);
        }
        file.push(format!("{}.yaml", path_file_name(path)));

        let operations = match item {
            Node::Mapping(mapping) => Node::Mapping(order_operations(mapping, config.verb_order())),
            other => other.clone(),
        };

        Self {
            path: path.to_string(),
            file,
            operations,
            locals: local_closure(item, definitions, classification),
        }
    }

    /// Builds the file content: the operations, then the `bundled` definitions
    /// under `components.schemas` when there are any.
    #[must_use]
    pub fn content(&self, bundled: Mapping) -> Node {
        let mut content = Mapping::new();
        content.insert(OPERATIONS_KEY.to_string(), self.operations.clone());
        if !bundled.is_empty() {
            let mut components = Mapping::new();
            components.insert(SCHEMAS_KEY.to_string(), Node::Mapping(bundled));
            content.insert(COMPONENTS_KEY.to_string(), Node::Mapping(components));
        }
        Node::Mapping(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::from_yaml;
    use rstest::rstest;

    #[rstest]
    #[case("/users", "users")]
    #[case("/users/{id}", "users__id")]
    #[case("/users/{id}/orders/{orderId}", "users__id__orders__orderId")]
    #[case("/", "index")]
    #[case("/health", "health")]
    fn should_name_path_files(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(path_file_name(path), expected);
    }

    #[rstest]
    #[case("/users/{id}", Some("users"))]
    #[case("/", None)]
    #[case("/{id}/{other}", None)]
    fn should_choose_subdirectory(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(path_subdir(path), expected);
    }

    #[test]
    fn should_order_verbs_first() {
        let item: Mapping = from_yaml(
            r"
parameters: []
patch: {}
delete: {}
summary: Users
get: {}
post: {}
",
            "test",
        )
        .expect("valid YAML");
        let config = SplitConfig::default();

        let ordered = order_operations(&item, config.verb_order());

        let keys: Vec<_> = ordered.keys().map(String::as_str).collect();
        assert_eq!(keys, ["get", "post", "delete", "parameters", "patch", "summary"]);
    }

    #[test]
    fn should_collect_transitive_local_definitions() {
        let definitions: Mapping = from_yaml(
            r"
User: {}
CreateUserRequest:
  properties:
    profile:
      $ref: '#/components/schemas/ProfileRequest'
    owner:
      $ref: '#/components/schemas/User'
ProfileRequest:
  properties:
    back:
      $ref: '#/components/schemas/CreateUserRequest'
UnusedResponse: {}
",
            "test",
        )
        .expect("valid YAML");
        let item: Node = from_yaml(
            r"
post:
  requestBody:
    content:
      application/json:
        schema:
          $ref: '#/components/schemas/CreateUserRequest'
",
            "test",
        )
        .expect("valid YAML");
        let config = SplitConfig::default();
        let classification = Classification::partition(definitions.keys(), &config);

        let closure = local_closure(&item, &definitions, &classification);

        assert_eq!(
            closure,
            BTreeSet::from(["CreateUserRequest".to_string(), "ProfileRequest".to_string()])
        );
    }

    #[test]
    fn should_plan_path_file() {
        let config = SplitConfig::default();
        let item: Node = from_yaml("delete: {}\nget: {}\n", "test").expect("valid YAML");

        let plan = PathPlan::new(
            "/users/{id}",
            &item,
            &Mapping::new(),
            &Classification::default(),
            &config,
        );

        assert_eq!(plan.file, PathBuf::from("paths/users/users__id.yaml"));
        assert!(plan.locals.is_empty());
        let content = plan.content(Mapping::new());
        assert!(content.get(COMPONENTS_KEY).is_none());
        let keys: Vec<_> = content
            .get(OPERATIONS_KEY)
            .and_then(Node::as_mapping)
            .map(|operations| operations.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, ["get", "delete"]);
    }

    #[test]
    fn should_keep_path_files_inside_the_paths_directory() {
        let config = SplitConfig::default();
        let item: Node = from_yaml("get: {}\n", "test").expect("valid YAML");

        let plan = PathPlan::new(
            "/../secrets",
            &item,
            &Mapping::new(),
            &Classification::default(),
            &config,
        );

        assert_eq!(plan.file, PathBuf::from("paths/..__secrets.yaml"));
    }
}
