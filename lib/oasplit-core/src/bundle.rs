//! Reassembly of a decomposed layout into a single document.
//!
//! This is the inverse of [`Decomposer`](crate::split::Decomposer): path
//! references of the root are inlined, definition files and bundled definitions
//! are collected back into `components.schemas`, and every reference to them
//! becomes an in-document reference again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::model::{COMPONENTS_KEY, Node, PATHS_KEY, RefTarget, SCHEMAS_KEY};
use crate::split::{Fragment, FragmentKind, SplitConfig, SplitResult, resolve_relative};
use crate::yaml::load_node;
use crate::{Document, SplitError};

const SCHEMAS_POINTER: &str = "/components/schemas/";

/// Rebuilds a single document from a decomposed layout.
///
/// # Errors
///
/// Returns [`SplitError::UnresolvedReference`] when a path of the root refers to
/// a file or anchor absent from the layout, and [`SplitError::InvalidDocument`]
/// when the root is not a mapping.
pub fn reassemble(layout: &SplitResult<Node>) -> Result<Document, SplitError> {
    let definition_files: BTreeMap<&Path, &str> = layout
        .fragments
        .iter()
        .filter_map(|fragment| match &fragment.kind {
            FragmentKind::Definition(name) => Some((fragment.path.as_path(), name.as_str())),
            FragmentKind::Path(_) => None,
        })
        .collect();

    let mut definitions = BTreeMap::new();
    for fragment in &layout.fragments {
        match &fragment.kind {
            FragmentKind::Definition(name) => {
                let mut body = fragment.content.clone();
                restore_references(&mut body, &fragment.path, &definition_files);
                definitions.insert(name.clone(), body);
            }
            FragmentKind::Path(_) => {
                let bundled = fragment
                    .content
                    .get(COMPONENTS_KEY)
                    .and_then(|components| components.get(SCHEMAS_KEY))
                    .and_then(Node::as_mapping)
                    .into_iter()
                    .flatten();
                for (name, body) in bundled {
                    let mut body = body.clone();
                    restore_references(&mut body, &fragment.path, &definition_files);
                    definitions.insert(name.clone(), body);
                }
            }
        }
    }

    let Node::Mapping(mut root) = layout.main.clone() else {
        return Err(SplitError::invalid("the document root must be a mapping"));
    };

    if let Some(Node::Mapping(paths)) = root.get_mut(PATHS_KEY) {
        for (path, item) in paths.iter_mut() {
            *item = inline_path(layout, item, &definition_files)?;
            debug!(%path, "inlined path");
        }
    }

    let mut root = Node::Mapping(root);
    restore_references(&mut root, &layout.main_path, &definition_files);
    let Node::Mapping(mut root) = root else {
        return Err(SplitError::invalid("the document root must be a mapping"));
    };

    if !definitions.is_empty() {
        let components = root
            .entry(COMPONENTS_KEY.to_string())
            .or_insert_with(Node::mapping);
        if components.is_empty() {
            *components = Node::mapping();
        }
        if let Some(components) = components.as_mapping_mut() {
            components.insert(
                SCHEMAS_KEY.to_string(),
                Node::Mapping(definitions.into_iter().collect()),
            );
        }
    }

    info!(fragments = layout.fragment_count(), "reassembled document");
    Document::from_node(Node::Mapping(root))
}

fn inline_path(
    layout: &SplitResult<Node>,
    item: &Node,
    definition_files: &BTreeMap<&Path, &str>,
) -> Result<Node, SplitError> {
    let Some(reference) = item.as_reference() else {
        return Ok(item.clone());
    };
    let RefTarget::External { path, anchor } = &reference.target else {
        return Ok(item.clone());
    };

    let unresolved = || SplitError::UnresolvedReference {
        file: layout.main_path.clone(),
        target: reference.target.to_string(),
    };
    let file = resolve_relative(&layout.main_path, path);
    let fragment = layout.fragment(&file).ok_or_else(unresolved)?;
    let operations = match anchor {
        Some(anchor) => fragment.content.pointer(anchor).ok_or_else(unresolved)?,
        None => &fragment.content,
    };

    let mut operations = operations.clone();
    restore_references(&mut operations, &fragment.path, definition_files);
    Ok(operations)
}

/// Turns references to definition files and bundled definitions back into
/// in-document references.
fn restore_references(node: &mut Node, file: &Path, definition_files: &BTreeMap<&Path, &str>) {
    node.visit_references_mut(&mut |reference| {
        let RefTarget::External { path, anchor } = &reference.target else {
            return;
        };
        if path.contains("://") {
            return;
        }
        let name = match anchor {
            Some(anchor) => anchor
                .strip_prefix(SCHEMAS_POINTER)
                .filter(|name| !name.contains('/'))
                .map(String::from),
            None => definition_files
                .get(resolve_relative(file, path).as_path())
                .map(|name| (*name).to_string()),
        };
        if let Some(name) = name {
            reference.target = RefTarget::Definition(name);
        }
    });
}

/// Reads a decomposed layout back from `dir`.
///
/// Files below the definitions directory become definition fragments named
/// after their file stem; files below the paths directory become path fragments,
/// named after the root path referring to them.
///
/// # Errors
///
/// Fails if a file cannot be read or parsed.
pub fn read_layout(dir: &Path, config: &SplitConfig) -> Result<SplitResult<Node>, SplitError> {
    let main = load_node(dir.join(config.root_file()))?;
    let main_path = config.root_file().to_path_buf();

    let path_templates: BTreeMap<PathBuf, String> = main
        .get(PATHS_KEY)
        .and_then(Node::as_mapping)
        .into_iter()
        .flatten()
        .filter_map(|(template, item)| match &item.as_reference()?.target {
            RefTarget::External { path, .. } => {
                Some((resolve_relative(&main_path, path), template.clone()))
            }
            RefTarget::Definition(_) | RefTarget::Pointer(_) => None,
        })
        .collect();

    let mut layout = SplitResult::new(main_path, main);
    for file in yaml_files(dir, config.definitions_dir())? {
        let name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = load_node(dir.join(&file))?;
        layout.add_fragment(Fragment::new(file, FragmentKind::Definition(name), content));
    }
    for file in yaml_files(dir, config.paths_dir())? {
        let template = path_templates
            .get(&file)
            .cloned()
            .unwrap_or_else(|| file.display().to_string());
        let content = load_node(dir.join(&file))?;
        layout.add_fragment(Fragment::new(file, FragmentKind::Path(template), content));
    }

    debug!(dir = %dir.display(), fragments = layout.fragment_count(), "read layout");
    Ok(layout)
}

/// YAML files below `dir/sub`, relative to `dir`, sorted.
fn yaml_files(dir: &Path, sub: &Path) -> Result<Vec<PathBuf>, SplitError> {
    let base = dir.join(sub);
    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&base).sort_by_file_name() {
        let entry = entry.map_err(|error| {
            let path = error.path().unwrap_or(&base).to_path_buf();
            SplitError::Io {
                path,
                source: error.into(),
            }
        })?;
        if entry.file_type().is_file() && is_yaml(entry.path()) {
            if let Ok(relative) = entry.path().strip_prefix(dir) {
                files.push(relative.to_path_buf());
            }
        }
    }
    Ok(files)
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension == "yaml" || extension == "yml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::structurally_equal;
    use crate::split::{Decomposer, DocumentSplitExt, write_layout};

    const INPUT: &str = r"
openapi: 3.0.3
info:
  title: Library
  version: '1'
paths:
  /books:
    get:
      tags: [books]
      responses:
        '200':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/BookListResponse'
    post:
      tags: [books]
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/CreateBookRequest'
  /books/{id}:
    get:
      tags: [books]
      responses:
        '200':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Book'
  /authors:
    get:
      tags: [authors]
      responses:
        '200':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Author'
components:
  schemas:
    Book:
      properties:
        author:
          $ref: '#/components/schemas/Author'
        chapters:
          type: array
          items:
            $ref: '#/components/schemas/Chapter'
    Chapter:
      properties:
        next:
          $ref: '#/components/schemas/Chapter'
    Author:
      type: object
    BookListResponse:
      type: array
      items:
        $ref: '#/components/schemas/Book'
    CreateBookRequest:
      properties:
        title:
          type: string
";

    #[test]
    fn should_reassemble_decomposed_document() {
        let document = Document::parse(INPUT).expect("a valid document");

        let layout = document.clone().split_with(Decomposer::default());
        let reassembled = reassemble(&layout).expect("reassembled");

        assert!(structurally_equal(
            &document.into_node(),
            &reassembled.into_node()
        ));
    }

    #[test]
    fn should_reject_missing_path_file() {
        let document = Document::parse(INPUT).expect("a valid document");
        let mut layout = document.split_with(Decomposer::default());
        layout
            .fragments
            .retain(|fragment| !matches!(&fragment.kind, FragmentKind::Path(path) if path == "/authors"));

        let error = reassemble(&layout).expect_err("a missing path file");

        assert!(matches!(error, SplitError::UnresolvedReference { .. }));
    }

    #[test]
    fn should_read_written_layout() -> anyhow::Result<()> {
        let output = tempfile::tempdir()?;
        let config = SplitConfig::default();
        let document = Document::parse(INPUT)?;
        let layout = document.clone().split_with(Decomposer::new(config.clone()));
        write_layout(&layout, output.path(), &config)?;

        let read = read_layout(output.path(), &config)?;

        assert_eq!(read.fragment_count(), layout.fragment_count());
        assert!(
            read.fragment(Path::new("paths/books/books__id.yaml"))
                .is_some_and(|fragment| fragment.kind == FragmentKind::Path("/books/{id}".to_string()))
        );
        let reassembled = reassemble(&read)?;
        assert!(structurally_equal(
            &document.into_node(),
            &reassembled.into_node()
        ));
        Ok(())
    }

    #[test]
    fn should_follow_json_pointers() {
        let node: Node =
            crate::yaml::from_yaml("a:\n  b/c:\n    d: 1\n", "test").expect("valid YAML");

        assert!(node.pointer("/a/b~1c/d").is_some());
        assert!(node.pointer("/a/missing").is_none());
        assert_eq!(node.pointer(""), Some(&node));
    }
}
