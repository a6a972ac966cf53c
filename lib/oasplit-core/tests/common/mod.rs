#![allow(dead_code)]

use std::path::Path;

use oasplit_core::{Document, Node};
use rstest::fixture;
use tracing::info;
use walkdir::WalkDir;

pub const SHOP: &str = include_str!("../fixtures/shop.yaml");

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub fn shop() -> Document {
    init_tracing();
    match Document::parse(SHOP) {
        Ok(document) => document,
        Err(error) => panic!("invalid shop fixture: {error}"),
    }
}

/// Files below `root`, relative, with forward slashes, sorted.
pub fn layout_files(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            Some(
                relative
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
            )
        })
        .collect()
}

/// Follows a JSON pointer (without `#`).
pub fn follow<'a>(node: &'a Node, anchor: &str) -> Option<&'a Node> {
    node.pointer(anchor)
}
