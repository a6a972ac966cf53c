//! Detection of reference cycles between the files of a layout.
//!
//! Every YAML file below a root directory is a node; a file referencing another
//! file of the tree through a relative `$ref` is an edge. In-document pointers
//! and URLs are not edges.
//!
//! ```rust,no_run
//! use oasplit_core::graph::check_cycles;
//!
//! let report = check_cycles("decomposed")?;
//! if !report.is_clean() {
//!     eprintln!("{report}");
//! }
//! # Ok::<(), oasplit_core::SplitError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::SplitError;
use crate::bundle::is_yaml;
use crate::model::RefTarget;
use crate::split::resolve_relative;
use crate::yaml::load_node;

mod report;

pub use report::{Cycle, CycleReport};

/// File-level reference graph of a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceGraph {
    edges: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    reference_count: usize,
}

impl ReferenceGraph {
    /// Scans every `.yaml`/`.yml` file below `root`.
    ///
    /// Files that cannot be parsed are skipped with a warning, and references
    /// to them are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the directory tree cannot be walked.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, SplitError> {
        let root = root.as_ref();

        let mut documents = BTreeMap::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|error| {
                let path = error.path().unwrap_or(root).to_path_buf();
                SplitError::Io {
                    path,
                    source: error.into(),
                }
            })?;
            if !entry.file_type().is_file() || !is_yaml(entry.path()) {
                continue;
            }
            let Ok(file) = entry.path().strip_prefix(root) else {
                continue;
            };
            match load_node(entry.path()) {
                Ok(node) => {
                    documents.insert(file.to_path_buf(), node);
                }
                Err(error) => warn!(file = %file.display(), %error, "skipping unreadable file"),
            }
        }

        let mut graph = Self::default();
        for (file, node) in &documents {
            let mut targets = BTreeSet::new();
            node.visit_references(&mut |reference| {
                let RefTarget::External { path, .. } = &reference.target else {
                    return;
                };
                if path.is_empty() || path.contains("://") {
                    return;
                }
                let target = resolve_relative(file, path);
                if documents.contains_key(&target) {
                    graph.reference_count += 1;
                    targets.insert(target);
                }
            });
            debug!(file = %file.display(), targets = targets.len(), "scanned file");
            graph.edges.insert(file.clone(), targets);
        }

        Ok(graph)
    }

    /// Adds an edge, registering both files.
    pub fn add_reference(&mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) {
        let to = to.into();
        self.edges.entry(to.clone()).or_default();
        self.edges.entry(from.into()).or_default().insert(to);
        self.reference_count += 1;
    }

    /// Number of files in the graph.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of references resolving to a file of the graph.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.reference_count
    }

    /// Files referenced by `file`.
    pub fn references_of(&self, file: &Path) -> impl Iterator<Item = &Path> {
        self.edges
            .get(file)
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
    }

    /// Every elementary cycle, each reported once.
    ///
    /// A cycle is listed from its smallest file, and cycles are sorted. The
    /// search starts from each file in order and only walks through larger files,
    /// so every rotation of a cycle but the canonical one is pruned.
    #[must_use]
    pub fn cycles(&self) -> Vec<Cycle> {
        let mut cycles = BTreeSet::new();
        for start in self.edges.keys() {
            let mut chain = vec![start.as_path()];
            self.walk(start, &mut chain, &mut cycles);
        }
        cycles.into_iter().collect()
    }

    fn walk<'a>(&'a self, start: &'a Path, chain: &mut Vec<&'a Path>, cycles: &mut BTreeSet<Cycle>) {
        let Some(current) = chain.last().copied() else {
            return;
        };
        for next in self.references_of(current) {
            if next == start {
                cycles.insert(Cycle::new(chain.iter().map(|file| file.to_path_buf()).collect()));
            } else if next > start && !chain.contains(&next) {
                chain.push(next);
                self.walk(start, chain, cycles);
                chain.pop();
            }
        }
    }

    /// Builds the report of this graph.
    #[must_use]
    pub fn report(&self) -> CycleReport {
        CycleReport {
            file_count: self.file_count(),
            reference_count: self.reference_count,
            cycles: self.cycles(),
        }
    }
}

/// Scans `root` and reports its reference cycles.
///
/// # Errors
///
/// Fails if the directory tree cannot be walked.
pub fn check_cycles(root: impl AsRef<Path>) -> Result<CycleReport, SplitError> {
    let root = root.as_ref();
    let report = ReferenceGraph::scan(root)?.report();
    if report.file_count == 0 {
        warn!(root = %root.display(), "no YAML file found");
    }
    info!(
        root = %root.display(),
        files = report.file_count,
        references = report.reference_count,
        cycles = report.cycles.len(),
        "checked reference cycles"
    );
    Ok(report)
}
