use std::fmt;
use std::path::PathBuf;

use crate::split::to_ref_path;

const REMEDIATION_HINTS: [&str; 3] = [
    "Remove direct references between schemas",
    "Use intermediate schemas (e.g., PostSummary)",
    "Consider using allOf with partial schemas",
];

/// A chain of files, each referencing the next, the last referencing the first.
///
/// Displayed with the first file repeated at the end: `A.yaml -> B.yaml -> A.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, derive_more::Deref)]
pub struct Cycle(Vec<PathBuf>);

impl Cycle {
    /// Wraps a chain of files, rotated so the smallest comes first.
    #[must_use]
    pub fn new(mut files: Vec<PathBuf>) -> Self {
        let smallest = files
            .iter()
            .enumerate()
            .min_by(|(_, left), (_, right)| left.cmp(right))
            .map_or(0, |(index, _)| index);
        files.rotate_left(smallest);
        Self(files)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.0 {
            write!(f, "{} -> ", to_ref_path(file))?;
        }
        match self.0.first() {
            Some(first) => f.write_str(&to_ref_path(first)),
            None => Ok(()),
        }
    }
}

/// Outcome of a cycle check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Number of YAML files scanned.
    pub file_count: usize,
    /// Number of references between them.
    pub reference_count: usize,
    /// Cycles found, sorted.
    pub cycles: Vec<Cycle>,
}

impl CycleReport {
    /// `true` when no cycle was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            writeln!(f, "No circular references detected.")?;
            writeln!(f, "Summary:")?;
            writeln!(f, "  - Files: {}", self.file_count)?;
            return write!(f, "  - References: {}", self.reference_count);
        }

        writeln!(
            f,
            "Found {} circular reference(s) in {} files:",
            self.cycles.len(),
            self.file_count
        )?;
        for (index, cycle) in self.cycles.iter().enumerate() {
            writeln!(f, "  {}. {cycle}", index + 1)?;
        }
        writeln!(f)?;
        write!(f, "To fix circular references:")?;
        for hint in REMEDIATION_HINTS {
            write!(f, "\n  - {hint}")?;
        }
        Ok(())
    }
}
