//! Partition of definitions into request/response-local and global ones.

use std::collections::BTreeSet;

use super::SplitConfig;

/// Class of a definition, decided by its name only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionClass {
    /// Specific to one request or response body, bundled with its path.
    Local,
    /// Shared, written to the definitions tree.
    Global,
}

impl DefinitionClass {
    /// Classifies a definition name.
    #[must_use]
    pub fn of(name: &str, config: &SplitConfig) -> Self {
        if config.is_local(name) {
            Self::Local
        } else {
            Self::Global
        }
    }
}

/// A total, disjoint partition of definition names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Local definition names.
    pub local: BTreeSet<String>,
    /// Global definition names.
    pub global: BTreeSet<String>,
}

impl Classification {
    /// Partitions `names` with the suffixes of `config`.
    pub fn partition<'a, I>(names: I, config: &SplitConfig) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut result = Self::default();
        for name in names {
            let bucket = match DefinitionClass::of(name, config) {
                DefinitionClass::Local => &mut result.local,
                DefinitionClass::Global => &mut result.global,
            };
            bucket.insert(name.clone());
        }
        result
    }

    /// Returns the class of `name`, if it was partitioned.
    #[must_use]
    pub fn class_of(&self, name: &str) -> Option<DefinitionClass> {
        if self.local.contains(name) {
            Some(DefinitionClass::Local)
        } else if self.global.contains(name) {
            Some(DefinitionClass::Global)
        } else {
            None
        }
    }

    /// `true` if `name` is a local definition.
    #[must_use]
    pub fn is_local(&self, name: &str) -> bool {
        self.local.contains(name)
    }
}
