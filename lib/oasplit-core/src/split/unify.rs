//! Merging of suffix-numbered duplicate definitions (`User_1` into `User`).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{Mapping, RefTarget};
use crate::Document;

static DUPLICATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<base>.+)_\d+$").expect("a valid regex"));

/// Duplicate definition name to canonical name.
pub type DuplicateMap = BTreeMap<String, String>;

/// Returns the base name of a suffix-numbered name (`User_1` gives `User`).
#[must_use]
pub fn canonical_name(name: &str) -> Option<&str> {
    DUPLICATE_NAME
        .captures(name)
        .and_then(|captures| captures.name("base"))
        .map(|base| base.as_str())
}

/// Maps every duplicate to the definition it should be merged into.
///
/// Names whose base is not itself defined are left out. Chains such as
/// `User_1_2` → `User_1` → `User` resolve to the last defined name, so no
/// reference ends up on a definition that is deleted too.
#[must_use]
pub fn duplicate_map(definitions: &Mapping) -> DuplicateMap {
    let direct: BTreeMap<&str, &str> = definitions
        .keys()
        .filter_map(|name| {
            let base = canonical_name(name)?;
            definitions
                .contains_key(base)
                .then_some((name.as_str(), base))
        })
        .collect();

    direct
        .keys()
        .map(|&duplicate| {
            let mut canonical = duplicate;
            while let Some(&next) = direct.get(canonical) {
                canonical = next;
            }
            (duplicate.to_string(), canonical.to_string())
        })
        .collect()
}

/// Merges duplicate definitions into their canonical definition.
///
/// Every reference to a duplicate, anywhere in the document, is retargeted on the
/// canonical name, then the duplicate entries are removed. This is a best-effort
/// normalization: it never fails and running it twice changes nothing more.
///
/// Returns the applied mapping.
pub fn unify_duplicates(document: &mut Document) -> DuplicateMap {
    let Some(definitions) = document.definitions() else {
        return DuplicateMap::new();
    };
    let duplicates = duplicate_map(definitions);
    if duplicates.is_empty() {
        return duplicates;
    }

    let mut retargeted = 0_usize;
    document.visit_references_mut(&mut |reference| {
        let canonical = match &reference.target {
            RefTarget::Definition(name) => duplicates.get(name),
            RefTarget::External { .. } | RefTarget::Pointer(_) => None,
        };
        if let Some(canonical) = canonical {
            reference.target = RefTarget::definition(canonical.clone());
            retargeted += 1;
        }
    });

    if let Some(definitions) = document.definitions_mut() {
        definitions.retain(|name, _| !duplicates.contains_key(name));
    }
    debug!(duplicates = duplicates.len(), retargeted, "unified duplicate definitions");

    duplicates
}
