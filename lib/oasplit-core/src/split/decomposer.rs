//! The decomposition strategy: one file per path and per global definition.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::Document;
use crate::model::{COMPONENTS_KEY, Mapping, Node, SCHEMAS_KEY};

use super::placement::PlacementResolver;
use super::rewrite::{Location, LocationMap, dangling_pointers, rewrite_references};
use super::root::assemble_root;
use super::unify::unify_duplicates;
use super::{
    Classification, DocumentSplitter, Fragment, FragmentKind, PathPlan, SplitConfig, SplitResult,
};

/// Decomposes a document into a tree of files.
///
/// The steps run in a fixed order, each consuming the output of the previous one:
///
/// 1. duplicate definitions (`User_1`) are merged into their canonical definition,
/// 2. definitions are classified as local or global from their name,
/// 3. global definitions are placed under the tag of the operations using them,
///    or under the shared label when several tags use them,
/// 4. paths are planned in lexicographic order; each local definition is bundled
///    in the first path file needing it,
/// 5. every file has its references rewritten relative to its own location.
///
/// # Example
///
/// ```rust
/// use oasplit_core::Document;
/// use oasplit_core::split::{Decomposer, DocumentSplitExt};
///
/// let document = Document::parse(r"
/// openapi: 3.0.3
/// paths:
///   /users:
///     get:
///       tags: [users]
///       responses:
///         '200':
///           content:
///             application/json:
///               schema:
///                 $ref: '#/components/schemas/User'
/// components:
///   schemas:
///     User:
///       type: object
/// ")?;
///
/// let result = document.split_with(Decomposer::default());
///
/// assert_eq!(result.fragment_count(), 2);
/// assert!(result.fragment("components/schemas/users/User.yaml".as_ref()).is_some());
/// assert!(result.fragment("paths/users/users.yaml".as_ref()).is_some());
/// # Ok::<(), oasplit_core::SplitError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decomposer {
    config: SplitConfig,
}

impl Decomposer {
    /// Creates a decomposer with the given layout conventions.
    #[must_use]
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// The layout conventions in use.
    #[must_use]
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    fn plan_paths(
        &self,
        document: &Document,
        definitions: &Mapping,
        classification: &Classification,
    ) -> Vec<PathPlan> {
        let mut paths: Vec<_> = document.paths().into_iter().flatten().collect();
        paths.sort_by(|(left, _), (right, _)| left.cmp(right));

        let mut taken = BTreeSet::new();
        paths
            .into_iter()
            .map(|(path, item)| {
                let mut plan = PathPlan::new(path, item, definitions, classification, &self.config);
                if !taken.insert(plan.file.clone()) {
                    let file = numbered_file(&plan.file, &taken);
                    warn!(
                        %path,
                        taken = %plan.file.display(),
                        file = %file.display(),
                        "path file name already used by another path"
                    );
                    taken.insert(file.clone());
                    plan.file = file;
                }
                plan
            })
            .collect()
    }

    fn locate(
        &self,
        resolver: &PlacementResolver<'_>,
        classification: &Classification,
        plans: &[PathPlan],
    ) -> (LocationMap, BTreeMap<String, PathBuf>) {
        let mut owners = BTreeMap::new();
        for plan in plans {
            for name in &plan.locals {
                owners
                    .entry(name.clone())
                    .or_insert_with(|| plan.file.clone());
            }
        }

        let mut locations = LocationMap::new();
        for name in &classification.global {
            locations.insert(name.clone(), self.definition_file(resolver, name));
        }
        for name in &classification.local {
            let location = match owners.get(name) {
                Some(owner) => {
                    Location::anchored(owner, format!("/{COMPONENTS_KEY}/{SCHEMAS_KEY}/{name}"))
                }
                None => {
                    warn!(%name, "local definition not used by any path, placed as a global one");
                    self.definition_file(resolver, name)
                }
            };
            locations.insert(name.clone(), location);
        }

        (locations, owners)
    }

    fn definition_file(&self, resolver: &PlacementResolver<'_>, name: &str) -> Location {
        let placement = resolver.resolve(name);
        debug!(%name, ?placement, "placed definition");
        Location::file(placement.directory(&self.config).join(format!("{name}.yaml")))
    }
}

/// First `<stem>_<n>.yaml` sibling of `file` not in `taken`, counting from 2.
fn numbered_file(file: &Path, taken: &BTreeSet<PathBuf>) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut counter = 2_usize;
    loop {
        let candidate = file.with_file_name(format!("{stem}_{counter}.yaml"));
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn warn_dangling_pointers(content: &Node, file: &Path) {
    for pointer in dangling_pointers(content) {
        warn!(file = %file.display(), %pointer, "in-document reference does not resolve in its file");
    }
}

impl DocumentSplitter for Decomposer {
    type Fragment = Node;

    fn split(&self, mut document: Document) -> SplitResult<Self::Fragment> {
        let duplicates = unify_duplicates(&mut document);

        let definitions = document.definitions().cloned().unwrap_or_default();
        let classification = Classification::partition(definitions.keys(), &self.config);
        let plans = self.plan_paths(&document, &definitions, &classification);
        let resolver = PlacementResolver::new(&document);
        let (locations, owners) = self.locate(&resolver, &classification, &plans);

        let mut result = SplitResult::new(
            self.config.root_file(),
            assemble_root(&document, &plans, &locations, &self.config),
        );

        for (name, location) in &locations {
            if location.anchor.is_some() {
                continue;
            }
            let Some(body) = definitions.get(name) else {
                continue;
            };
            let mut content = body.clone();
            rewrite_references(&mut content, &location.file, &locations);
            warn_dangling_pointers(&content, &location.file);
            result.add_fragment(Fragment::new(
                location.file.clone(),
                FragmentKind::Definition(name.clone()),
                content,
            ));
        }

        for plan in &plans {
            let bundled: Mapping = plan
                .locals
                .iter()
                .filter(|name| owners.get(*name) == Some(&plan.file))
                .filter_map(|name| Some((name.clone(), definitions.get(name)?.clone())))
                .collect();
            let mut content = plan.content(bundled);
            rewrite_references(&mut content, &plan.file, &locations);
            warn_dangling_pointers(&content, &plan.file);
            result.add_fragment(Fragment::new(
                plan.file.clone(),
                FragmentKind::Path(plan.path.clone()),
                content,
            ));
        }

        info!(
            paths = plans.len(),
            definitions = definitions.len(),
            local = classification.local.len(),
            global = classification.global.len(),
            duplicates = duplicates.len(),
            fragments = result.fragment_count(),
            "decomposed document"
        );
        result
    }
}
