//! Persistence of a decomposed layout.

use std::fs;
use std::path::Path;

use tempfile::{Builder, TempDir};
use tracing::{debug, info, warn};

use super::{SplitConfig, SplitResult};
use crate::SplitError;
use crate::model::Node;
use crate::yaml::write_yaml;

const STAGING_PREFIX: &str = ".oasplit-staging-";
const DISCARD_PREFIX: &str = ".oasplit-previous-";

/// Writes `result` below `output`, replacing the previous layout.
///
/// The whole tree is first written in a staging directory inside `output`. Only
/// then is each managed entry (paths directory, definitions directory, root file)
/// swapped into place: the previous entry is moved aside, the staged one renamed
/// in, and the previous one deleted. Files of an earlier run are never merged
/// with the new ones, and nothing outside the managed entries is touched.
///
/// # Errors
///
/// Fails on the first serialization or file system error. A failure before
/// the swap leaves `output` unchanged.
pub fn write_layout(
    result: &SplitResult<Node>,
    output: &Path,
    config: &SplitConfig,
) -> Result<(), SplitError> {
    fs::create_dir_all(output).map_err(SplitError::io(output))?;
    let entries = config.managed_entries();

    let staging = temp_dir_in(output, STAGING_PREFIX)?;
    let mut written = 0_usize;
    for fragment in &result.fragments {
        if !entries.iter().any(|entry| fragment.path.starts_with(entry)) {
            warn!(path = %fragment.path.display(), "fragment outside of the managed layout, skipped");
            continue;
        }
        write_yaml(staging.path().join(&fragment.path), &fragment.content)?;
        written += 1;
    }
    write_yaml(staging.path().join(config.root_file()), &result.main)?;
    debug!(files = written + 1, staging = %staging.path().display(), "staged layout");

    let discard = temp_dir_in(output, DISCARD_PREFIX)?;
    for entry in entries {
        swap_entry(entry, output, staging.path(), discard.path())?;
    }

    discard.close().map_err(SplitError::io(output))?;
    staging.close().map_err(SplitError::io(output))?;

    info!(output = %output.display(), files = written + 1, "wrote layout");
    Ok(())
}

fn temp_dir_in(output: &Path, prefix: &str) -> Result<TempDir, SplitError> {
    Builder::new()
        .prefix(prefix)
        .tempdir_in(output)
        .map_err(SplitError::io(output))
}

fn swap_entry(entry: &Path, output: &Path, staging: &Path, discard: &Path) -> Result<(), SplitError> {
    let target = output.join(entry);
    let staged = staging.join(entry);

    if fs::symlink_metadata(&target).is_ok() {
        let aside = discard.join(entry);
        create_parent(&aside)?;
        fs::rename(&target, &aside).map_err(SplitError::io(&target))?;
        debug!(entry = %entry.display(), "moved previous entry aside");
    }
    if staged.exists() {
        create_parent(&target)?;
        fs::rename(&staged, &target).map_err(SplitError::io(&staged))?;
    }
    Ok(())
}

fn create_parent(path: &Path) -> Result<(), SplitError> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(SplitError::io(parent)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{Fragment, FragmentKind};

    fn layout(name: &str) -> SplitResult<Node> {
        let mut result = SplitResult::new("root.yaml", Node::mapping());
        result.add_fragment(Fragment::new(
            format!("components/schemas/{name}.yaml"),
            FragmentKind::Definition(name.to_string()),
            Node::string(name),
        ));
        result
    }

    #[test]
    fn should_replace_previous_layout() -> anyhow::Result<()> {
        let output = tempfile::tempdir()?;
        let config = SplitConfig::default();
        fs::write(output.path().join("README.md"), "kept")?;

        write_layout(&layout("Old"), output.path(), &config)?;
        write_layout(&layout("New"), output.path(), &config)?;

        let schemas = output.path().join("components/schemas");
        assert!(schemas.join("New.yaml").is_file());
        assert!(!schemas.join("Old.yaml").exists());
        assert!(output.path().join("root.yaml").is_file());
        assert_eq!(fs::read_to_string(output.path().join("README.md"))?, "kept");

        let leftovers: Vec<_> = fs::read_dir(output.path())?
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".oasplit-"))
            .collect();
        assert!(leftovers.is_empty(), "leftovers: {leftovers:?}");
        Ok(())
    }

    #[test]
    fn should_skip_fragments_outside_managed_entries() -> anyhow::Result<()> {
        let output = tempfile::tempdir()?;
        let mut result = layout("User");
        result.add_fragment(Fragment::new(
            "elsewhere/Stray.yaml",
            FragmentKind::Definition("Stray".to_string()),
            Node::mapping(),
        ));

        write_layout(&result, output.path(), &SplitConfig::default())?;

        assert!(!output.path().join("elsewhere").exists());
        assert!(output.path().join("components/schemas/User.yaml").is_file());
        Ok(())
    }
}
