use std::path::{Path, PathBuf};

/// Layout and naming conventions of a decomposition.
///
/// # Default Configuration
///
/// - **Paths directory**: `paths`
/// - **Definitions directory**: `components/schemas`
/// - **Root file**: `root.yaml`
/// - **Shared label**: `shared` (definitions used by several tags)
/// - **Local suffixes**: `Request`, `Response`, `RequestBody`, `ResponseBody`
/// - **Verb order**: `get`, `post`, `put`, `delete`, then any other key
///
/// # Example
///
/// ```rust
/// use oasplit_core::split::SplitConfig;
///
/// let config = SplitConfig::default()
///     .with_shared_label("common")
///     .with_root_file("openapi.yaml")
///     .add_local_suffix("Payload");
///
/// assert!(config.is_local("CreateUserPayload"));
/// assert!(!config.is_local("User"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    paths_dir: PathBuf,
    definitions_dir: PathBuf,
    root_file: PathBuf,
    shared_label: String,
    local_suffixes: Vec<String>,
    verb_order: Vec<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            paths_dir: PathBuf::from("paths"),
            definitions_dir: PathBuf::from("components").join("schemas"),
            root_file: PathBuf::from("root.yaml"),
            shared_label: "shared".to_string(),
            local_suffixes: ["Request", "Response", "RequestBody", "ResponseBody"]
                .map(String::from)
                .to_vec(),
            verb_order: ["get", "post", "put", "delete"].map(String::from).to_vec(),
        }
    }
}

impl SplitConfig {
    /// Sets the directory receiving one file per path, relative to the output directory.
    #[must_use]
    pub fn with_paths_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths_dir = dir.into();
        self
    }

    /// Sets the directory receiving one file per global definition.
    #[must_use]
    pub fn with_definitions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.definitions_dir = dir.into();
        self
    }

    /// Sets the file name of the entry document.
    #[must_use]
    pub fn with_root_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.root_file = file.into();
        self
    }

    /// Sets the subdirectory of definitions consumed by several tags.
    #[must_use]
    pub fn with_shared_label(mut self, label: impl Into<String>) -> Self {
        self.shared_label = label.into();
        self
    }

    /// Replaces the name suffixes marking request/response-local definitions.
    #[must_use]
    pub fn with_local_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.local_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a name suffix marking request/response-local definitions.
    #[must_use]
    pub fn add_local_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.local_suffixes.push(suffix.into());
        self
    }

    /// Replaces the precedence of operation keys inside a path file.
    #[must_use]
    pub fn with_verb_order<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verb_order = verbs.into_iter().map(Into::into).collect();
        self
    }

    /// Directory of path files.
    #[must_use]
    pub fn paths_dir(&self) -> &Path {
        &self.paths_dir
    }

    /// Directory of global definition files.
    #[must_use]
    pub fn definitions_dir(&self) -> &Path {
        &self.definitions_dir
    }

    /// Entry document file name.
    #[must_use]
    pub fn root_file(&self) -> &Path {
        &self.root_file
    }

    /// Label of the multi-tag bucket.
    #[must_use]
    pub fn shared_label(&self) -> &str {
        &self.shared_label
    }

    /// Suffixes of local definitions.
    #[must_use]
    pub fn local_suffixes(&self) -> &[String] {
        &self.local_suffixes
    }

    /// Operation key precedence.
    #[must_use]
    pub fn verb_order(&self) -> &[String] {
        &self.verb_order
    }

    /// `true` if `name` carries one of the local suffixes.
    #[must_use]
    pub fn is_local(&self, name: &str) -> bool {
        self.local_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Paths the layout writer owns below the output directory.
    pub(crate) fn managed_entries(&self) -> [&Path; 3] {
        [&self.paths_dir, &self.definitions_dir, &self.root_file]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_use_conventional_layout_by_default() {
        let config = SplitConfig::default();

        assert_eq!(config.paths_dir(), Path::new("paths"));
        assert_eq!(config.definitions_dir(), Path::new("components/schemas"));
        assert_eq!(config.root_file(), Path::new("root.yaml"));
        assert_eq!(config.shared_label(), "shared");
        assert_eq!(config.verb_order(), ["get", "post", "put", "delete"]);
    }

    #[test]
    fn should_override_conventions() {
        let config = SplitConfig::default()
            .with_paths_dir("operations")
            .with_definitions_dir("schemas")
            .with_local_suffixes(["Input", "Output"])
            .with_verb_order(["post", "get"]);

        assert_eq!(config.paths_dir(), Path::new("operations"));
        assert_eq!(config.definitions_dir(), Path::new("schemas"));
        assert!(config.is_local("CreateUserInput"));
        assert!(!config.is_local("CreateUserRequest"));
        assert_eq!(config.verb_order(), ["post", "get"]);
    }
}
