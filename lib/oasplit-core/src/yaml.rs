//! YAML reading and writing using serde-saphyr.
//!
//! Every document handled by this crate goes through these helpers, so the
//! parser and serializer configuration lives in one place.
//!
//! Mapping keys are always read back as strings, so a response code written as
//! `200:` and one written as `'200':` are the same key here. The serializer emits
//! numeric-looking keys unquoted: a YAML 1.1 reader (PyYAML, for instance) sees
//! them as integers.
//!
//! # Example
//!
//! ```rust,ignore
//! use oasplit_core::{Node, ToYaml};
//!
//! let node = oasplit_core::yaml::load_node("openapi.yaml")?;
//! let yaml_string = node.to_yaml()?;
//!
//! std::fs::write("copy.yaml", yaml_string)?;
//! ```

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::SplitError;
use crate::model::Node;

/// Error type for YAML serialization operations.
pub type YamlError = serde_saphyr::ser_error::Error;

/// Extension trait for serializing types to YAML.
///
/// This trait is implemented for all types that implement [`Serialize`].
/// It provides a convenient `to_yaml()` method for generating YAML strings.
pub trait ToYaml: Serialize + Sized {
    /// Serializes this value to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`YamlError`] if serialization fails.
    fn to_yaml(&self) -> Result<String, YamlError> {
        serde_saphyr::to_string(self)
    }
}

impl<T: Serialize + Sized> ToYaml for T {}

/// Parses a YAML string, `origin` is only used for error reporting.
///
/// # Errors
///
/// Returns [`SplitError::Parse`] if the text is not valid YAML for `T`.
pub fn from_yaml<T: DeserializeOwned>(input: &str, origin: &str) -> Result<T, SplitError> {
    serde_saphyr::from_str(input).map_err(|source| SplitError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Reads and parses a YAML file into a [`Node`].
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid YAML.
pub fn load_node(path: impl AsRef<Path>) -> Result<Node, SplitError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(SplitError::io(path))?;
    from_yaml(&text, &path.display().to_string())
}

/// Serializes a value to YAML and writes it to `path`, creating parent directories.
///
/// # Errors
///
/// Fails on serialization or file system errors.
pub fn write_yaml<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), SplitError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(SplitError::io(parent))?;
    }
    let text = value.to_yaml()?;
    fs::write(path, text).map_err(SplitError::io(path))
}
