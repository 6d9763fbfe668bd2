//! Persistence of pipeline configurations.
//!
//! [`ConfigStore`] is the seam between the apply workflow and wherever
//! configurations live. [`FileConfigStore`] keeps one JSON record per
//! pipeline on local disk.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::resolve::ResolvedDocument;

mod file;

pub use file::FileConfigStore;

/// Opaque version of a stored configuration.
///
/// The empty token means there is no existing configuration. A token read
/// with [`ConfigStore::get`] is handed back to [`ConfigStore::put`] so the
/// store can detect concurrent modification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  /// The token for "no existing configuration".
  pub fn none() -> Self {
    Self::default()
  }

  pub fn is_none(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<u64> for VersionToken {
  fn from(version: u64) -> Self {
    Self(version.to_string())
  }
}

impl fmt::Display for VersionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// The store's judgement that a configuration is invalid.
///
/// Returned as part of [`StoredConfig`] when the stored document can no
/// longer be read as a config, and inside [`StoreError::Rejected`] when a
/// submitted document is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid configuration: {}", .messages.join("; "))]
pub struct ConfigValidationError {
  pub messages: Vec<String>,
}

impl ConfigValidationError {
  pub fn new(messages: Vec<String>) -> Self {
    Self { messages }
  }
}

/// A non-fatal remark about a saved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
  pub message: String,
}

impl fmt::Display for ConfigWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}

/// What the store currently holds for a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredConfig {
  /// Empty when the pipeline does not exist or fails validation.
  pub config: Config,
  /// The stored document text, empty when the pipeline does not exist.
  pub raw: String,
  pub version: VersionToken,
  pub exists: bool,
  pub validation: Option<ConfigValidationError>,
}

impl StoredConfig {
  /// The result of fetching a pipeline that was never saved.
  pub fn missing() -> Self {
    Self {
      config: Config::default(),
      raw: String::new(),
      version: VersionToken::none(),
      exists: false,
      validation: None,
    }
  }
}

/// Outcome of a successful [`ConfigStore::put`].
///
/// Exactly one of `created` and `updated` is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaveResult {
  pub created: bool,
  pub updated: bool,
  pub warnings: Vec<ConfigWarning>,
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("pipeline '{pipeline}' was modified concurrently (expected version '{expected}', found '{found}')")]
  Conflict {
    pipeline: String,
    expected: VersionToken,
    found: VersionToken,
  },

  #[error("configuration rejected: {0}")]
  Rejected(ConfigValidationError),

  #[error("invalid pipeline name '{0}'")]
  InvalidName(String),

  #[error("store I/O error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize stored pipeline: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("corrupt pipeline record {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("could not determine the store directory; set PIPESET_STORE or HOME")]
  NoLocation,
}

/// Where pipeline configurations are read from and saved to.
pub trait ConfigStore {
  /// Fetch the current configuration of `pipeline`.
  ///
  /// A configuration the store considers invalid is not an error here; it
  /// comes back with `validation` set.
  fn get(&self, pipeline: &str) -> Result<StoredConfig, StoreError>;

  /// Replace the configuration of `pipeline`, provided its version still
  /// matches `version`.
  fn put(
    &mut self,
    pipeline: &str,
    version: &VersionToken,
    document: &ResolvedDocument,
  ) -> Result<SaveResult, StoreError>;
}
