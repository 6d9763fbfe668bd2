//! On-disk pipeline store.
//!
//! # Storage Layout
//!
//! ```text
//! {base}/
//! ├── main.json        # { "version": 3, "config": "<document text>" }
//! └── release.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
  ConfigStore, ConfigValidationError, ConfigWarning, SaveResult, StoreError, StoredConfig, VersionToken,
};
use crate::config::{CollectionKind, Config};
use crate::diff::NamedEntityIndex;
use crate::platform::paths::store_dir;
use crate::resolve::ResolvedDocument;

#[derive(Debug, Serialize, Deserialize)]
struct PipelineRecord {
  version: u64,
  config: String,
}

/// Stores each pipeline as `{base}/{pipeline}.json`.
///
/// Writes go through a temp file and a rename so a record is never left
/// half written.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
  base_path: PathBuf,
}

impl FileConfigStore {
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  /// Create a store at the default location.
  ///
  /// Uses `$PIPESET_STORE` when set, otherwise `pipelines` under the data
  /// directory (`~/.local/share/pipeset/pipelines` on Linux).
  pub fn default_store() -> Result<Self, StoreError> {
    store_dir().map(Self::new).ok_or(StoreError::NoLocation)
  }

  pub fn base_path(&self) -> &Path {
    &self.base_path
  }

  fn record_path(&self, pipeline: &str) -> PathBuf {
    self.base_path.join(format!("{}.json", pipeline))
  }

  fn load_record(&self, pipeline: &str) -> Result<Option<PipelineRecord>, StoreError> {
    let path = self.record_path(pipeline);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(source) => return Err(StoreError::Io { path, source }),
    };

    serde_json::from_str(&content)
      .map(Some)
      .map_err(|source| StoreError::Parse { path, source })
  }

  fn save_record(&self, pipeline: &str, record: &PipelineRecord) -> Result<(), StoreError> {
    fs::create_dir_all(&self.base_path).map_err(|source| StoreError::Io {
      path: self.base_path.clone(),
      source,
    })?;

    let path = self.record_path(pipeline);
    let temp_path = self.base_path.join(format!("{}.json.tmp", pipeline));

    let content = serde_json::to_string_pretty(record).map_err(StoreError::Serialize)?;
    fs::write(&temp_path, &content).map_err(|source| StoreError::Io {
      path: temp_path.clone(),
      source,
    })?;
    fs::rename(&temp_path, &path).map_err(|source| StoreError::Io { path, source })?;

    Ok(())
  }
}

impl ConfigStore for FileConfigStore {
  fn get(&self, pipeline: &str) -> Result<StoredConfig, StoreError> {
    validate_name(pipeline)?;

    let Some(record) = self.load_record(pipeline)? else {
      debug!(pipeline, "no stored config");
      return Ok(StoredConfig::missing());
    };

    let version = VersionToken::from(record.version);
    let (config, validation) = match check(&record.config) {
      Ok(config) => (config, None),
      Err(invalid) => (Config::default(), Some(invalid)),
    };

    debug!(pipeline, %version, valid = validation.is_none(), "loaded stored config");
    Ok(StoredConfig {
      config,
      raw: record.config,
      version,
      exists: true,
      validation,
    })
  }

  fn put(
    &mut self,
    pipeline: &str,
    version: &VersionToken,
    document: &ResolvedDocument,
  ) -> Result<SaveResult, StoreError> {
    validate_name(pipeline)?;

    let current = self.load_record(pipeline)?;
    let found = current
      .as_ref()
      .map(|record| VersionToken::from(record.version))
      .unwrap_or_default();
    if &found != version {
      return Err(StoreError::Conflict {
        pipeline: pipeline.to_string(),
        expected: version.clone(),
        found,
      });
    }

    let config = check(document.as_str()).map_err(StoreError::Rejected)?;
    let warnings = duplicate_warnings(&config);

    let next = current.as_ref().map_or(1, |record| record.version + 1);
    self.save_record(
      pipeline,
      &PipelineRecord {
        version: next,
        config: document.as_str().to_string(),
      },
    )?;

    let created = current.is_none();
    info!(pipeline, version = next, created, "saved config");
    Ok(SaveResult {
      created,
      updated: !created,
      warnings,
    })
  }
}

/// Pipeline names become file names, so they may not escape the base path.
fn validate_name(pipeline: &str) -> Result<(), StoreError> {
  let invalid = pipeline.is_empty()
    || pipeline.starts_with('.')
    || pipeline.contains(['/', '\\'])
    || pipeline.chars().any(char::is_control);

  if invalid {
    return Err(StoreError::InvalidName(pipeline.to_string()));
  }
  Ok(())
}

/// Parse a document and apply the store's own rules on top.
fn check(text: &str) -> Result<Config, ConfigValidationError> {
  let config = Config::from_yaml(text).map_err(|e| ConfigValidationError::new(vec![e.to_string()]))?;

  let messages: Vec<String> = CollectionKind::ALL
    .into_iter()
    .flat_map(|kind| {
      config
        .collection(kind)
        .iter()
        .enumerate()
        .filter(|(_, entity)| entity.name.trim().is_empty())
        .map(move |(position, _)| format!("{} at position {} has an empty name", kind, position))
    })
    .collect();

  if messages.is_empty() {
    Ok(config)
  } else {
    Err(ConfigValidationError::new(messages))
  }
}

fn duplicate_warnings(config: &Config) -> Vec<ConfigWarning> {
  CollectionKind::ALL
    .into_iter()
    .flat_map(|kind| {
      NamedEntityIndex::build(config.collection(kind))
        .duplicates()
        .iter()
        .map(|name| ConfigWarning {
          message: format!("{} '{}' is declared more than once; the last declaration is used", kind, name),
        })
        .collect::<Vec<_>>()
    })
    .collect()
}
