use std::io;

use pipeset_lib::apply::{ApplyRequest, DiffSink, RenderEvent};
use pipeset_lib::config::{CollectionKind, Config};
use pipeset_lib::diff::DiffRecord;
use pipeset_lib::resolve::{RawDocument, ResolvedDocument, VariableInputs};
use pipeset_lib::store::{
  ConfigStore, ConfigValidationError, ConfigWarning, SaveResult, StoreError, StoredConfig, VersionToken,
};
use pipeset_lib::vars::{VariableFile, VariablePair};

/// In-memory store that records every successful `put`.
#[derive(Debug, Default)]
pub struct FakeStore {
  pub stored: Option<StoredConfig>,
  pub result: SaveResult,
  pub puts: Vec<(String, VersionToken, String)>,
  pub put_attempts: usize,
  /// `get` fails with an I/O error.
  pub unreadable: bool,
  /// `put` fails as if another writer got there first.
  pub conflicting: bool,
}

impl FakeStore {
  pub fn empty() -> Self {
    Self {
      result: SaveResult {
        created: true,
        ..SaveResult::default()
      },
      ..Self::default()
    }
  }

  pub fn holding(text: &str, version: u64) -> Self {
    Self {
      stored: Some(StoredConfig {
        config: Config::from_yaml(text).unwrap(),
        raw: text.to_string(),
        version: VersionToken::from(version),
        exists: true,
        validation: None,
      }),
      result: SaveResult {
        updated: true,
        ..SaveResult::default()
      },
      ..Self::default()
    }
  }

  pub fn invalid(raw: &str, version: u64, messages: &[&str]) -> Self {
    Self {
      stored: Some(StoredConfig {
        config: Config::default(),
        raw: raw.to_string(),
        version: VersionToken::from(version),
        exists: true,
        validation: Some(ConfigValidationError::new(
          messages.iter().map(|m| m.to_string()).collect(),
        )),
      }),
      result: SaveResult {
        updated: true,
        ..SaveResult::default()
      },
      ..Self::default()
    }
  }

  pub fn unreadable(mut self) -> Self {
    self.unreadable = true;
    self
  }

  pub fn conflicting(mut self) -> Self {
    self.conflicting = true;
    self
  }

  pub fn with_result(mut self, created: bool, updated: bool, warnings: &[&str]) -> Self {
    self.result = SaveResult {
      created,
      updated,
      warnings: warnings
        .iter()
        .map(|w| ConfigWarning {
          message: w.to_string(),
        })
        .collect(),
    };
    self
  }
}

impl ConfigStore for FakeStore {
  fn get(&self, pipeline: &str) -> Result<StoredConfig, StoreError> {
    if self.unreadable {
      return Err(StoreError::Io {
        path: format!("{}.json", pipeline).into(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
      });
    }
    Ok(self.stored.clone().unwrap_or_else(StoredConfig::missing))
  }

  fn put(
    &mut self,
    pipeline: &str,
    version: &VersionToken,
    document: &ResolvedDocument,
  ) -> Result<SaveResult, StoreError> {
    self.put_attempts += 1;
    if self.conflicting {
      return Err(StoreError::Conflict {
        pipeline: pipeline.to_string(),
        expected: version.clone(),
        found: VersionToken::from(99),
      });
    }
    self
      .puts
      .push((pipeline.to_string(), version.clone(), document.as_str().to_string()));
    Ok(self.result.clone())
  }
}

/// Owned copy of a [`RenderEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
  Section(CollectionKind),
  Record(CollectionKind, DiffRecord),
  ValidationErrors(Vec<String>),
  Warnings(Vec<String>),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
  pub events: Vec<Rendered>,
}

impl DiffSink for RecordingSink {
  fn render(&mut self, event: RenderEvent<'_>) {
    self.events.push(match event {
      RenderEvent::Section(kind) => Rendered::Section(kind),
      RenderEvent::Record(kind, record) => Rendered::Record(kind, record.clone()),
      RenderEvent::ValidationErrors(messages) => Rendered::ValidationErrors(messages.to_vec()),
      RenderEvent::Warnings(warnings) => {
        Rendered::Warnings(warnings.iter().map(|w| w.message.clone()).collect())
      }
    });
  }
}

pub fn request(document: &str, files: &[(&str, &str)], flags: &[&str]) -> ApplyRequest {
  ApplyRequest::new(
    "main",
    RawDocument::new(document),
    VariableInputs {
      files: files.iter().map(|(o, p)| VariableFile::new(*o, *p)).collect(),
      flags: flags.iter().map(|f| VariablePair::parse(f).unwrap()).collect(),
    },
  )
}
