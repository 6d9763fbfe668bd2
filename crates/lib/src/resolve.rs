//! Resolution of a raw pipeline document into its final text.
//!
//! The resolver sniffs the document once and composes the evaluators:
//!
//! 1. If legacy `{{name}}` placeholders are present, build the legacy
//!    variables and run the legacy evaluator.
//! 2. Always build the current variables and run the strict current
//!    evaluator over the (possibly already legacy-resolved) text.
//!
//! Any failure aborts resolution; no partial document is returned.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, ConfigError};
use crate::template::{CurrentEvaluator, Evaluator, LegacyEvaluator, TemplateError, TemplateStyle};
use crate::vars::{LegacyVariables, VariableFile, VariablePair, VariableStore, VarsError};

/// Errors that can occur while resolving a document.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("config is not valid UTF-8: {0}")]
  NotUtf8(#[from] FromUtf8Error),

  #[error(transparent)]
  Vars(#[from] VarsError),

  #[error(transparent)]
  Template(#[from] TemplateError),
}

/// A pipeline document before placeholder resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument(String);

impl RawDocument {
  pub fn new(text: impl Into<String>) -> Self {
    Self(text.into())
  }

  pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ResolveError> {
    Ok(Self(String::from_utf8(bytes)?))
  }

  pub fn read(path: &Path) -> Result<Self, ResolveError> {
    let bytes = fs::read(path).map_err(|source| ResolveError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_bytes(bytes)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn style(&self) -> TemplateStyle {
    TemplateStyle::detect(&self.0)
  }
}

/// A pipeline document with every placeholder resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDocument(String);

impl ResolvedDocument {
  pub fn new(text: impl Into<String>) -> Self {
    Self(text.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }

  /// Parse the resolved text into a [`Config`].
  pub fn parse(&self) -> Result<Config, ConfigError> {
    Config::from_yaml(&self.0)
  }
}

/// Variable sources given for one invocation.
#[derive(Debug, Clone, Default)]
pub struct VariableInputs {
  /// Variable files, highest precedence first.
  pub files: Vec<VariableFile>,
  /// `name=value` pairs; these win over every file.
  pub flags: Vec<VariablePair>,
}

/// Resolves raw documents against a fixed set of variable sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
  inputs: VariableInputs,
}

impl ConfigResolver {
  pub fn new(inputs: VariableInputs) -> Self {
    Self { inputs }
  }

  pub fn resolve(&self, raw: &RawDocument) -> Result<ResolvedDocument, ResolveError> {
    let VariableInputs { files, flags } = &self.inputs;
    let style = raw.style();

    let intermediate = if style.uses_legacy() {
      warn!("config uses deprecated {{{{name}}}} placeholders; switch to ((name))");
      let legacy = LegacyVariables::build(files, flags)?;
      LegacyEvaluator::new(&legacy).evaluate(raw.as_str())?
    } else {
      raw.as_str().to_string()
    };

    let vars = VariableStore::build(files, flags)?;
    let resolved = CurrentEvaluator::new(&vars).evaluate(&intermediate)?;

    debug!(?style, variables = vars.len(), "resolved config");
    Ok(ResolvedDocument(resolved))
  }
}
