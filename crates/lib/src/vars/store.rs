//! Merging variable sources into one immutable lookup.
//!
//! Sources are merged with a fixed precedence, highest first:
//!
//! 1. flag-supplied pairs
//! 2. variable files, in the order they were given (the first file wins
//!    over the second, and so on)
//!
//! Files are folded right-to-left and flags are applied last, so each
//! step only ever overwrites lower-precedence values.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::{VariablePair, VarsError};

/// A variable file payload and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableFile {
  /// Label used in error messages, usually the file path.
  pub origin: String,
  pub payload: Vec<u8>,
}

impl VariableFile {
  pub fn new(origin: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
    Self {
      origin: origin.into(),
      payload: payload.into(),
    }
  }

  /// Read a variable file from disk.
  pub fn read(path: &Path) -> Result<Self, VarsError> {
    let payload = fs::read(path).map_err(|source| VarsError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Self::new(path.display().to_string(), payload))
  }

  fn decode<V: DeserializeOwned>(&self) -> Result<BTreeMap<String, V>, VarsError> {
    if self.payload.iter().all(u8::is_ascii_whitespace) {
      return Ok(BTreeMap::new());
    }

    let decoded: Option<BTreeMap<String, V>> =
      serde_yaml::from_slice(&self.payload).map_err(|source| VarsError::Decode {
        origin: self.origin.clone(),
        source,
      })?;

    Ok(decoded.unwrap_or_default())
  }
}

/// Values that can be descended into with dotted variable names.
pub trait Descend {
  fn child(&self, key: &str) -> Option<&Self>;
}

impl Descend for serde_yaml::Value {
  fn child(&self, key: &str) -> Option<&Self> {
    self.as_mapping()?.get(key)
  }
}

impl Descend for serde_json::Value {
  fn child(&self, key: &str) -> Option<&Self> {
    self.as_object()?.get(key)
  }
}

/// An immutable, merged set of variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Variables<V> {
  values: BTreeMap<String, V>,
}

/// Variables for the current `((name))` syntax.
pub type VariableStore = Variables<serde_yaml::Value>;

/// Variables for the legacy `{{name}}` syntax.
pub type LegacyVariables = Variables<serde_json::Value>;

impl<V> Default for Variables<V> {
  fn default() -> Self {
    Self { values: BTreeMap::new() }
  }
}

impl<V> FromIterator<(String, V)> for Variables<V> {
  fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
    Self {
      values: iter.into_iter().collect(),
    }
  }
}

impl<V: Descend> Variables<V> {
  /// Look up a variable.
  ///
  /// An exact key match wins. Otherwise `a.b.c` resolves `a` and then
  /// descends through the mapping keys `b` and `c`.
  pub fn lookup(&self, name: &str) -> Option<&V> {
    if let Some(value) = self.values.get(name) {
      return Some(value);
    }

    let mut parts = name.split('.');
    let root = self.values.get(parts.next()?)?;
    parts.try_fold(root, |value, key| value.child(key))
  }
}

impl<V> Variables<V> {
  pub fn get(&self, name: &str) -> Option<&V> {
    self.values.get(name)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
    self.values.iter()
  }
}

impl VariableStore {
  /// Build the current-syntax store from files and flags.
  pub fn build(files: &[VariableFile], flags: &[VariablePair]) -> Result<Self, VarsError> {
    merge(files, flags.iter().map(|pair| (pair.name.clone(), pair.value.clone())))
  }
}

impl LegacyVariables {
  /// Build the legacy-syntax store from files and flags.
  ///
  /// Flag values keep their raw text: `{{replicas}}` with `replicas=3`
  /// renders as `"3"`.
  pub fn build(files: &[VariableFile], flags: &[VariablePair]) -> Result<Self, VarsError> {
    merge(
      files,
      flags
        .iter()
        .map(|pair| (pair.name.clone(), serde_json::Value::String(pair.raw.clone()))),
    )
  }
}

fn merge<V: DeserializeOwned>(
  files: &[VariableFile],
  flags: impl Iterator<Item = (String, V)>,
) -> Result<Variables<V>, VarsError> {
  let mut values = BTreeMap::new();

  for file in files.iter().rev() {
    values.extend(file.decode::<V>()?);
  }
  values.extend(flags);

  debug!(files = files.len(), keys = values.len(), "merged variable sources");
  Ok(Variables { values })
}
