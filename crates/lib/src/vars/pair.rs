//! `name=value` variable pairs supplied on the command line.

use std::str::FromStr;

use super::VarsError;

/// A single flag-supplied variable.
///
/// The value is kept in two renditions because the two template syntaxes
/// type their values differently:
/// - `value` is the YAML-decoded value used by `((name))` placeholders, so
///   `replicas=3` yields the integer `3`.
/// - `raw` is the text exactly as given, used by legacy `{{name}}`
///   placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct VariablePair {
  pub name: String,
  pub value: serde_yaml::Value,
  pub raw: String,
}

impl VariablePair {
  /// Parse a `name=value` pair. Only the first `=` separates name and value.
  pub fn parse(input: &str) -> Result<Self, VarsError> {
    let (name, raw) = input
      .split_once('=')
      .ok_or_else(|| VarsError::InvalidPair(input.to_string()))?;

    if name.is_empty() {
      return Err(VarsError::InvalidPair(input.to_string()));
    }

    let value = if raw.trim().is_empty() {
      serde_yaml::Value::Null
    } else {
      serde_yaml::from_str::<serde_yaml::Value>(raw).map_err(|source| VarsError::InvalidPairValue {
        name: name.to_string(),
        source,
      })?
    };

    Ok(Self {
      name: name.to_string(),
      value,
      raw: raw.to_string(),
    })
  }
}

impl FromStr for VariablePair {
  type Err = VarsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}
