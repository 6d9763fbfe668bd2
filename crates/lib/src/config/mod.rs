//! Parsed pipeline configuration.
//!
//! Only the four named top-level collections are modeled. Each entity has a
//! required `name`; everything else about it is an opaque body compared by
//! structural equality. Unknown top-level keys are ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The remaining content of an entity once its name is removed.
pub type Body = BTreeMap<String, serde_yaml::Value>;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("malformed config: {0}")]
  Parse(#[from] serde_yaml::Error),
}

/// A uniquely named unit within one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
  pub name: String,
  #[serde(flatten)]
  pub body: Body,
}

impl Entity {
  pub fn new(name: impl Into<String>, body: Body) -> Self {
    Self {
      name: name.into(),
      body,
    }
  }
}

/// The four collections a pipeline configuration is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
  Group,
  Resource,
  ResourceType,
  Job,
}

impl CollectionKind {
  /// All kinds, in the order they are diffed and rendered.
  pub const ALL: [CollectionKind; 4] = [
    CollectionKind::Group,
    CollectionKind::Resource,
    CollectionKind::ResourceType,
    CollectionKind::Job,
  ];

  /// Singular label, e.g. `resource type`.
  pub fn label(self) -> &'static str {
    match self {
      CollectionKind::Group => "group",
      CollectionKind::Resource => "resource",
      CollectionKind::ResourceType => "resource type",
      CollectionKind::Job => "job",
    }
  }

  /// Section title, e.g. `resource types`.
  pub fn title(self) -> &'static str {
    match self {
      CollectionKind::Group => "groups",
      CollectionKind::Resource => "resources",
      CollectionKind::ResourceType => "resource types",
      CollectionKind::Job => "jobs",
    }
  }
}

impl fmt::Display for CollectionKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub groups: Vec<Entity>,
  #[serde(default)]
  pub resources: Vec<Entity>,
  #[serde(default)]
  pub resource_types: Vec<Entity>,
  #[serde(default)]
  pub jobs: Vec<Entity>,
}

impl Config {
  /// Parse a resolved YAML document. A blank document is the empty config.
  pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
    if text.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(text)?)
  }

  pub fn collection(&self, kind: CollectionKind) -> &[Entity] {
    match kind {
      CollectionKind::Group => &self.groups,
      CollectionKind::Resource => &self.resources,
      CollectionKind::ResourceType => &self.resource_types,
      CollectionKind::Job => &self.jobs,
    }
  }

  pub fn is_empty(&self) -> bool {
    CollectionKind::ALL.iter().all(|kind| self.collection(*kind).is_empty())
  }
}
