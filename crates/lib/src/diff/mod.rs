//! Structural diff between two pipeline configurations.
//!
//! Each collection kind is diffed independently by entity name. The engine
//! has no knowledge of references between collections (a job naming a
//! resource that no longer exists is for the store to reject).
//!
//! # Record Order
//!
//! Within one collection records are emitted as:
//! 1. `Removed` - in the order the names appear in the existing config
//! 2. `Added` - in the order the names appear in the new config
//! 3. `Changed` - sorted by name

use serde::Serialize;

use crate::config::{Body, CollectionKind, Config, Entity};

mod index;

pub use index::NamedEntityIndex;

/// One difference between the existing and new version of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DiffRecord {
  Added(Entity),
  Removed(Entity),
  Changed { name: String, old: Body, new: Body },
}

impl DiffRecord {
  pub fn name(&self) -> &str {
    match self {
      DiffRecord::Added(entity) | DiffRecord::Removed(entity) => &entity.name,
      DiffRecord::Changed { name, .. } => name,
    }
  }

  /// Per-field detail for `Changed` records; empty for the others.
  pub fn field_changes(&self) -> Vec<FieldChange> {
    match self {
      DiffRecord::Changed { old, new, .. } => field_changes(old, new),
      DiffRecord::Added(_) | DiffRecord::Removed(_) => Vec::new(),
    }
  }
}

/// A top-level field of an entity body that differs between versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
  pub key: String,
  /// `None` if the field was added.
  pub old: Option<serde_yaml::Value>,
  /// `None` if the field was removed.
  pub new: Option<serde_yaml::Value>,
}

/// Compare the top-level fields of two bodies, sorted by key.
pub fn field_changes(old: &Body, new: &Body) -> Vec<FieldChange> {
  let mut keys: Vec<&String> = old.keys().chain(new.keys()).collect();
  keys.sort();
  keys.dedup();

  keys
    .into_iter()
    .filter_map(|key| {
      let (before, after) = (old.get(key), new.get(key));
      (before != after).then(|| FieldChange {
        key: key.clone(),
        old: before.cloned(),
        new: after.cloned(),
      })
    })
    .collect()
}

/// Diff two indices of the same collection kind.
pub fn diff_indices(existing: &NamedEntityIndex<'_>, new: &NamedEntityIndex<'_>) -> Vec<DiffRecord> {
  let mut records: Vec<DiffRecord> = existing
    .iter()
    .filter(|entity| !new.contains(&entity.name))
    .map(|entity| DiffRecord::Removed(entity.clone()))
    .collect();

  records.extend(
    new
      .iter()
      .filter(|entity| !existing.contains(&entity.name))
      .map(|entity| DiffRecord::Added(entity.clone())),
  );

  let mut changed: Vec<DiffRecord> = existing
    .iter()
    .filter_map(|old| {
      let new = new.get(&old.name)?;
      (old.body != new.body).then(|| DiffRecord::Changed {
        name: old.name.clone(),
        old: old.body.clone(),
        new: new.body.clone(),
      })
    })
    .collect();
  changed.sort_by(|a, b| a.name().cmp(b.name()));
  records.extend(changed);

  records
}

/// Diff all four collections of two configs.
pub fn diff_configs(existing: &Config, new: &Config) -> ConfigDiff {
  ConfigDiff::between(existing, new)
}

/// Records for one collection kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffSection {
  pub kind: CollectionKind,
  pub records: Vec<DiffRecord>,
}

/// The diff of all four collections, in [`CollectionKind::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigDiff {
  pub sections: Vec<DiffSection>,
}

impl ConfigDiff {
  pub fn between(existing: &Config, new: &Config) -> Self {
    let sections = CollectionKind::ALL
      .into_iter()
      .map(|kind| {
        let before = NamedEntityIndex::build(existing.collection(kind));
        let after = NamedEntityIndex::build(new.collection(kind));
        DiffSection {
          kind,
          records: diff_indices(&before, &after),
        }
      })
      .collect();

    Self { sections }
  }

  pub fn section(&self, kind: CollectionKind) -> &[DiffRecord] {
    self
      .sections
      .iter()
      .find(|section| section.kind == kind)
      .map(|section| section.records.as_slice())
      .unwrap_or_default()
  }

  /// Total number of records across all collections.
  pub fn len(&self) -> usize {
    self.sections.iter().map(|section| section.records.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
