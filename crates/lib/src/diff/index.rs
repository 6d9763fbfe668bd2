//! Name-keyed index over one collection.

use std::collections::{HashMap, HashSet};

use crate::config::Entity;

/// Maps entity names to entities for one collection.
///
/// Duplicate names collapse to the last occurrence, while iteration keeps
/// the position of each name's first occurrence. Collapsed names are
/// remembered in [`duplicates`](Self::duplicates) so callers can warn about
/// them; they are very likely a mistake in the config.
#[derive(Debug, Clone, Default)]
pub struct NamedEntityIndex<'a> {
  order: Vec<&'a str>,
  entities: HashMap<&'a str, &'a Entity>,
  duplicates: Vec<&'a str>,
}

impl<'a> NamedEntityIndex<'a> {
  pub fn build(collection: &'a [Entity]) -> Self {
    let mut index = Self {
      order: Vec::with_capacity(collection.len()),
      entities: HashMap::with_capacity(collection.len()),
      duplicates: Vec::new(),
    };
    let mut seen_twice = HashSet::new();

    for entity in collection {
      let name = entity.name.as_str();
      match index.entities.insert(name, entity) {
        None => index.order.push(name),
        Some(_) if seen_twice.insert(name) => index.duplicates.push(name),
        Some(_) => {}
      }
    }

    index
  }

  pub fn get(&self, name: &str) -> Option<&'a Entity> {
    self.entities.get(name).copied()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entities.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.order.len()
  }

  pub fn is_empty(&self) -> bool {
    self.order.is_empty()
  }

  /// Entities in first-occurrence order.
  pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + '_ {
    self.order.iter().map(|name| self.entities[name])
  }

  /// Names that appeared more than once, in order of their second occurrence.
  pub fn duplicates(&self) -> &[&'a str] {
    &self.duplicates
  }
}
