//! Variable sources and the merged stores built from them.
//!
//! Two kinds of source exist: variable files (YAML mappings) and
//! `name=value` pairs given on the command line. Both template syntaxes
//! build their store from the same sources with the same precedence, but
//! type the values differently (see [`VariablePair`]).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

mod pair;
mod store;

pub use pair::VariablePair;
pub use store::{Descend, LegacyVariables, VariableFile, VariableStore, Variables};

/// Errors produced while reading or merging variable sources.
#[derive(Debug, Error)]
pub enum VarsError {
  /// A variable file is not a YAML mapping.
  #[error("could not decode variables from {origin}: {source}")]
  Decode {
    origin: String,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("failed to read variables file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid variable '{0}': expected name=value")]
  InvalidPair(String),

  #[error("invalid value for variable '{name}': {source}")]
  InvalidPairValue {
    name: String,
    #[source]
    source: serde_yaml::Error,
  },
}
