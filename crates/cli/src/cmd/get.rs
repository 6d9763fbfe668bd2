//! Implementation of the `pipeset get` command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use pipeset_lib::config::Config;
use pipeset_lib::store::{ConfigStore, VersionToken};

use super::open_store;
use crate::output::{print_json, print_warning};

#[derive(Serialize)]
struct StoredJson<'a> {
  pipeline: &'a str,
  version: &'a VersionToken,
  config: &'a Config,
  errors: Option<&'a [String]>,
}

pub fn cmd_get(pipeline: &str, json: bool, store_dir: Option<PathBuf>) -> Result<()> {
  let store = open_store(store_dir)?;
  let stored = store
    .get(pipeline)
    .with_context(|| format!("Failed to load pipeline: {}", pipeline))?;

  if !stored.exists {
    bail!("pipeline not found: {}", pipeline);
  }

  if json {
    return print_json(&StoredJson {
      pipeline,
      version: &stored.version,
      config: &stored.config,
      errors: stored.validation.as_ref().map(|invalid| invalid.messages.as_slice()),
    });
  }

  if let Some(invalid) = &stored.validation {
    print_warning(&invalid.to_string());
  }
  print!("{}", stored.raw);
  if !stored.raw.ends_with('\n') {
    println!();
  }

  Ok(())
}
