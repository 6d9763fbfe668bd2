//! Implementation of the `pipeset diff` command.
//!
//! Shows what `pipeset set` would change without asking or saving.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use pipeset_lib::apply::plan;
use pipeset_lib::diff::ConfigDiff;

use super::{SourceArgs, open_store};
use crate::output::{NoticeSink, TerminalSink, print_info, print_json};

#[derive(Serialize)]
struct DiffJson<'a> {
  pipeline: &'a str,
  changes: usize,
  diff: &'a ConfigDiff,
}

pub fn cmd_diff(source: SourceArgs, json: bool, store_dir: Option<PathBuf>) -> Result<()> {
  let store = open_store(store_dir)?;
  let pipeline = source.pipeline.clone();
  let request = source.into_request()?;

  if json {
    let diff = plan(request, &store, &mut NoticeSink)
      .with_context(|| format!("Failed to diff pipeline: {}", pipeline))?;
    return print_json(&DiffJson {
      pipeline: &pipeline,
      changes: diff.len(),
      diff: &diff,
    });
  }

  let mut sink = TerminalSink::stdout();
  let diff = plan(request, &store, &mut sink).with_context(|| format!("Failed to diff pipeline: {}", pipeline))?;
  sink.finish().context("Failed to write diff")?;

  if diff.is_empty() {
    print_info("no changes");
  }

  Ok(())
}
