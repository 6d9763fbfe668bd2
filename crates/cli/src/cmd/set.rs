//! Implementation of the `pipeset set` command.
//!
//! Resolves the pipeline document, shows how it differs from what is
//! stored, and saves it once confirmed.

use std::path::PathBuf;

use anyhow::{Context, Result};

use pipeset_lib::apply::{ApplyOutcome, FixedAnswer, apply};

use super::{SourceArgs, open_store};
use crate::output::{TerminalSink, print_success};
use crate::prompts::TerminalConfirm;

pub fn cmd_set(source: SourceArgs, non_interactive: bool, store_dir: Option<PathBuf>) -> Result<()> {
  let mut store = open_store(store_dir)?;
  let pipeline = source.pipeline.clone();
  let request = source.into_request()?;

  let mut sink = TerminalSink::stdout();

  let outcome = if non_interactive {
    apply(request, &mut store, &mut FixedAnswer(true), &mut sink)
  } else {
    apply(request, &mut store, &mut TerminalConfirm::new("apply configuration?"), &mut sink)
  }
  .with_context(|| format!("Failed to set pipeline: {}", pipeline))?;
  sink.finish().context("Failed to write diff")?;

  match outcome {
    ApplyOutcome::Declined => println!("bailing out"),
    ApplyOutcome::Created => print_success("pipeline created!"),
    ApplyOutcome::Updated => print_success("configuration updated"),
  }

  Ok(())
}
