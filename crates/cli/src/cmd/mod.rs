mod diff;
mod get;
mod set;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use pipeset_lib::apply::ApplyRequest;
use pipeset_lib::resolve::{RawDocument, VariableInputs};
use pipeset_lib::store::FileConfigStore;
use pipeset_lib::vars::{VariableFile, VariablePair};

pub use diff::cmd_diff;
pub use get::cmd_get;
pub use set::cmd_set;

/// The pipeline document and the variables it is resolved with.
#[derive(Debug, Args)]
pub struct SourceArgs {
  /// Name of the pipeline
  #[arg(short, long)]
  pub pipeline: String,

  /// Path to the pipeline configuration file
  #[arg(short, long)]
  pub config: PathBuf,

  /// Variable as name=value; overrides every variables file
  #[arg(short = 'v', long = "var", value_name = "NAME=VALUE")]
  pub vars: Vec<VariablePair>,

  /// YAML file of variables; earlier files override later ones
  #[arg(short = 'l', long = "load-vars-from", value_name = "FILE")]
  pub var_files: Vec<PathBuf>,
}

impl SourceArgs {
  pub fn into_request(self) -> Result<ApplyRequest> {
    let document = RawDocument::read(&self.config)
      .with_context(|| format!("could not read config file: {}", self.config.display()))?;

    let files = self
      .var_files
      .iter()
      .map(|path| {
        VariableFile::read(path)
          .with_context(|| format!("could not read template variables file: {}", path.display()))
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(ApplyRequest::new(
      self.pipeline,
      document,
      VariableInputs {
        files,
        flags: self.vars,
      },
    ))
  }
}

pub fn open_store(dir: Option<PathBuf>) -> Result<FileConfigStore> {
  match dir {
    Some(dir) => Ok(FileConfigStore::new(dir)),
    None => FileConfigStore::default_store().context("Failed to locate the pipeline store"),
  }
}
