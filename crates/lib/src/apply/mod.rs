//! The "set pipeline" workflow.
//!
//! [`apply`] runs the full flow:
//!
//! 1. Fetch the existing configuration and its version from the store
//! 2. Resolve placeholders in the new document and parse it
//! 3. Diff all four collections and render the records
//! 4. Render validation errors reported for the existing configuration
//! 5. Ask for confirmation
//! 6. Save with the fetched version and render any warnings
//! 7. Map the save result to an outcome
//!
//! [`plan`] stops after step 4 and never mutates the store.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::diff::{ConfigDiff, diff_configs};
use crate::resolve::{ConfigResolver, RawDocument, ResolveError, ResolvedDocument, VariableInputs};
use crate::store::{ConfigStore, StoreError, VersionToken};

mod capability;

pub use capability::{Confirm, DiffSink, FixedAnswer, RenderEvent};

/// Everything needed to set one pipeline.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
  pub pipeline: String,
  pub document: RawDocument,
  pub variables: VariableInputs,
}

impl ApplyRequest {
  pub fn new(pipeline: impl Into<String>, document: RawDocument, variables: VariableInputs) -> Self {
    Self {
      pipeline: pipeline.into(),
      document,
      variables,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
  /// Confirmation was refused; the store was not touched.
  Declined,
  Created,
  Updated,
}

/// Errors that can occur while setting a pipeline.
#[derive(Debug, Error)]
pub enum ApplyError {
  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  /// The store claimed to have both created and updated the pipeline, or
  /// neither.
  #[error("store returned an inconsistent save result (created: {created}, updated: {updated})")]
  InconsistentStore { created: bool, updated: bool },
}

struct Prepared {
  version: VersionToken,
  resolved: ResolvedDocument,
  diff: ConfigDiff,
}

/// Resolve, diff and render `request` against what `store` holds, asking
/// `confirm` before saving.
pub fn apply(
  request: ApplyRequest,
  store: &mut impl ConfigStore,
  confirm: &mut impl Confirm,
  sink: &mut impl DiffSink,
) -> Result<ApplyOutcome, ApplyError> {
  let pipeline = request.pipeline.clone();
  info!(pipeline = %pipeline, "setting pipeline");

  let Prepared { version, resolved, diff } = prepare(request, &*store, &mut *sink)?;

  // 5. Confirm
  if !confirm.confirm() {
    info!(pipeline = %pipeline, "declined, store untouched");
    return Ok(ApplyOutcome::Declined);
  }

  // 6. Save
  debug!(pipeline = %pipeline, %version, changes = diff.len(), "saving config");
  let saved = store.put(&pipeline, &version, &resolved)?;
  if !saved.warnings.is_empty() {
    sink.render(RenderEvent::Warnings(&saved.warnings));
  }

  // 7. Outcome
  let outcome = match (saved.created, saved.updated) {
    (true, false) => ApplyOutcome::Created,
    (false, true) => ApplyOutcome::Updated,
    (created, updated) => return Err(ApplyError::InconsistentStore { created, updated }),
  };

  info!(pipeline = %pipeline, ?outcome, "pipeline set");
  Ok(outcome)
}

/// Render the changes `request` would make, without confirming or saving.
pub fn plan(
  request: ApplyRequest,
  store: &impl ConfigStore,
  sink: &mut impl DiffSink,
) -> Result<ConfigDiff, ApplyError> {
  let Prepared { diff, .. } = prepare(request, store, sink)?;
  Ok(diff)
}

fn prepare(
  request: ApplyRequest,
  store: &impl ConfigStore,
  sink: &mut impl DiffSink,
) -> Result<Prepared, ApplyError> {
  let ApplyRequest {
    pipeline,
    document,
    variables,
  } = request;

  // 1. Fetch existing
  let existing = store.get(&pipeline)?;
  debug!(pipeline = %pipeline, exists = existing.exists, version = %existing.version, "fetched existing config");

  let existing_config = match &existing.validation {
    Some(invalid) => {
      warn!(pipeline = %pipeline, errors = invalid.messages.len(), "existing config is invalid");
      Config::default()
    }
    None => existing.config,
  };

  // 2. Resolve and parse
  let resolved = ConfigResolver::new(variables).resolve(&document)?;
  let config = resolved.parse()?;
  debug!(
    groups = config.groups.len(),
    resources = config.resources.len(),
    resource_types = config.resource_types.len(),
    jobs = config.jobs.len(),
    "parsed new config"
  );

  // 3. Diff and render
  let diff = diff_configs(&existing_config, &config);
  for section in diff.sections.iter().filter(|section| !section.records.is_empty()) {
    sink.render(RenderEvent::Section(section.kind));
    for record in &section.records {
      sink.render(RenderEvent::Record(section.kind, record));
    }
  }
  debug!(changes = diff.len(), "rendered diff");

  // 4. Validation errors on the existing config
  if let Some(invalid) = &existing.validation {
    sink.render(RenderEvent::ValidationErrors(&invalid.messages));
  }

  Ok(Prepared {
    version: existing.version,
    resolved,
    diff,
  })
}
