//! Capabilities the apply workflow is handed by its caller.

use crate::config::CollectionKind;
use crate::diff::DiffRecord;
use crate::store::ConfigWarning;

/// Asks whether the rendered changes should be applied.
pub trait Confirm {
  fn confirm(&mut self) -> bool;
}

/// A [`Confirm`] that always gives the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
  fn confirm(&mut self) -> bool {
    self.0
  }
}

/// One thing the workflow wants shown to the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderEvent<'a> {
  /// Start of a collection that has at least one record.
  Section(CollectionKind),
  Record(CollectionKind, &'a DiffRecord),
  /// The existing configuration failed the store's validation.
  ValidationErrors(&'a [String]),
  /// Non-fatal remarks returned by the store after saving.
  Warnings(&'a [ConfigWarning]),
}

/// Receives render events in order. Layout (indentation, colors) belongs
/// to the sink.
pub trait DiffSink {
  fn render(&mut self, event: RenderEvent<'_>);
}
