//! Placeholder evaluation for pipeline documents.
//!
//! Two syntaxes are supported:
//!
//! - `((name))` - the current syntax, evaluated in strict mode against a
//!   [`VariableStore`](crate::vars::VariableStore). Every placeholder must
//!   resolve.
//! - `{{name}}` - the deprecated syntax, evaluated against
//!   [`LegacyVariables`](crate::vars::LegacyVariables). Unresolved
//!   placeholders are left in place.
//!
//! [`TemplateStyle::detect`] decides which evaluators apply to a document.
//! Both implement [`Evaluator`] so they compose by feeding one's output into
//! the other.
//!
//! # Example
//!
//! ```
//! use pipeset_lib::template::{CurrentEvaluator, Evaluator};
//! use pipeset_lib::vars::{VariablePair, VariableStore};
//!
//! let store = VariableStore::build(&[], &[VariablePair::parse("branch=main").unwrap()]).unwrap();
//! let out = CurrentEvaluator::new(&store).evaluate("branch: ((branch))").unwrap();
//! assert_eq!(out, "branch: \"main\"");
//! ```

use std::fmt;

use thiserror::Error;

mod current;
mod legacy;
mod scan;

pub use current::CurrentEvaluator;
pub use legacy::LegacyEvaluator;
pub use scan::{Segment, Syntax, contains_placeholder, scan};

/// Substitutes placeholders in a document.
pub trait Evaluator {
  fn evaluate(&self, input: &str) -> Result<String, TemplateError>;
}

/// Which evaluators a document needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStyle {
  /// Only the current evaluator runs.
  Current,
  /// The legacy evaluator runs first and its output feeds the current one.
  LegacyThenCurrent,
}

impl TemplateStyle {
  /// Sniff the raw document for legacy placeholders.
  pub fn detect(input: &str) -> Self {
    if contains_placeholder(input, Syntax::Legacy) {
      TemplateStyle::LegacyThenCurrent
    } else {
      TemplateStyle::Current
    }
  }

  pub fn uses_legacy(self) -> bool {
    matches!(self, TemplateStyle::LegacyThenCurrent)
  }
}

/// Every placeholder that had no value in strict mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariables {
  /// Deduplicated, in order of first appearance.
  pub names: Vec<String>,
}

impl fmt::Display for MissingVariables {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "expected to find variables: {}", self.names.join(", "))
  }
}

impl std::error::Error for MissingVariables {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
  #[error(transparent)]
  Missing(#[from] MissingVariables),

  #[error("cannot render variable '{name}': {message}")]
  Render { name: String, message: String },
}
