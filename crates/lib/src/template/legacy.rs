//! Evaluation of deprecated `{{name}}` placeholders.

use super::{Evaluator, Segment, Syntax, TemplateError, scan};
use crate::vars::LegacyVariables;

/// Evaluates the legacy syntax against [`LegacyVariables`].
///
/// Each resolved placeholder is replaced by the JSON encoding of its value,
/// so strings are inserted quoted. Placeholders without a value are left
/// exactly as written.
pub struct LegacyEvaluator<'a> {
  vars: &'a LegacyVariables,
}

impl<'a> LegacyEvaluator<'a> {
  pub fn new(vars: &'a LegacyVariables) -> Self {
    Self { vars }
  }
}

impl Evaluator for LegacyEvaluator<'_> {
  fn evaluate(&self, input: &str) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(input.len());

    for segment in scan(input, Syntax::Legacy) {
      match segment {
        Segment::Literal(text) => result.push_str(text),
        Segment::Placeholder { name, source } => match self.vars.get(name) {
          Some(value) => {
            let encoded = serde_json::to_string(value).map_err(|e| TemplateError::Render {
              name: name.to_string(),
              message: e.to_string(),
            })?;
            result.push_str(&encoded);
          }
          None => result.push_str(source),
        },
      }
    }

    Ok(result)
  }
}
