//! Strict evaluation of `((name))` placeholders.

use serde_yaml::Value;

use super::{Evaluator, MissingVariables, Segment, Syntax, TemplateError, scan};
use crate::vars::VariableStore;

/// Evaluates the current syntax against a [`VariableStore`].
///
/// A placeholder that is the whole value of a mapping entry or sequence item
/// (`key: ((name))`, `- ((name))`) is replaced by a YAML node:
/// - strings are inserted double-quoted, so their type and content survive
/// - numbers and booleans use their canonical text, null renders as `null`
/// - sequences and mappings render as JSON flow text, which is valid YAML
///
/// Inside a larger string (`image: ((registry))/app`) scalars are pasted as
/// plain text instead.
///
/// Evaluation fails if any placeholder has no value, naming all of them.
pub struct CurrentEvaluator<'a> {
  vars: &'a VariableStore,
}

impl<'a> CurrentEvaluator<'a> {
  pub fn new(vars: &'a VariableStore) -> Self {
    Self { vars }
  }
}

impl Evaluator for CurrentEvaluator<'_> {
  fn evaluate(&self, input: &str) -> Result<String, TemplateError> {
    let segments = scan(input, Syntax::Current);
    let mut result = String::with_capacity(input.len());
    let mut missing: Vec<String> = Vec::new();
    let mut offset = 0;

    for segment in &segments {
      let start = offset;
      offset += segment.source().len();

      match segment {
        Segment::Literal(text) => result.push_str(text),
        Segment::Placeholder { name, .. } => match self.vars.lookup(name) {
          Some(value) => {
            let node = is_whole_value(input, start, offset);
            result.push_str(&render(name, value, node)?);
          }
          None => {
            if !missing.iter().any(|m| m == name) {
              missing.push(name.to_string());
            }
          }
        },
      }
    }

    if !missing.is_empty() {
      return Err(MissingVariables { names: missing }.into());
    }

    Ok(result)
  }
}

/// True if the placeholder at `start..end` follows `key: ` or `- ` and
/// nothing but whitespace or a comment follows it on its line.
fn is_whole_value(input: &str, start: usize, end: usize) -> bool {
  let line_start = input[..start].rfind('\n').map_or(0, |i| i + 1);
  let line_end = input[end..].find('\n').map_or(input.len(), |i| end + i);
  let (prefix, suffix) = (&input[line_start..start], &input[end..line_end]);

  let rest = suffix.trim_start_matches([' ', '\t', '\r']);
  let ends_line = rest.is_empty() || (rest.starts_with('#') && rest.len() < suffix.len());
  if !ends_line || !prefix.ends_with([' ', '\t']) {
    return false;
  }

  let head = prefix.trim();
  head.ends_with(':') || (!head.is_empty() && head.split_whitespace().all(|t| t == "-"))
}

fn render(name: &str, value: &Value, node: bool) -> Result<String, TemplateError> {
  match value {
    Value::Null => Ok("null".to_string()),
    Value::Bool(b) => Ok(b.to_string()),
    Value::Number(n) => Ok(n.to_string()),
    Value::String(s) if node => to_json(name, s),
    Value::String(s) => Ok(s.clone()),
    Value::Tagged(tagged) => render(name, &tagged.value, node),
    Value::Sequence(_) | Value::Mapping(_) => to_json(name, value),
  }
}

fn to_json<T: serde::Serialize + ?Sized>(name: &str, value: &T) -> Result<String, TemplateError> {
  serde_json::to_string(value).map_err(|e| TemplateError::Render {
    name: name.to_string(),
    message: e.to_string(),
  })
}
