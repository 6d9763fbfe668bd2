//! Placeholder scanning shared by both template syntaxes.
//!
//! The scanner splits a document into literal text and placeholders without
//! copying: every segment borrows from the input, so concatenating the
//! `source` of all segments reproduces the input exactly.
//!
//! A delimiter pair that does not enclose a well-formed name is literal
//! text. `((` inside a shell snippet or `{{` in a Go template therefore
//! pass through untouched.
//!
//! For the current syntax YAML comments are literal too: a `#` at the start
//! of a line or after whitespace, outside quotes and block scalars, runs to
//! the end of the line.

use std::ops::Range;

/// The two placeholder syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
  /// `((name))`, with optional spaces inside the parens.
  Current,
  /// `{{name}}`, deprecated.
  Legacy,
}

impl Syntax {
  fn open(self) -> &'static [u8; 2] {
    match self {
      Syntax::Current => b"((",
      Syntax::Legacy => b"{{",
    }
  }

  fn close(self) -> &'static str {
    match self {
      Syntax::Current => "))",
      Syntax::Legacy => "}}",
    }
  }

  /// Extract the variable name from the text between the delimiters.
  fn name(self, content: &str) -> Option<&str> {
    let name = match self {
      Syntax::Current => content.trim_matches(' '),
      Syntax::Legacy => content,
    };

    let valid = !name.is_empty()
      && name.chars().all(|c| match self {
        Syntax::Current => c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'),
        Syntax::Legacy => c.is_alphanumeric() || matches!(c, '_' | '-'),
      });

    valid.then_some(name)
  }
}

/// A segment of scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
  Literal(&'a str),
  Placeholder {
    /// Variable name, without delimiters or padding.
    name: &'a str,
    /// The placeholder exactly as written, delimiters included.
    source: &'a str,
  },
}

impl<'a> Segment<'a> {
  pub fn source(&self) -> &'a str {
    match self {
      Segment::Literal(text) => *text,
      Segment::Placeholder { source, .. } => *source,
    }
  }
}

/// Split `input` into literal and placeholder segments for one syntax.
pub fn scan(input: &str, syntax: Syntax) -> Vec<Segment<'_>> {
  let bytes = input.as_bytes();
  let open = syntax.open();
  let close = syntax.close();

  let comments = match syntax {
    Syntax::Current => comment_spans(input),
    Syntax::Legacy => Vec::new(),
  };
  let mut comments = comments.into_iter().peekable();

  let mut segments = Vec::new();
  let mut literal_start = 0;
  let mut pos = 0;

  // Delimiters are ASCII, so every position compared or sliced at below is
  // a char boundary.
  while pos + 1 < bytes.len() {
    while comments.next_if(|comment| comment.end <= pos).is_some() {}
    if let Some(comment) = comments.peek()
      && comment.start <= pos
    {
      pos = comment.end;
      continue;
    }

    if bytes[pos] != open[0] || bytes[pos + 1] != open[1] {
      pos += 1;
      continue;
    }

    let content_start = pos + 2;
    let placeholder = input[content_start..].find(close).and_then(|len| {
      let end = content_start + len + close.len();
      syntax
        .name(&input[content_start..content_start + len])
        .map(|name| (name, end))
    });

    match placeholder {
      Some((name, end)) => {
        if literal_start < pos {
          segments.push(Segment::Literal(&input[literal_start..pos]));
        }
        segments.push(Segment::Placeholder {
          name,
          source: &input[pos..end],
        });
        literal_start = end;
        pos = end;
      }
      None => pos += 1,
    }
  }

  if literal_start < input.len() {
    segments.push(Segment::Literal(&input[literal_start..]));
  }

  segments
}

/// Byte ranges of YAML comments in `input`, in order.
///
/// Quote state carries across lines so multi-line quoted scalars are
/// honoured. Lines belonging to a `|` or `>` block scalar are content.
fn comment_spans(input: &str) -> Vec<Range<usize>> {
  let mut spans = Vec::new();
  let mut quote: Option<u8> = None;
  let mut block_parent: Option<usize> = None;
  let mut offset = 0;

  for line in input.split_inclusive('\n') {
    let start = offset;
    offset += line.len();

    let body = line.trim_end_matches(['\n', '\r']);
    let indent = body.len() - body.trim_start_matches(' ').len();

    if let Some(parent) = block_parent {
      if body.trim().is_empty() || indent > parent {
        continue;
      }
      block_parent = None;
    }

    let bytes = body.as_bytes();
    let mut comment_at = None;
    let mut i = 0;
    while i < bytes.len() {
      let b = bytes[i];
      match quote {
        Some(b'"') => match b {
          b'\\' => i += 1,
          b'"' => quote = None,
          _ => {}
        },
        Some(_) => {
          if b == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
              i += 1;
            } else {
              quote = None;
            }
          }
        }
        None => {
          let prev = i.checked_sub(1).map(|p| bytes[p]);
          match b {
            b'#' if matches!(prev, None | Some(b' ' | b'\t')) => {
              comment_at = Some(i);
              break;
            }
            b'"' | b'\'' if matches!(prev, None | Some(b' ' | b'\t' | b'[' | b'{' | b',')) => quote = Some(b),
            _ => {}
          }
        }
      }
      i += 1;
    }

    let content = &body[..comment_at.unwrap_or(body.len())];
    if quote.is_none() {
      block_parent = block_scalar_parent(content);
    }
    if let Some(at) = comment_at {
      spans.push(start + at..start + body.len());
    }
  }

  spans
}

/// If `line` ends with a block scalar indicator (`key: |`, `- >-`), the
/// column its content must be indented past.
fn block_scalar_parent(line: &str) -> Option<usize> {
  let trimmed = line.trim_end();
  let indicator = trimmed.rsplit([' ', '\t']).next()?;
  let mut chars = indicator.chars();
  if !matches!(chars.next(), Some('|' | '>')) || !chars.all(|c| matches!(c, '-' | '+' | '0'..='9')) {
    return None;
  }

  let before = trimmed[..trimmed.len() - indicator.len()].trim_end();
  let indent = line.len() - line.trim_start_matches(' ').len();
  let mut rest = &line[indent..];
  let mut last_dash = None;
  while let Some(after) = rest.strip_prefix("- ").or_else(|| rest.strip_prefix("-\t")) {
    last_dash = Some(line.len() - rest.len());
    rest = after.trim_start_matches([' ', '\t']);
  }

  if before.ends_with(':') {
    Some(line.len() - rest.len())
  } else if !before.is_empty() && before.split_whitespace().all(|t| t == "-") {
    last_dash
  } else if before.is_empty() {
    Some(indent)
  } else {
    None
  }
}

/// Returns true if `input` contains at least one placeholder of `syntax`.
pub fn contains_placeholder(input: &str, syntax: Syntax) -> bool {
  scan(input, syntax)
    .iter()
    .any(|segment| matches!(segment, Segment::Placeholder { .. }))
}
