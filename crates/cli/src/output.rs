//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output: colored status
//! messages, Unicode symbols, and the [`TerminalSink`] that renders diff
//! records.

use std::io::{self, Write};

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

use pipeset_lib::apply::{DiffSink, RenderEvent};
use pipeset_lib::config::CollectionKind;
use pipeset_lib::diff::DiffRecord;
use pipeset_lib::store::ConfigWarning;

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
  pub const REMOVE: &str = "-";
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

fn print_validation_errors(messages: &[String]) {
  eprintln!();
  print_warning("error loading existing config:");
  for message in messages {
    eprintln!("  - {}", message);
  }
  eprintln!();
}

fn print_config_warnings(warnings: &[ConfigWarning]) {
  eprintln!();
  print_warning("the saved config has warnings:");
  for warning in warnings {
    eprintln!("  - {}", warning);
  }
  eprintln!();
}

/// Renders diff records as indented, colored text.
///
/// Sections and records go to `out`; validation errors and warnings go to
/// stderr. The first write error is kept and returned by
/// [`finish`](Self::finish).
pub struct TerminalSink<W: Write> {
  out: W,
  error: Option<io::Error>,
}

impl TerminalSink<io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(io::stdout())
  }
}

impl<W: Write> TerminalSink<W> {
  pub fn new(out: W) -> Self {
    Self { out, error: None }
  }

  pub fn finish(mut self) -> io::Result<W> {
    match self.error.take() {
      Some(e) => Err(e),
      None => {
        self.out.flush()?;
        Ok(self.out)
      }
    }
  }

  fn section(&mut self, kind: CollectionKind) -> io::Result<()> {
    writeln!(self.out, "{}:", kind.title())
  }

  fn record(&mut self, kind: CollectionKind, record: &DiffRecord) -> io::Result<()> {
    match record {
      DiffRecord::Added(entity) => {
        let header = format!("{} {} has been added:", kind, entity.name);
        writeln!(self.out, "  {}", header.if_supports_color(Stream::Stdout, |s| s.green()))?;
        self.yaml_lines(symbols::ADD, &to_yaml(entity)?)
      }
      DiffRecord::Removed(entity) => {
        let header = format!("{} {} has been removed:", kind, entity.name);
        writeln!(self.out, "  {}", header.if_supports_color(Stream::Stdout, |s| s.red()))?;
        self.yaml_lines(symbols::REMOVE, &to_yaml(entity)?)
      }
      DiffRecord::Changed { name, .. } => {
        let header = format!("{} {} has changed:", kind, name);
        writeln!(self.out, "  {}", header.if_supports_color(Stream::Stdout, |s| s.yellow()))?;
        for change in record.field_changes() {
          if let Some(old) = &change.old {
            self.yaml_lines(symbols::REMOVE, &to_yaml(&field(&change.key, old))?)?;
          }
          if let Some(new) = &change.new {
            self.yaml_lines(symbols::ADD, &to_yaml(&field(&change.key, new))?)?;
          }
        }
        Ok(())
      }
    }
  }

  fn yaml_lines(&mut self, symbol: &str, yaml: &str) -> io::Result<()> {
    for line in yaml.lines() {
      let line = format!("{} {}", symbol, line);
      let painted = line.if_supports_color(Stream::Stdout, |s| match symbol {
        symbols::ADD => s.green().to_string(),
        symbols::REMOVE => s.red().to_string(),
        _ => s.to_string(),
      });
      writeln!(self.out, "    {}", painted)?;
    }
    Ok(())
  }
}

impl<W: Write> DiffSink for TerminalSink<W> {
  fn render(&mut self, event: RenderEvent<'_>) {
    if self.error.is_some() {
      return;
    }

    let result = match event {
      RenderEvent::Section(kind) => self.section(kind),
      RenderEvent::Record(kind, record) => self.record(kind, record),
      RenderEvent::ValidationErrors(messages) => {
        print_validation_errors(messages);
        Ok(())
      }
      RenderEvent::Warnings(warnings) => {
        print_config_warnings(warnings);
        Ok(())
      }
    };

    if let Err(e) = result {
      self.error = Some(e);
    }
  }
}

/// Shows only validation errors and warnings; used when the diff itself
/// is printed as JSON.
pub struct NoticeSink;

impl DiffSink for NoticeSink {
  fn render(&mut self, event: RenderEvent<'_>) {
    match event {
      RenderEvent::ValidationErrors(messages) => print_validation_errors(messages),
      RenderEvent::Warnings(warnings) => print_config_warnings(warnings),
      RenderEvent::Section(_) | RenderEvent::Record(..) => {}
    }
  }
}

fn field(key: &str, value: &serde_yaml::Value) -> serde_yaml::Mapping {
  let mut mapping = serde_yaml::Mapping::new();
  mapping.insert(serde_yaml::Value::String(key.to_string()), value.clone());
  mapping
}

fn to_yaml<T: serde::Serialize>(value: &T) -> io::Result<String> {
  serde_yaml::to_string(value).map_err(io::Error::other)
}
