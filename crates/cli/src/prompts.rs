use std::io::{self, IsTerminal, Write};

use pipeset_lib::apply::Confirm;
use tracing::debug;

use crate::output::print_warning;

/// Asks on the terminal. Without one it declines and says why.
pub struct TerminalConfirm {
  message: String,
}

impl TerminalConfirm {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }

  fn ask(&self) -> io::Result<bool> {
    write!(io::stderr(), "{} [y/N] ", self.message)?;
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
  }
}

impl Confirm for TerminalConfirm {
  fn confirm(&mut self) -> bool {
    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
      print_warning("Cannot prompt for confirmation in non-interactive mode. Use --non-interactive to proceed.");
      return false;
    }

    match self.ask() {
      Ok(answer) => answer,
      Err(e) => {
        debug!(error = %e, "failed to read confirmation");
        false
      }
    }
  }
}
