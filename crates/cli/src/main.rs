mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{SourceArgs, cmd_diff, cmd_get, cmd_set};
use output::print_error;

/// pipeset - resolve, diff and store pipeline configurations
#[derive(Parser)]
#[command(name = "pipeset")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(long, global = true)]
  verbose: bool,

  /// Directory holding stored pipelines (default: $PIPESET_STORE or the data directory)
  #[arg(long, global = true, value_name = "DIR")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve a pipeline config, show the diff and save it once confirmed
  Set {
    #[command(flatten)]
    source: SourceArgs,

    /// Apply without asking for confirmation
    #[arg(short = 'n', long)]
    non_interactive: bool,
  },

  /// Show what `set` would change without saving
  Diff {
    #[command(flatten)]
    source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Print the stored config of a pipeline
  Get {
    /// Name of the pipeline
    #[arg(short, long)]
    pipeline: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn init_logging(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Set {
      source,
      non_interactive,
    } => cmd_set(source, non_interactive, cli.store),
    Commands::Diff { source, json } => cmd_diff(source, json, cli.store),
    Commands::Get { pipeline, json } => cmd_get(&pipeline, json, cli.store),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
