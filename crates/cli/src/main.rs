mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{DescribeCommand, cmd_describe};

/// mbt - Monorepo build tool
#[derive(Parser)]
#[command(name = "mbt")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Show build steps and properties, enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Repository directory
  #[arg(long = "in", global = true, default_value = ".")]
  dir: PathBuf,

  /// Print the manifest as JSON
  #[arg(long, global = true)]
  json: bool,

  /// Fail on the first malformed descriptor instead of skipping it
  #[arg(long, global = true)]
  strict: bool,

  /// Only show applications with this name (repeatable)
  #[arg(long = "name", global = true)]
  names: Vec<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Describe the applications of a repository
  Describe {
    #[command(subcommand)]
    command: DescribeCommand,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Describe { command } => {
      cmd_describe(command, &cli.dir, &cli.names, cli.strict, cli.verbose, cli.json)?;
    }
  }

  Ok(())
}
