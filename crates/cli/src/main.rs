use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

/// rtmake - incremental build orchestrator for the raytracer tree
#[derive(Parser)]
#[command(name = "rtmake")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a target, recompiling only stale units
  Build {
    /// Build target name (case-insensitive)
    #[arg(default_value = "raytracer")]
    target: String,

    /// Compile with threading support
    #[arg(short, long)]
    threaded: bool,

    /// Force a Unix build
    #[arg(long, conflicts_with = "win")]
    unix: bool,

    /// Force a Windows build
    #[arg(long)]
    win: bool,

    /// Location of the persisted hash store (default: <root>/make_hash.json)
    #[arg(long, value_name = "PATH")]
    hash_store: Option<PathBuf>,

    /// Project root containing src/ and bin/
    #[arg(short = 'C', long = "root", default_value = ".", value_name = "DIR")]
    root: PathBuf,

    /// Print the build report as JSON
    #[arg(long)]
    json: bool,
  },

  /// List registered build targets
  Targets,

  /// Show version, platform and hash store information
  Status {
    /// Project root containing src/ and bin/
    #[arg(short = 'C', long = "root", default_value = ".", value_name = "DIR")]
    root: PathBuf,

    /// Location of the persisted hash store (default: <root>/make_hash.json)
    #[arg(long, value_name = "PATH")]
    hash_store: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose {
    "rtmake=debug,rtmake_lib=debug"
  } else {
    "warn"
  };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .without_time()
    .init();

  match cli.command {
    Commands::Build {
      target,
      threaded,
      unix,
      win,
      hash_store,
      root,
      json,
    } => cmd::cmd_build(&target, threaded, unix, win, hash_store, &root, json),
    Commands::Targets => cmd::cmd_targets(),
    Commands::Status { root, hash_store } => cmd::cmd_status(&root, hash_store),
  }
}
