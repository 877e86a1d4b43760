mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

/// Dart Sass builds for asset pipelines
#[derive(Parser)]
#[command(name = "sasspipe")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase verbosity (-v shows the compiler command, -vv debug logs)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Path to the config file (default: ./sasspipe.toml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile the configured Sass files
  Build {
    /// Keep running and recompile on change
    #[arg(short, long)]
    watch: bool,
  },

  /// Compile and recompile on change (same as `build --watch`)
  Watch,

  /// Download the Dart Sass binary
  Install {
    /// Download again even if the version is already installed
    #[arg(long)]
    force: bool,
  },

  /// Show platform, paths and build targets
  Info,
}

fn init_tracing(verbose: u8) {
  let level = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let verbose = cli.verbose > 0;
  let config = cli.config.as_deref();

  let result = match cli.command {
    Commands::Build { watch } => cmd::cmd_build(config, watch, verbose),
    Commands::Watch => cmd::cmd_build(config, true, verbose),
    Commands::Install { force } => cmd::cmd_install(config, force, verbose),
    Commands::Info => cmd::cmd_info(config),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{err:#}"));
      ExitCode::FAILURE
    }
  }
}
