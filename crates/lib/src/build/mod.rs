//! Sass build orchestration.
//!
//! Turns configured sources into `source:destination` pairs, provisions the compiler and
//! starts it as a child process. Compiler failures are reported through
//! [`BuildOutcome`], not as errors.

mod process;
mod targets;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

pub use process::{BuildOutcome, BuildProcess, OutputStream};
pub use targets::{BuildTarget, SourceEntry, compute_targets, css_output_path};

use crate::binary::{ProvisionError, SassBinary};
use crate::options::{BuildOptions, RuntimeFlags, build_arguments};
use crate::reporter::SharedReporter;
use crate::resolve::ResolveError;

/// Errors that can occur before or while running the compiler.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("could not find Sass file: \"{}\"", .0.display())]
  MissingSource(PathBuf),

  #[error("Sass entry \"{name}\" ({path}) matches {matches} files; a named entry must be a single file")]
  AmbiguousName { name: String, path: String, matches: usize },

  #[error(
    "\"{}\" and \"{}\" would both compile to \"{}\"",
    first.display(),
    second.display(),
    output.display()
  )]
  DuplicateOutput {
    output: PathBuf,
    first: PathBuf,
    second: PathBuf,
  },

  #[error("no Sass files to build")]
  NoTargets,

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Provision(#[from] ProvisionError),

  #[error("failed to create \"{}\": {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to start \"{}\": {source}", program.display())]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to wait for Sass process: {0}")]
  Process(#[source] std::io::Error),

  #[error("output reader failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

/// Compiler arguments: one `source:destination` pair per target, then the option flags.
pub fn command_arguments(targets: &[BuildTarget], options: &BuildOptions, flags: RuntimeFlags) -> Vec<String> {
  targets
    .iter()
    .map(BuildTarget::argument)
    .chain(build_arguments(options, flags))
    .collect()
}

/// Runs Dart Sass over a set of configured sources.
pub struct SassBuilder {
  entries: Vec<SourceEntry>,
  base_dir: PathBuf,
  output_dir: PathBuf,
  options: BuildOptions,
  binary: SassBinary,
  reporter: Option<SharedReporter>,
}

impl SassBuilder {
  /// Relative entries are resolved against `base_dir`.
  pub fn new(entries: Vec<SourceEntry>, base_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, binary: SassBinary) -> Self {
    Self {
      entries,
      base_dir: base_dir.into(),
      output_dir: output_dir.into(),
      options: BuildOptions::default(),
      binary,
      reporter: None,
    }
  }

  pub fn with_options(mut self, options: BuildOptions) -> Self {
    self.options = options;
    self
  }

  pub fn with_reporter(mut self, reporter: Option<SharedReporter>) -> Self {
    self.reporter = reporter;
    self
  }

  pub fn entries(&self) -> &[SourceEntry] {
    &self.entries
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  pub fn options(&self) -> &BuildOptions {
    &self.options
  }

  pub fn binary(&self) -> &SassBinary {
    &self.binary
  }

  /// Resolve the configured entries against the filesystem as it is now.
  pub fn targets(&self) -> Result<Vec<BuildTarget>, BuildError> {
    compute_targets(&self.entries, &self.base_dir, &self.output_dir)
  }

  /// Start the compiler. In watch mode stdin stays open until the process is closed or
  /// terminated.
  pub async fn run_build(&self, watch: bool) -> Result<BuildProcess, BuildError> {
    let targets = self.targets()?;
    let binary = self.binary.ensure_binary().await?;
    let args = command_arguments(&targets, &self.options, RuntimeFlags { watch });

    std::fs::create_dir_all(&self.output_dir).map_err(|source| BuildError::Io {
      path: self.output_dir.clone(),
      source,
    })?;

    let command_line = process::render_command_line(&binary, &args);
    if let Some(reporter) = &self.reporter {
      reporter.note("Executing Sass (pass -v to see more details).");
      if reporter.is_verbose() {
        reporter.write(&format!("  Command:\n    {command_line}\n"));
      }
    }
    debug!(command = %command_line, "Sass command line");

    let process = BuildProcess::spawn(&binary, &args, watch)?;
    info!(targets = targets.len(), watch, "started Sass build");
    Ok(process)
  }
}
