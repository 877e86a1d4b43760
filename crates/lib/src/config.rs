//! Project configuration (`sasspipe.toml`).
//!
//! ```toml
//! root_sass = ["assets/styles/app.scss", { name = "admin", path = "assets/admin/main.scss" }]
//! output_dir = "var/sass"
//! install_dir = "var"
//! binary_version = "1.77.8"
//!
//! [sass_options]
//! style = "compressed"
//! source_map = false
//! ```
//!
//! Relative paths are taken from the directory containing the config file.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::asset::SassCssCompiler;
use crate::binary::{ReleaseEndpoints, SassBinary};
use crate::build::{BuildError, BuildTarget, SassBuilder, SourceEntry, compute_targets};
use crate::consts::{CONFIG_FILENAME, DEFAULT_LATEST_RELEASE_URL, DEFAULT_RELEASES_URL};
use crate::options::BuildOptions;
use crate::reporter::SharedReporter;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("failed to read config file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config file: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("invalid configuration: {0}")]
  Invalid(String),
}

/// Settings for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SassConfig {
  /// Sass sources to compile: files, directories or globs.
  #[serde(default = "default_root_sass", alias = "rootSass")]
  pub root_sass: Vec<SourceEntry>,

  #[serde(default = "default_output_dir", alias = "outputDir")]
  pub output_dir: PathBuf,

  /// Where downloaded compilers are kept.
  #[serde(default = "default_install_dir", alias = "installDir")]
  pub install_dir: PathBuf,

  /// Use this compiler instead of downloading one.
  #[serde(default, alias = "binaryPath", skip_serializing_if = "Option::is_none")]
  pub binary_path: Option<PathBuf>,

  /// Pin the downloaded compiler version. Latest when unset.
  #[serde(default, alias = "binaryVersion", skip_serializing_if = "Option::is_none")]
  pub binary_version: Option<String>,

  #[serde(default, alias = "sassOptions")]
  pub sass_options: BuildOptions,

  #[serde(default = "default_releases_url", alias = "releasesUrl")]
  pub releases_url: String,

  #[serde(default = "default_latest_release_url", alias = "latestReleaseUrl")]
  pub latest_release_url: String,

  /// Directory relative paths are resolved from.
  #[serde(skip)]
  pub project_dir: PathBuf,
}

fn default_root_sass() -> Vec<SourceEntry> {
  vec![SourceEntry::new("assets/styles/app.scss")]
}

fn default_output_dir() -> PathBuf {
  PathBuf::from("var/sass")
}

fn default_install_dir() -> PathBuf {
  PathBuf::from("var")
}

fn default_releases_url() -> String {
  DEFAULT_RELEASES_URL.to_string()
}

fn default_latest_release_url() -> String {
  DEFAULT_LATEST_RELEASE_URL.to_string()
}

/// Locate the config file.
///
/// An explicit path must exist. Otherwise `sasspipe.toml` in `cwd` is used if present, and
/// `None` means "run with defaults".
pub fn find_config_path(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>, ConfigError> {
  if let Some(path) = explicit {
    let path = if path.is_absolute() {
      path.to_path_buf()
    } else {
      cwd.join(path)
    };
    if !path.is_file() {
      return Err(ConfigError::NotFound(path));
    }
    return Ok(Some(path));
  }

  let candidate = cwd.join(CONFIG_FILENAME);
  Ok(candidate.is_file().then_some(candidate))
}

impl SassConfig {
  /// Default settings for a project rooted at `project_dir`.
  pub fn defaults(project_dir: impl Into<PathBuf>) -> Self {
    Self {
      root_sass: default_root_sass(),
      output_dir: default_output_dir(),
      install_dir: default_install_dir(),
      binary_path: None,
      binary_version: None,
      sass_options: BuildOptions::default(),
      releases_url: default_releases_url(),
      latest_release_url: default_latest_release_url(),
      project_dir: project_dir.into(),
    }
  }

  /// Load and validate a config file. Its parent directory becomes the project directory.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigError::NotFound(path.to_path_buf())),
      Err(source) => {
        return Err(ConfigError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let project_dir = dunce::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());

    let config = Self::from_toml_str(&content, project_dir)?;
    debug!(path = %path.display(), entries = config.root_sass.len(), "loaded config");
    Ok(config)
  }

  /// Parse and validate TOML text.
  pub fn from_toml_str(content: &str, project_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
    let mut config: SassConfig = toml::from_str(content)?;
    config.project_dir = project_dir.into();
    config.validate()?;
    Ok(config)
  }

  /// Check the invariants serde cannot express.
  ///
  /// With several entries, every non-glob entry must have a distinct file stem, named or not.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.root_sass.is_empty() {
      return Err(ConfigError::Invalid("`root_sass` must list at least one Sass file".into()));
    }

    let mut names = HashSet::new();
    for name in self.root_sass.iter().filter_map(|entry| entry.name.as_deref()) {
      if name.trim().is_empty() {
        return Err(ConfigError::Invalid("Sass entry names must not be empty".into()));
      }
      if !names.insert(name) {
        return Err(ConfigError::Invalid(format!("duplicate Sass entry name \"{name}\"")));
      }
    }

    if self.root_sass.len() > 1 {
      let mut stems = HashSet::new();
      for entry in self.root_sass.iter().filter(|entry| !entry.is_glob()) {
        let stem = Path::new(&entry.path)
          .file_stem()
          .map(|stem| stem.to_string_lossy().into_owned())
          .unwrap_or_default();
        if !stems.insert(stem.clone()) {
          return Err(ConfigError::Invalid(format!(
            "the \"root_sass\" option must contain unique file names: \"{stem}\" is used more than once"
          )));
        }
      }
    }

    Ok(())
  }

  /// Resolve `path` against the project directory.
  pub fn project_path(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.project_dir.join(path)
    }
  }

  pub fn output_path(&self) -> PathBuf {
    self.project_path(&self.output_dir)
  }

  pub fn install_path(&self) -> PathBuf {
    self.project_path(&self.install_dir)
  }

  pub fn endpoints(&self) -> ReleaseEndpoints {
    ReleaseEndpoints {
      releases_url: self.releases_url.clone(),
      latest_release_url: self.latest_release_url.clone(),
    }
  }

  /// The compiler provisioner these settings describe.
  pub fn binary(&self, reporter: Option<SharedReporter>) -> SassBinary {
    SassBinary::new(self.install_path())
      .with_binary_path(self.binary_path.as_deref().map(|path| self.project_path(path)))
      .with_version(self.binary_version.clone())
      .with_endpoints(self.endpoints())
      .with_reporter(reporter)
  }

  /// A builder for every configured source.
  pub fn builder(&self, reporter: Option<SharedReporter>) -> SassBuilder {
    SassBuilder::new(
      self.root_sass.clone(),
      self.project_dir.clone(),
      self.output_path(),
      self.binary(reporter.clone()),
    )
    .with_options(self.sass_options.clone())
    .with_reporter(reporter)
  }

  /// Build targets as the filesystem stands now.
  pub fn resolved_targets(&self) -> Result<Vec<BuildTarget>, BuildError> {
    compute_targets(&self.root_sass, &self.project_dir, &self.output_path())
  }

  /// The pipeline compiler for the configured sources.
  pub fn asset_compiler(&self) -> Result<SassCssCompiler, BuildError> {
    Ok(SassCssCompiler::new(self.resolved_targets()?))
  }
}
