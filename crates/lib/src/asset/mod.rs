//! Asset pipeline bridge.
//!
//! Lets an asset pipeline treat configured `.scss` sources as CSS: the pipeline asks
//! [`SassCssCompiler`] whether it handles an asset and, if so, receives the CSS that the
//! last `sasspipe build` wrote for it.

pub mod public_path;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use public_path::{CssExtensionResolver, PrefixResolver, PublicPathResolver, with_css_extension};

use crate::build::BuildTarget;
use crate::consts::{BUILD_COMMAND, SASS_EXTENSION};

#[derive(Debug, Error)]
pub enum AssetError {
  /// The build has not produced CSS for this source yet.
  #[error("the file \"{}\" doesn't exist, run `{command}`", path.display())]
  MissingCompiledOutput { path: PathBuf, command: &'static str },

  #[error("\"{}\" is not a configured Sass source", .0.display())]
  NotASource(PathBuf),

  #[error("failed to read \"{}\": {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// An asset as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedAsset {
  pub logical_path: String,
  pub source_path: PathBuf,
  /// Files whose changes invalidate this asset's cached output.
  pub file_dependencies: Vec<PathBuf>,
}

impl MappedAsset {
  pub fn new(logical_path: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
    Self {
      logical_path: logical_path.into(),
      source_path: source_path.into(),
      file_dependencies: Vec::new(),
    }
  }

  pub fn add_file_dependency(&mut self, path: impl Into<PathBuf>) {
    let path = path.into();
    if !self.file_dependencies.contains(&path) {
      self.file_dependencies.push(path);
    }
  }
}

/// Serves compiled CSS in place of configured Sass sources.
#[derive(Debug, Clone, Default)]
pub struct SassCssCompiler {
  outputs: HashMap<PathBuf, PathBuf>,
}

impl SassCssCompiler {
  pub fn new(targets: impl IntoIterator<Item = BuildTarget>) -> Self {
    let outputs = targets
      .into_iter()
      .map(|target| (canonical(&target.source), target.output))
      .collect();
    Self { outputs }
  }

  /// Whether `asset` is one of the configured Sass sources.
  pub fn supports(&self, asset: &MappedAsset) -> bool {
    let is_sass = asset
      .source_path
      .extension()
      .is_some_and(|ext| ext == SASS_EXTENSION);

    is_sass && self.output_for(&asset.source_path).is_some()
  }

  /// Read the compiled CSS for `asset`.
  ///
  /// The output file is registered as a dependency first, so a pipeline cache picks up the
  /// next build even when this call fails.
  pub fn compile(&self, asset: &mut MappedAsset) -> Result<Vec<u8>, AssetError> {
    let output = self
      .output_for(&asset.source_path)
      .ok_or_else(|| AssetError::NotASource(asset.source_path.clone()))?
      .to_path_buf();

    asset.add_file_dependency(output.clone());

    if !output.is_file() {
      return Err(AssetError::MissingCompiledOutput {
        path: output,
        command: BUILD_COMMAND,
      });
    }

    let css = std::fs::read(&output).map_err(|source| AssetError::Read {
      path: output.clone(),
      source,
    })?;
    debug!(asset = %asset.logical_path, css = %output.display(), "served compiled Sass");
    Ok(css)
  }

  fn output_for(&self, source: &Path) -> Option<&Path> {
    self.outputs.get(&canonical(source)).map(PathBuf::as_path)
  }
}

fn canonical(path: &Path) -> PathBuf {
  dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  use crate::build::css_output_path;
  use tempfile::TempDir;

  struct Fixture {
    temp: TempDir,
    compiler: SassCssCompiler,
  }

  fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("assets/app.scss");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(&source, "body { color: red; }").unwrap();

    let output = css_output_path(&source, None, &temp.path().join("var/sass"));
    let compiler = SassCssCompiler::new([BuildTarget { source, output }]);
    Fixture { temp, compiler }
  }

  #[test]
  fn supports_only_configured_scss_sources() {
    let f = fixture();
    let root = f.temp.path();

    assert!(f.compiler.supports(&MappedAsset::new("app.scss", root.join("assets/app.scss"))));
    // Non-canonical spelling of the same file
    assert!(
      f.compiler
        .supports(&MappedAsset::new("app.scss", root.join("assets/../assets/app.scss")))
    );

    fs::write(root.join("assets/other.scss"), "").unwrap();
    assert!(!f.compiler.supports(&MappedAsset::new("other.scss", root.join("assets/other.scss"))));
    assert!(!f.compiler.supports(&MappedAsset::new("app.css", root.join("assets/app.css"))));
  }

  #[test]
  fn compile_reads_output_and_tracks_dependency() {
    let f = fixture();
    let root = f.temp.path();
    let output = root.join("var/sass/app.output.css");
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    fs::write(&output, "body{color:red}").unwrap();

    let mut asset = MappedAsset::new("styles/app.scss", root.join("assets/app.scss"));
    let css = f.compiler.compile(&mut asset).unwrap();

    assert_eq!(css, b"body{color:red}");
    assert_eq!(asset.file_dependencies, vec![output]);
  }

  #[test]
  fn missing_output_names_file_and_command() {
    let f = fixture();
    let root = f.temp.path();
    let mut asset = MappedAsset::new("styles/app.scss", root.join("assets/app.scss"));

    let err = f.compiler.compile(&mut asset).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("app.output.css"), "{message}");
    assert!(message.contains("sasspipe build"), "{message}");
    // still registered so the next build invalidates the cache
    assert_eq!(asset.file_dependencies.len(), 1);
  }

  #[test]
  fn unknown_source_is_rejected() {
    let f = fixture();
    let mut asset = MappedAsset::new("x.scss", f.temp.path().join("x.scss"));
    assert!(matches!(f.compiler.compile(&mut asset), Err(AssetError::NotASource(_))));
  }
}
