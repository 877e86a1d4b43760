use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BuildError;
use crate::consts::OUTPUT_SUFFIX;
use crate::resolve::{looks_like_glob, resolve_inputs};

/// One configured Sass source: a path specification with an optional output name.
///
/// Deserializes from either a bare string or a `{ name, path }` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub struct SourceEntry {
  pub name: Option<String>,
  pub path: String,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawEntry {
  Path(String),
  Named { name: String, path: String },
}

impl From<RawEntry> for SourceEntry {
  fn from(raw: RawEntry) -> Self {
    match raw {
      RawEntry::Path(path) => Self { name: None, path },
      RawEntry::Named { name, path } => Self { name: Some(name), path },
    }
  }
}

impl From<SourceEntry> for RawEntry {
  fn from(entry: SourceEntry) -> Self {
    match entry.name {
      Some(name) => RawEntry::Named { name, path: entry.path },
      None => RawEntry::Path(entry.path),
    }
  }
}

impl SourceEntry {
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      name: None,
      path: path.into(),
    }
  }

  pub fn named(name: impl Into<String>, path: impl Into<String>) -> Self {
    Self {
      name: Some(name.into()),
      path: path.into(),
    }
  }

  pub fn is_glob(&self) -> bool {
    looks_like_glob(&self.path)
  }
}

impl fmt::Display for SourceEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "{} ({})", self.path, name),
      None => f.write_str(&self.path),
    }
  }
}

/// A resolved source file and the CSS file the compiler writes for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildTarget {
  pub source: PathBuf,
  pub output: PathBuf,
}

impl BuildTarget {
  /// The `source:destination` token passed to the compiler.
  pub fn argument(&self) -> String {
    format!("{}:{}", self.source.display(), self.output.display())
  }
}

/// Where the compiled CSS for `source` lands.
///
/// The stem is `name` when given, otherwise the source file name without its extension.
pub fn css_output_path(source: &Path, name: Option<&str>, output_dir: &Path) -> PathBuf {
  let stem = match name {
    Some(name) => name.to_string(),
    None => source
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default(),
  };
  output_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Resolve every entry into build targets.
///
/// Relative entries are taken from `base_dir`. Sources must exist now; a named entry must
/// resolve to exactly one file; no two targets may share an output file.
pub fn compute_targets(
  entries: &[SourceEntry],
  base_dir: &Path,
  output_dir: &Path,
) -> Result<Vec<BuildTarget>, BuildError> {
  let mut targets = Vec::new();
  let mut outputs: HashMap<PathBuf, PathBuf> = HashMap::new();

  for entry in entries {
    let sources = resolve_inputs(&entry.path, Some(base_dir))?;

    if let (Some(name), true) = (&entry.name, sources.len() > 1) {
      return Err(BuildError::AmbiguousName {
        name: name.clone(),
        path: entry.path.clone(),
        matches: sources.len(),
      });
    }

    for source in sources {
      if !source.is_file() {
        return Err(BuildError::MissingSource(source));
      }

      let output = css_output_path(&source, entry.name.as_deref(), output_dir);
      if let Some(first) = outputs.insert(output.clone(), source.clone()) {
        return Err(BuildError::DuplicateOutput {
          output,
          first,
          second: source,
        });
      }

      debug!(source = %source.display(), output = %output.display(), "resolved build target");
      targets.push(BuildTarget { source, output });
    }
  }

  if targets.is_empty() {
    return Err(BuildError::NoTargets);
  }

  Ok(targets)
}
