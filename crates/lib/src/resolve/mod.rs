//! Sass input resolution.
//!
//! Expands a configured path specification into the concrete source files to compile:
//! - an existing file resolves to itself
//! - an existing directory resolves to every file beneath it
//! - a glob (optionally with `**`) resolves to every matching file beneath its base directory
//!
//! Partials (basename starting with `_`), dotfiles and version-control metadata are never
//! returned. Results are sorted so repeated runs over the same tree agree.

pub mod glob;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

pub use glob::{GlobMatcher, compile_glob, looks_like_glob, split_glob_base};

use crate::consts::PARTIAL_PREFIX;

/// Directory names skipped while walking, on top of every dot-directory.
const VCS_DIRS: &[&str] = &[".git", ".svn", ".hg", ".bzr", "_darcs", "CVS", "_svn", ".arch-params", ".monotone"];

/// Errors that can occur while resolving Sass inputs.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The literal directory in front of a glob does not exist.
  #[error("could not find Sass directory: \"{}\" (from \"{pattern}\")", base.display())]
  GlobBaseNotFound { base: PathBuf, pattern: String },

  /// The glob could not be turned into a matcher.
  #[error("invalid glob pattern \"{pattern}\": {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source: Box<regex::Error>,
  },

  /// Walking the directory tree failed.
  #[error("failed to walk \"{}\": {source}", root.display())]
  Walk {
    root: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

/// Returns true if the file is a Sass partial.
pub fn is_partial(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| name.starts_with(PARTIAL_PREFIX))
}

/// Expand a path specification into absolute source file paths.
///
/// Relative specifications are made absolute against `base_dir` when one is given.
/// A non-glob specification that does not exist is returned as-is so the consumer can
/// report the missing file.
pub fn resolve_inputs(spec: &str, base_dir: Option<&Path>) -> Result<Vec<PathBuf>, ResolveError> {
  let path = match base_dir {
    Some(base) if !Path::new(spec).is_absolute() => base.join(spec),
    _ => PathBuf::from(spec),
  };

  if path.is_dir() {
    let files = walk_files(&path, |_| true)?;
    debug!(dir = %path.display(), count = files.len(), "resolved Sass directory");
    return Ok(files);
  }

  if path.is_file() {
    if is_partial(&path) {
      debug!(path = %path.display(), "skipping Sass partial");
      return Ok(Vec::new());
    }
    return Ok(vec![path]);
  }

  // Only the configured text can make a glob; metacharacters in `base_dir` are literal
  if !looks_like_glob(spec) {
    return Ok(vec![path]);
  }

  let (glob_base, relative_glob) = split_glob_base(spec);
  let base = match base_dir {
    Some(dir) if glob_base == "." => dir.to_path_buf(),
    Some(dir) if !Path::new(&glob_base).is_absolute() => dir.join(&glob_base),
    _ => PathBuf::from(glob_base),
  };
  if !base.is_dir() {
    return Err(ResolveError::GlobBaseNotFound {
      base,
      pattern: spec.to_string(),
    });
  }

  let matcher = compile_glob(&relative_glob)?;
  let files = walk_files(&base, |relative| matcher.is_match(relative))?;
  debug!(
    base = %base.display(),
    glob = matcher.pattern(),
    count = files.len(),
    "resolved Sass glob"
  );
  Ok(files)
}

/// Walk `root` and return the files whose `/`-separated relative path passes `keep`.
fn walk_files(root: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, ResolveError> {
  let mut found: Vec<(String, PathBuf)> = Vec::new();

  let walker = WalkDir::new(root)
    .follow_links(true)
    .into_iter()
    .filter_entry(|entry| entry.depth() == 0 || !is_ignored(entry));

  for entry in walker {
    let entry = entry.map_err(|source| ResolveError::Walk {
      root: root.to_path_buf(),
      source,
    })?;

    if !entry.file_type().is_file() || is_partial(entry.path()) {
      continue;
    }

    let Ok(relative) = entry.path().strip_prefix(root) else {
      continue;
    };
    let relative = relative
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    if keep(&relative) {
      found.push((relative, entry.into_path()));
    }
  }

  found.sort_by(|a, b| a.0.cmp(&b.0));

  Ok(
    found
      .into_iter()
      .map(|(_, path)| dunce::canonicalize(&path).unwrap_or(path))
      .collect(),
  )
}

/// Dotfiles, dot-directories and VCS metadata directories.
fn is_ignored(entry: &DirEntry) -> bool {
  let name = entry.file_name().to_string_lossy();
  name.starts_with('.') || (entry.file_type().is_dir() && VCS_DIRS.contains(&name.as_ref()))
}
