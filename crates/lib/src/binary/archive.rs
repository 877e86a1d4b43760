//! Release archive extraction.
//!
//! Dart Sass archives wrap everything in a single top-level `dart-sass/` folder; that
//! component is stripped so the destination directory becomes the release root.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while unpacking a release archive.
#[derive(Debug, Error)]
pub enum ExtractionError {
  #[error("cannot unpack \"{}\": unsupported archive format", path.display())]
  UnsupportedArchive { path: PathBuf },

  #[error("failed to unpack \"{}\": {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot unzip \"{}\": {source}", path.display())]
  Zip {
    path: PathBuf,
    #[source]
    source: zip::result::ZipError,
  },

  #[error("could not find downloaded binary in \"{}\"", .0.display())]
  MissingBinary(PathBuf),
}

/// Archive formats published for Dart Sass releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
  TarGz,
  Zip,
}

impl ArchiveKind {
  /// Detect the format from a file name's extension.
  pub fn from_name(name: &str) -> Option<Self> {
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
      Some(Self::TarGz)
    } else if name.ends_with(".zip") {
      Some(Self::Zip)
    } else {
      None
    }
  }

  pub fn extension(&self) -> &'static str {
    match self {
      Self::TarGz => "tar.gz",
      Self::Zip => "zip",
    }
  }
}

/// Unpack `archive_path` into `dest`, stripping the top-level folder.
///
/// The format is detected from the archive's file name.
pub fn unpack_archive(archive_path: &Path, dest: &Path) -> Result<(), ExtractionError> {
  let kind = archive_path
    .file_name()
    .and_then(|name| name.to_str())
    .and_then(ArchiveKind::from_name)
    .ok_or_else(|| ExtractionError::UnsupportedArchive {
      path: archive_path.to_path_buf(),
    })?;

  let io_err = |source| ExtractionError::Io {
    path: archive_path.to_path_buf(),
    source,
  };

  fs::create_dir_all(dest).map_err(io_err)?;

  match kind {
    ArchiveKind::TarGz => unpack_tar_gz(archive_path, dest).map_err(io_err)?,
    ArchiveKind::Zip => unpack_zip(archive_path, dest)?,
  }

  debug!(archive = %archive_path.display(), dest = %dest.display(), "unpacked archive");
  Ok(())
}

/// Strip the first path component, rejecting anything that would escape the destination.
fn strip_first_component(path: &Path) -> Option<PathBuf> {
  let stripped: PathBuf = path.components().skip(1).collect();
  let escapes = stripped
    .components()
    .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

  if stripped.as_os_str().is_empty() || escapes {
    None
  } else {
    Some(stripped)
  }
}

/// Decompresses as a stream, so no intermediate `.tar` is written.
fn unpack_tar_gz(archive_path: &Path, dest: &Path) -> io::Result<()> {
  let file = File::open(archive_path)?;
  let decoder = GzDecoder::new(BufReader::new(file));
  let mut archive = Archive::new(decoder);
  archive.set_preserve_permissions(true);

  for entry in archive.entries()? {
    let mut entry = entry?;
    let path = entry.path()?.into_owned();

    let Some(stripped) = strip_first_component(&path) else {
      continue;
    };

    let dest_path = dest.join(&stripped);

    if let Some(parent) = dest_path.parent() {
      fs::create_dir_all(parent)?;
    }

    entry.unpack(&dest_path)?;
  }

  Ok(())
}

fn unpack_zip(archive_path: &Path, dest: &Path) -> Result<(), ExtractionError> {
  let io_err = |source| ExtractionError::Io {
    path: archive_path.to_path_buf(),
    source,
  };
  let zip_err = |source| ExtractionError::Zip {
    path: archive_path.to_path_buf(),
    source,
  };

  let file = File::open(archive_path).map_err(io_err)?;
  let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(zip_err)?;

  for i in 0..archive.len() {
    let mut file = archive.by_index(i).map_err(zip_err)?;

    let Some(path) = file.enclosed_name() else {
      continue;
    };
    let Some(stripped) = strip_first_component(&path) else {
      continue;
    };

    let dest_path = dest.join(&stripped);

    if file.is_dir() {
      fs::create_dir_all(&dest_path).map_err(io_err)?;
      continue;
    }

    if let Some(parent) = dest_path.parent() {
      fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut outfile = File::create(&dest_path).map_err(io_err)?;
    io::copy(&mut file, &mut outfile).map_err(io_err)?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      if let Some(mode) = file.unix_mode() {
        fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode)).map_err(io_err)?;
      }
    }
  }

  Ok(())
}
