//! Test helpers: in-memory release archives and fake compiler executables.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

/// Build a `.tar.gz` in memory. Every entry is a file with mode `0o755`.
pub fn tar_gz_archive(files: &[(&str, &str)]) -> Vec<u8> {
  let encoder = GzEncoder::new(Vec::new(), Compression::default());
  let mut builder = tar::Builder::new(encoder);

  for (path, contents) in files {
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, path, contents.as_bytes()).unwrap();
  }

  builder.into_inner().unwrap().finish().unwrap()
}

/// Build a `.zip` in memory.
pub fn zip_archive(files: &[(&str, &str)]) -> Vec<u8> {
  let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
  let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);

  for (path, contents) in files {
    writer.start_file(*path, options).unwrap();
    writer.write_all(contents.as_bytes()).unwrap();
  }

  writer.finish().unwrap().into_inner()
}

/// Write an executable `/bin/sh` script named `sass` into `dir`.
#[cfg(unix)]
pub fn fake_sass(dir: &Path, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join("sass");
  std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}
