//! Dart Sass binary provisioning.
//!
//! Resolves the executable used for builds: either an explicitly configured path, or a
//! release downloaded once into a versioned directory:
//!
//! ```text
//! <install_dir>/dart-sass/<version>/sass       (sass.bat on Windows)
//! ```
//!
//! An existing install is never downloaded again, so repeated or concurrent provisioning
//! converges on the same files.

pub mod archive;
pub mod download;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

pub use archive::{ArchiveKind, ExtractionError};
pub use download::DownloadError;

use crate::consts::{DEFAULT_LATEST_RELEASE_URL, DEFAULT_RELEASES_URL};
use crate::platform::{SassPlatform, UnsupportedPlatform};
use crate::reporter::SharedReporter;

/// Errors that can occur while provisioning the Sass binary.
#[derive(Debug, Error)]
pub enum ProvisionError {
  #[error(transparent)]
  UnsupportedPlatform(#[from] UnsupportedPlatform),

  #[error("cannot determine latest Dart Sass CLI binary version; specify a version in the configuration: {reason}")]
  VersionResolution { reason: String },

  #[error(transparent)]
  Download(#[from] DownloadError),

  #[error(transparent)]
  Extraction(#[from] ExtractionError),

  /// The configured binary path does not point at a file.
  #[error("Sass binary not found at \"{}\"", .0.display())]
  BinaryNotFound(PathBuf),

  #[error("failed to prepare \"{}\": {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("extraction task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

/// Where releases and release metadata are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEndpoints {
  /// Base URL; archives live at `<releases_url>/<version>/<archive>`.
  pub releases_url: String,
  /// JSON document whose `tag_name` is the latest version.
  pub latest_release_url: String,
}

impl Default for ReleaseEndpoints {
  fn default() -> Self {
    Self {
      releases_url: DEFAULT_RELEASES_URL.to_string(),
      latest_release_url: DEFAULT_LATEST_RELEASE_URL.to_string(),
    }
  }
}

/// Everything needed to fetch and locate one Dart Sass release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryDescriptor {
  pub platform: SassPlatform,
  pub version: String,
  pub archive_name: String,
  pub archive_kind: ArchiveKind,
  pub download_url: String,
  /// Versioned release root.
  pub install_dir: PathBuf,
  /// Launcher inside the release root.
  pub install_path: PathBuf,
}

impl BinaryDescriptor {
  pub fn new(install_dir: &Path, releases_url: &str, version: &str, platform: SassPlatform) -> Self {
    let archive_kind = if platform.is_windows() {
      ArchiveKind::Zip
    } else {
      ArchiveKind::TarGz
    };
    let archive_name = format!(
      "dart-sass-{}-{}.{}",
      version,
      platform.identifier(),
      archive_kind.extension()
    );
    let download_url = format!("{}/{}/{}", releases_url.trim_end_matches('/'), version, archive_name);
    let version_dir = versions_dir(install_dir).join(version);
    let install_path = version_dir.join(platform.executable_name());

    Self {
      platform,
      version: version.to_string(),
      archive_name,
      archive_kind,
      download_url,
      install_dir: version_dir,
      install_path,
    }
  }
}

fn versions_dir(install_dir: &Path) -> PathBuf {
  install_dir.join("dart-sass")
}

/// Provides the Dart Sass executable, downloading it when needed.
pub struct SassBinary {
  install_dir: PathBuf,
  binary_path: Option<PathBuf>,
  version: Option<String>,
  endpoints: ReleaseEndpoints,
  platform: Option<SassPlatform>,
  client: reqwest::Client,
  reporter: Option<SharedReporter>,
  resolved_version: OnceCell<String>,
}

impl SassBinary {
  /// Provision releases under `install_dir`.
  pub fn new(install_dir: impl Into<PathBuf>) -> Self {
    Self {
      install_dir: install_dir.into(),
      binary_path: None,
      version: None,
      endpoints: ReleaseEndpoints::default(),
      platform: None,
      client: reqwest::Client::new(),
      reporter: None,
      resolved_version: OnceCell::new(),
    }
  }

  /// Use this executable as-is; no download or platform detection happens.
  pub fn with_binary_path(mut self, path: Option<PathBuf>) -> Self {
    self.binary_path = path;
    self
  }

  /// Pin a release version instead of asking for the latest.
  pub fn with_version(mut self, version: Option<String>) -> Self {
    self.version = version;
    self
  }

  pub fn with_endpoints(mut self, endpoints: ReleaseEndpoints) -> Self {
    self.endpoints = endpoints;
    self
  }

  /// Override host detection.
  pub fn with_platform(mut self, platform: SassPlatform) -> Self {
    self.platform = Some(platform);
    self
  }

  pub fn with_reporter(mut self, reporter: Option<SharedReporter>) -> Self {
    self.reporter = reporter;
    self
  }

  pub fn install_dir(&self) -> &Path {
    &self.install_dir
  }

  pub fn binary_path(&self) -> Option<&Path> {
    self.binary_path.as_deref()
  }

  /// Return a path to an executable, downloading and unpacking a release if needed.
  pub async fn ensure_binary(&self) -> Result<PathBuf, ProvisionError> {
    if let Some(path) = &self.binary_path {
      if !path.is_file() {
        return Err(ProvisionError::BinaryNotFound(path.clone()));
      }
      debug!(path = %path.display(), "using configured Sass binary");
      return Ok(path.clone());
    }

    let descriptor = self.descriptor().await?;
    if descriptor.install_path.is_file() {
      debug!(path = %descriptor.install_path.display(), "using installed Sass binary");
      return Ok(descriptor.install_path);
    }

    self.install(&descriptor, false).await?;
    Ok(descriptor.install_path)
  }

  /// Download and unpack the release, replacing any existing install of that version.
  pub async fn download_executable(&self) -> Result<PathBuf, ProvisionError> {
    let descriptor = self.descriptor().await?;
    self.install(&descriptor, true).await?;
    Ok(descriptor.install_path)
  }

  /// Describe the release this binary resolves to.
  pub async fn descriptor(&self) -> Result<BinaryDescriptor, ProvisionError> {
    let version = self.version().await?;
    let platform = self.platform()?;
    Ok(BinaryDescriptor::new(
      &self.install_dir,
      &self.endpoints.releases_url,
      &version,
      platform,
    ))
  }

  /// The release version: pinned, latest from the feed, or the newest one installed.
  ///
  /// Resolved once and reused for the lifetime of this value.
  pub async fn version(&self) -> Result<String, ProvisionError> {
    self
      .resolved_version
      .get_or_try_init(|| async {
        if let Some(version) = &self.version {
          return Ok(version.clone());
        }

        match download::fetch_latest_version(&self.client, &self.endpoints.latest_release_url).await {
          Ok(version) => Ok(version),
          Err(err) => match latest_installed_version(&self.install_dir) {
            Some(version) => {
              warn!(error = %err, version = %version, "latest version lookup failed, using installed release");
              Ok(version)
            }
            None => Err(ProvisionError::VersionResolution {
              reason: err.to_string(),
            }),
          },
        }
      })
      .await
      .cloned()
  }

  fn platform(&self) -> Result<SassPlatform, ProvisionError> {
    match self.platform {
      Some(platform) => Ok(platform),
      None => Ok(SassPlatform::current()?),
    }
  }

  /// Stage, verify and move a release into place.
  ///
  /// Without `replace`, a complete install that appears meanwhile wins. A version directory
  /// without a launcher is stale and always replaced.
  async fn install(&self, descriptor: &BinaryDescriptor, replace: bool) -> Result<(), ProvisionError> {
    let io_err = |path: &Path| {
      let path = path.to_path_buf();
      move |source| ProvisionError::Io { path, source }
    };

    if let Some(reporter) = &self.reporter {
      reporter.note(&format!("Downloading Sass binary from {}", descriptor.download_url));
    }

    fs::create_dir_all(&self.install_dir).map_err(io_err(&self.install_dir))?;

    // Everything transient lives in here and is removed on drop
    let staging = tempfile::Builder::new()
      .prefix(".sasspipe-download-")
      .tempdir_in(&self.install_dir)
      .map_err(io_err(&self.install_dir))?;

    let archive_path = staging.path().join(&descriptor.archive_name);
    let downloaded = download::download_to_file(
      &self.client,
      &descriptor.download_url,
      &archive_path,
      self.reporter.as_ref(),
    )
    .await;

    match downloaded {
      Ok(_) => {}
      Err(DownloadError::Http { url, status: 404 }) => {
        let latest = download::fetch_latest_version(&self.client, &self.endpoints.latest_release_url)
          .await
          .ok();
        if latest.as_deref() != Some(descriptor.version.as_str()) {
          return Err(
            DownloadError::VersionNotFound {
              version: descriptor.version.clone(),
              url,
            }
            .into(),
          );
        }
        return Err(DownloadError::Http { url, status: 404 }.into());
      }
      Err(err) => return Err(err.into()),
    }

    let unpacked = staging.path().join("dart-sass");
    let (archive, dest) = (archive_path.clone(), unpacked.clone());
    tokio::task::spawn_blocking(move || archive::unpack_archive(&archive, &dest)).await??;

    // Nothing reaches the version directory unless it has a runnable launcher
    let staged_launcher = unpacked.join(descriptor.platform.executable_name());
    if !staged_launcher.is_file() {
      return Err(ExtractionError::MissingBinary(descriptor.install_path.clone()).into());
    }
    make_executable(&staged_launcher).map_err(io_err(&staged_launcher))?;

    let versions = versions_dir(&self.install_dir);
    fs::create_dir_all(&versions).map_err(io_err(&versions))?;

    if descriptor.install_dir.exists() {
      if !replace && descriptor.install_path.is_file() {
        debug!(path = %descriptor.install_dir.display(), "release installed concurrently, keeping it");
        return Ok(());
      }
      // The previous tree goes into staging and is removed with it
      let previous = staging.path().join("previous");
      fs::rename(&descriptor.install_dir, &previous).map_err(io_err(&descriptor.install_dir))?;
      debug!(path = %descriptor.install_dir.display(), replace, "moved previous release aside");
    }

    if let Err(err) = fs::rename(&unpacked, &descriptor.install_dir) {
      if !replace && descriptor.install_path.is_file() {
        debug!(path = %descriptor.install_dir.display(), "release installed concurrently, keeping it");
        return Ok(());
      }
      return Err(ProvisionError::Io {
        path: descriptor.install_dir.clone(),
        source: err,
      });
    }

    info!(
      version = %descriptor.version,
      path = %descriptor.install_path.display(),
      "installed Sass binary"
    );
    Ok(())
  }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
  Ok(())
}

/// Highest semver-named release already unpacked under `install_dir`.
fn latest_installed_version(install_dir: &Path) -> Option<String> {
  let entries = fs::read_dir(versions_dir(install_dir)).ok()?;

  entries
    .flatten()
    .filter(|entry| {
      let dir = entry.path();
      dir.join("sass").is_file() || dir.join("sass.bat").is_file()
    })
    .filter_map(|entry| {
      let name = entry.file_name().to_str()?.to_string();
      let parsed = semver::Version::parse(name.trim_start_matches('v')).ok()?;
      Some((parsed, name))
    })
    .max_by(|a, b| a.0.cmp(&b.0))
    .map(|(_, name)| name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use crate::platform::Libc;
  use crate::platform::arch::Arch;
  use crate::platform::os::Os;
  use crate::reporter::recording::RecordingReporter;
  use crate::util::testutil::{tar_gz_archive, zip_archive};
  use tempfile::TempDir;
  use tracing_test::traced_test;

  fn linux_x64() -> SassPlatform {
    SassPlatform::new(Os::Linux, Arch::X64, Libc::Gnu).unwrap()
  }

  fn windows_x64() -> SassPlatform {
    SassPlatform::new(Os::Windows, Arch::X64, Libc::Gnu).unwrap()
  }

  fn endpoints(server: &mockito::Server) -> ReleaseEndpoints {
    ReleaseEndpoints {
      releases_url: format!("{}/releases", server.url()),
      latest_release_url: format!("{}/latest", server.url()),
    }
  }

  fn install_fake(install_dir: &Path, version: &str) -> PathBuf {
    let dir = install_dir.join("dart-sass").join(version);
    fs::create_dir_all(&dir).unwrap();
    let sass = dir.join("sass");
    fs::write(&sass, "#!/bin/sh\n").unwrap();
    sass
  }

  #[test]
  fn descriptor_urls_and_paths() {
    let descriptor = BinaryDescriptor::new(
      Path::new("/proj/var"),
      "https://example.com/releases/",
      "1.69.5",
      linux_x64(),
    );
    assert_eq!(descriptor.archive_name, "dart-sass-1.69.5-linux-x64.tar.gz");
    assert_eq!(
      descriptor.download_url,
      "https://example.com/releases/1.69.5/dart-sass-1.69.5-linux-x64.tar.gz"
    );
    assert_eq!(descriptor.install_path, PathBuf::from("/proj/var/dart-sass/1.69.5/sass"));

    let windows = BinaryDescriptor::new(Path::new("/proj/var"), "https://example.com", "1.69.5", windows_x64());
    assert_eq!(windows.archive_name, "dart-sass-1.69.5-windows-x64.zip");
    assert_eq!(windows.archive_kind, ArchiveKind::Zip);
    assert!(windows.install_path.ends_with("sass.bat"));
  }

  #[tokio::test]
  async fn explicit_path_skips_network() {
    let mut server = mockito::Server::new_async().await;
    let any = server
      .mock("GET", mockito::Matcher::Any)
      .expect(0)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let custom = temp.path().join("my-sass");
    fs::write(&custom, "#!/bin/sh\n").unwrap();

    let binary = SassBinary::new(temp.path().join("var"))
      .with_endpoints(endpoints(&server))
      .with_binary_path(Some(custom.clone()));

    assert_eq!(binary.ensure_binary().await.unwrap(), custom);
    assert!(!temp.path().join("var").exists());
    any.assert_async().await;
  }

  #[tokio::test]
  async fn explicit_path_must_exist() {
    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path()).with_binary_path(Some(temp.path().join("nope")));

    let err = binary.ensure_binary().await.unwrap_err();
    assert!(matches!(err, ProvisionError::BinaryNotFound(_)));
  }

  #[tokio::test]
  #[traced_test]
  async fn installed_version_performs_no_requests() {
    let mut server = mockito::Server::new_async().await;
    let any = server
      .mock("GET", mockito::Matcher::Any)
      .expect(0)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let installed = install_fake(temp.path(), "1.69.5");

    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64())
      .with_version(Some("1.69.5".into()));

    assert_eq!(binary.ensure_binary().await.unwrap(), installed);
    assert_eq!(binary.ensure_binary().await.unwrap(), installed);
    any.assert_async().await;
    assert!(logs_contain("using installed Sass binary"));
  }

  #[tokio::test]
  async fn downloads_and_installs_tar_gz_release() {
    let archive = tar_gz_archive(&[
      ("dart-sass/sass", "#!/bin/sh\necho 1.70.0\n"),
      ("dart-sass/src/dart", "bin"),
    ]);
    let mut server = mockito::Server::new_async().await;
    let download = server
      .mock("GET", "/releases/1.70.0/dart-sass-1.70.0-linux-x64.tar.gz")
      .with_status(200)
      .with_body(archive)
      .expect(1)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let recorder = Arc::new(RecordingReporter::default());
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64())
      .with_version(Some("1.70.0".into()))
      .with_reporter(Some(recorder.clone() as SharedReporter));

    let path = binary.ensure_binary().await.unwrap();
    assert_eq!(path, temp.path().join("dart-sass/1.70.0/sass"));
    assert!(path.is_file());
    assert!(temp.path().join("dart-sass/1.70.0/src/dart").is_file());

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      let mode = fs::metadata(&path).unwrap().permissions().mode();
      assert_eq!(mode & 0o111, 0o111);
    }

    // staging directory and archive are gone
    let leftovers: Vec<_> = fs::read_dir(temp.path())
      .unwrap()
      .flatten()
      .map(|e| e.file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(leftovers, vec!["dart-sass".to_string()]);

    assert!(recorder.notes()[0].starts_with("Downloading Sass binary from"));

    // second call is served from disk
    binary.ensure_binary().await.unwrap();
    download.assert_async().await;
  }

  #[tokio::test]
  async fn downloads_and_installs_zip_release() {
    let archive = zip_archive(&[("dart-sass/sass.bat", "@echo off\r\n"), ("dart-sass/src/dart.exe", "bin")]);
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/releases/1.70.0/dart-sass-1.70.0-windows-x64.zip")
      .with_status(200)
      .with_body(archive)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(windows_x64())
      .with_version(Some("1.70.0".into()));

    let path = binary.ensure_binary().await.unwrap();
    assert_eq!(path, temp.path().join("dart-sass/1.70.0/sass.bat"));
    assert!(path.is_file());
  }

  #[tokio::test]
  async fn missing_version_is_distinguished() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/releases/0.0.1/dart-sass-0.0.1-linux-x64.tar.gz")
      .with_status(404)
      .create_async()
      .await;
    server
      .mock("GET", "/latest")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"tag_name": "1.80.0"}"#)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64())
      .with_version(Some("0.0.1".into()));

    let err = binary.ensure_binary().await.unwrap_err();
    assert!(
      matches!(err, ProvisionError::Download(DownloadError::VersionNotFound { ref version, .. }) if version == "0.0.1"),
      "unexpected error: {err}"
    );
  }

  #[tokio::test]
  async fn missing_latest_release_is_plain_http_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/releases/1.80.0/dart-sass-1.80.0-linux-x64.tar.gz")
      .with_status(404)
      .create_async()
      .await;
    server
      .mock("GET", "/latest")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"tag_name": "1.80.0"}"#)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64());

    let err = binary.ensure_binary().await.unwrap_err();
    assert!(matches!(
      err,
      ProvisionError::Download(DownloadError::Http { status: 404, .. })
    ));
  }

  #[tokio::test]
  async fn unpinned_version_comes_from_release_feed_once() {
    let mut server = mockito::Server::new_async().await;
    let latest = server
      .mock("GET", "/latest")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"tag_name": "1.77.8"}"#)
      .expect(1)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64());

    assert_eq!(binary.version().await.unwrap(), "1.77.8");
    let descriptor = binary.descriptor().await.unwrap();
    assert_eq!(descriptor.version, "1.77.8");
    latest.assert_async().await;
  }

  #[tokio::test]
  async fn unreachable_feed_falls_back_to_newest_install() {
    let mut server = mockito::Server::new_async().await;
    server.mock("GET", "/latest").with_status(503).create_async().await;

    let temp = TempDir::new().unwrap();
    install_fake(temp.path(), "1.9.0");
    let newest = install_fake(temp.path(), "1.10.2");
    fs::create_dir_all(temp.path().join("dart-sass/not-a-version")).unwrap();

    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64());

    assert_eq!(binary.ensure_binary().await.unwrap(), newest);
  }

  #[tokio::test]
  async fn unreachable_feed_without_install_fails() {
    let mut server = mockito::Server::new_async().await;
    server.mock("GET", "/latest").with_status(503).create_async().await;

    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64());

    let err = binary.ensure_binary().await.unwrap_err();
    assert!(matches!(err, ProvisionError::VersionResolution { .. }));
  }

  #[tokio::test]
  async fn corrupt_download_is_an_extraction_error() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/releases/1.70.0/dart-sass-1.70.0-linux-x64.tar.gz")
      .with_status(200)
      .with_body("definitely not gzip")
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64())
      .with_version(Some("1.70.0".into()));

    let err = binary.ensure_binary().await.unwrap_err();
    assert!(matches!(err, ProvisionError::Extraction(_)));
  }

  #[tokio::test]
  async fn archive_without_launcher_fails_postcondition() {
    let archive = tar_gz_archive(&[("dart-sass/README", "nothing to run")]);
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/releases/1.70.0/dart-sass-1.70.0-linux-x64.tar.gz")
      .with_status(200)
      .with_body(archive)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64())
      .with_version(Some("1.70.0".into()));

    let err = binary.ensure_binary().await.unwrap_err();
    assert!(matches!(
      err,
      ProvisionError::Extraction(ExtractionError::MissingBinary(_))
    ));
    assert!(!temp.path().join("dart-sass/1.70.0").exists());
  }

  #[tokio::test]
  async fn forced_download_replaces_existing_release() {
    let archive = tar_gz_archive(&[("dart-sass/sass", "NEW"), ("dart-sass/src/dart", "bin")]);
    let mut server = mockito::Server::new_async().await;
    let download = server
      .mock("GET", "/releases/1.70.0/dart-sass-1.70.0-linux-x64.tar.gz")
      .with_status(200)
      .with_body(archive)
      .expect(1)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let installed = install_fake(temp.path(), "1.70.0");
    fs::write(&installed, "OLD").unwrap();
    fs::write(temp.path().join("dart-sass/1.70.0/leftover"), "old file").unwrap();

    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64())
      .with_version(Some("1.70.0".into()));

    let path = binary.download_executable().await.unwrap();
    assert_eq!(path, installed);
    assert_eq!(fs::read_to_string(&path).unwrap(), "NEW");
    assert!(temp.path().join("dart-sass/1.70.0/src/dart").is_file());
    assert!(!temp.path().join("dart-sass/1.70.0/leftover").exists());

    let leftovers: Vec<_> = fs::read_dir(temp.path())
      .unwrap()
      .flatten()
      .map(|e| e.file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(leftovers, vec!["dart-sass".to_string()]);
    download.assert_async().await;
  }

  #[tokio::test]
  async fn stale_release_without_launcher_is_replaced() {
    let archive = tar_gz_archive(&[("dart-sass/sass", "#!/bin/sh\necho 1.70.0\n")]);
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/releases/1.70.0/dart-sass-1.70.0-linux-x64.tar.gz")
      .with_status(200)
      .with_body(archive)
      .create_async()
      .await;

    let temp = TempDir::new().unwrap();
    let stale = temp.path().join("dart-sass/1.70.0");
    fs::create_dir_all(&stale).unwrap();
    fs::write(stale.join("README"), "half an install").unwrap();

    let binary = SassBinary::new(temp.path())
      .with_endpoints(endpoints(&server))
      .with_platform(linux_x64())
      .with_version(Some("1.70.0".into()));

    let path = binary.ensure_binary().await.unwrap();
    assert!(path.is_file());
    assert!(!stale.join("README").exists());
  }
}
