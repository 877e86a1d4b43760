//! Release feed lookups and streaming downloads.

use std::path::{Path, PathBuf};

use reqwest::header::USER_AGENT;
use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::consts::APP_NAME;
use crate::reporter::SharedReporter;

/// Errors that can occur while talking to the release host.
#[derive(Debug, Error)]
pub enum DownloadError {
  /// The release host has no archive for the requested version.
  #[error("cannot download Sass binary: verify version `{version}` exists for your machine ({url})")]
  VersionNotFound { version: String, url: String },

  #[error("cannot download Sass binary from {url}: HTTP {status}")]
  Http { url: String, status: u16 },

  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("release metadata from {url} is unusable: {reason}")]
  MalformedRelease { url: String, reason: String },

  #[error("failed to write download to \"{}\": {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Debug, Deserialize)]
struct Release {
  tag_name: Option<String>,
}

fn user_agent() -> String {
  format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION"))
}

/// Ask the release feed for the latest published version tag.
pub async fn fetch_latest_version(client: &reqwest::Client, url: &str) -> Result<String, DownloadError> {
  let request_err = |source| DownloadError::Request {
    url: url.to_string(),
    source,
  };

  let response = client
    .get(url)
    .header(USER_AGENT, user_agent())
    .send()
    .await
    .map_err(request_err)?;

  let status = response.status();
  if !status.is_success() {
    return Err(DownloadError::Http {
      url: url.to_string(),
      status: status.as_u16(),
    });
  }

  let body = response.bytes().await.map_err(request_err)?;
  let release: Release = serde_json::from_slice(&body).map_err(|e| DownloadError::MalformedRelease {
    url: url.to_string(),
    reason: e.to_string(),
  })?;
  let tag = release
    .tag_name
    .filter(|tag| !tag.trim().is_empty())
    .ok_or_else(|| DownloadError::MalformedRelease {
      url: url.to_string(),
      reason: "missing `tag_name`".to_string(),
    })?;

  debug!(version = %tag, "resolved latest Sass version");
  Ok(tag)
}

/// Stream `url` into `dest`, reporting progress when the size is known.
///
/// Returns the number of bytes written. Chunks are written as they arrive, so memory use
/// does not depend on the archive size.
pub async fn download_to_file(
  client: &reqwest::Client,
  url: &str,
  dest: &Path,
  reporter: Option<&SharedReporter>,
) -> Result<u64, DownloadError> {
  let request_err = |source| DownloadError::Request {
    url: url.to_string(),
    source,
  };
  let write_err = |source| DownloadError::Write {
    path: dest.to_path_buf(),
    source,
  };

  info!(url = %url, "downloading Sass binary");

  let mut response = client
    .get(url)
    .header(USER_AGENT, user_agent())
    .send()
    .await
    .map_err(request_err)?;

  let status = response.status();
  if !status.is_success() {
    return Err(DownloadError::Http {
      url: url.to_string(),
      status: status.as_u16(),
    });
  }

  // Zero or unknown length just means no progress yet
  let total = response.content_length().unwrap_or(0);

  let mut file = fs::File::create(dest).await.map_err(write_err)?;
  let mut downloaded: u64 = 0;

  while let Some(chunk) = response.chunk().await.map_err(request_err)? {
    file.write_all(&chunk).await.map_err(write_err)?;
    downloaded += chunk.len() as u64;

    if total > 0 {
      if let Some(reporter) = reporter {
        reporter.progress(downloaded.min(total), total);
      }
    }
  }

  file.flush().await.map_err(write_err)?;

  if total > 0 {
    if let Some(reporter) = reporter {
      reporter.finish_progress();
    }
  }

  info!(path = %dest.display(), size = downloaded, "download complete");
  Ok(downloaded)
}
