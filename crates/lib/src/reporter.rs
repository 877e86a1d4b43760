//! User-facing output side channel.
//!
//! Components accept an optional [`Reporter`] for human-readable notes, compiler output and
//! download progress. Reporting never influences control flow; structured diagnostics go
//! through `tracing` regardless of whether a reporter is attached.

use std::sync::Arc;

/// Receives human-readable progress from provisioning and builds.
pub trait Reporter: Send + Sync {
  /// A short highlighted note (e.g. "Downloading Sass binary from ...").
  fn note(&self, message: &str);

  /// Raw text, written as-is (compiler output, command lines).
  fn write(&self, text: &str);

  /// Whether extra detail such as full command lines should be shown.
  fn is_verbose(&self) -> bool {
    false
  }

  /// Download progress. Only called once the total size is known.
  fn progress(&self, _downloaded: u64, _total: u64) {}

  /// The download that was reporting progress finished.
  fn finish_progress(&self) {}
}

/// Shared reporter handle passed between components.
pub type SharedReporter = Arc<dyn Reporter>;

#[cfg(test)]
pub(crate) mod recording {
  use std::sync::Mutex;

  use super::Reporter;

  /// Collects everything reported, for assertions.
  #[derive(Default)]
  pub struct RecordingReporter {
    pub verbose: bool,
    pub notes: Mutex<Vec<String>>,
    pub written: Mutex<String>,
    pub progress: Mutex<Vec<(u64, u64)>>,
  }

  impl RecordingReporter {
    pub fn verbose() -> Self {
      Self {
        verbose: true,
        ..Self::default()
      }
    }

    pub fn notes(&self) -> Vec<String> {
      self.notes.lock().unwrap().clone()
    }

    pub fn written(&self) -> String {
      self.written.lock().unwrap().clone()
    }
  }

  impl Reporter for RecordingReporter {
    fn note(&self, message: &str) {
      self.notes.lock().unwrap().push(message.to_string());
    }

    fn write(&self, text: &str) {
      self.written.lock().unwrap().push_str(text);
    }

    fn is_verbose(&self) -> bool {
      self.verbose
    }

    fn progress(&self, downloaded: u64, total: u64) {
      self.progress.lock().unwrap().push((downloaded, total));
    }
  }
}
