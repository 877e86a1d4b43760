//! Host platform detection for Dart Sass binary selection.
//!
//! Detection goes through closed enums and an explicit mapping table. Any
//! combination missing from [`SASS_PLATFORMS`] is reported as unsupported.

pub mod arch;
pub mod os;

use std::fmt;
use std::path::Path;

use thiserror::Error;

use arch::Arch;
use os::Os;

/// C library flavour, only meaningful on Linux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Libc {
  Gnu,
  Musl,
}

impl Libc {
  /// Detect musl either from the build target or from an Alpine host.
  pub fn detect() -> Self {
    if cfg!(target_env = "musl") || Path::new("/etc/alpine-release").exists() {
      Self::Musl
    } else {
      Self::Gnu
    }
  }
}

/// Host OS/architecture pair with no published Dart Sass binary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported platform or architecture (os: {os}, machine: {arch})")]
pub struct UnsupportedPlatform {
  pub os: String,
  pub arch: String,
}

/// Supported platforms and their release identifiers.
const SASS_PLATFORMS: &[(Os, Arch, Libc, &str)] = &[
  (Os::MacOs, Arch::Arm64, Libc::Gnu, "macos-arm64"),
  (Os::MacOs, Arch::X64, Libc::Gnu, "macos-x64"),
  (Os::Linux, Arch::X64, Libc::Gnu, "linux-x64"),
  (Os::Linux, Arch::Arm64, Libc::Gnu, "linux-arm64"),
  (Os::Linux, Arch::X64, Libc::Musl, "linux-musl-x64"),
  (Os::Linux, Arch::Arm64, Libc::Musl, "linux-musl-arm64"),
  (Os::Windows, Arch::X64, Libc::Gnu, "windows-x64"),
];

/// A platform Dart Sass ships a standalone binary for (e.g., "linux-musl-x64")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SassPlatform {
  pub os: Os,
  pub arch: Arch,
  pub libc: Libc,
  identifier: &'static str,
}

impl SassPlatform {
  /// Look up a platform in the mapping table.
  ///
  /// `libc` is ignored outside Linux.
  pub fn new(os: Os, arch: Arch, libc: Libc) -> Result<Self, UnsupportedPlatform> {
    let libc = if os == Os::Linux { libc } else { Libc::Gnu };
    SASS_PLATFORMS
      .iter()
      .find(|(o, a, l, _)| *o == os && *a == arch && *l == libc)
      .map(|(os, arch, libc, identifier)| Self {
        os: *os,
        arch: *arch,
        libc: *libc,
        identifier: *identifier,
      })
      .ok_or_else(|| UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
      })
  }

  /// Map raw OS and machine names (e.g. from `uname`) to a platform.
  pub fn from_names(os: &str, machine: &str, libc: Libc) -> Result<Self, UnsupportedPlatform> {
    let unsupported = || UnsupportedPlatform {
      os: os.to_string(),
      arch: machine.to_string(),
    };
    let parsed_os = Os::from_name(os).ok_or_else(unsupported)?;
    let parsed_arch = Arch::from_name(machine).ok_or_else(unsupported)?;
    Self::new(parsed_os, parsed_arch, libc)
  }

  /// Detect the current platform at runtime
  pub fn current() -> Result<Self, UnsupportedPlatform> {
    Self::from_names(std::env::consts::OS, std::env::consts::ARCH, Libc::detect())
  }

  /// Identifier used in release archive names (e.g., "macos-arm64")
  pub fn identifier(&self) -> &'static str {
    self.identifier
  }

  pub fn is_windows(&self) -> bool {
    self.os == Os::Windows
  }

  /// Name of the launcher inside an extracted release.
  pub fn executable_name(&self) -> &'static str {
    if self.is_windows() { "sass.bat" } else { "sass" }
  }
}

impl fmt::Display for SassPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.identifier)
  }
}
