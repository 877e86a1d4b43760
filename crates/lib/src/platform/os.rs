use std::fmt;

/// Operating systems Dart Sass publishes binaries for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

/// Accepted spellings for each OS, matched case-insensitively.
const OS_NAMES: &[(&str, Os)] = &[
  ("linux", Os::Linux),
  ("macos", Os::MacOs),
  ("darwin", Os::MacOs),
  ("windows", Os::Windows),
  ("win32", Os::Windows),
];

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    Self::from_name(std::env::consts::OS)
  }

  /// Map an OS name to a variant using the explicit name table.
  ///
  /// Returns `None` for anything not listed, rather than guessing from substrings.
  pub fn from_name(name: &str) -> Option<Self> {
    let name = name.trim().to_ascii_lowercase();
    OS_NAMES.iter().find(|(n, _)| *n == name).map(|(_, os)| *os)
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
