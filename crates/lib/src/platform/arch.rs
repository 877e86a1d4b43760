use std::fmt;

/// CPU architectures Dart Sass publishes binaries for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X64,
  Arm64,
}

const ARCH_NAMES: &[(&str, Arch)] = &[
  ("x86_64", Arch::X64),
  ("amd64", Arch::X64),
  ("x64", Arch::X64),
  ("aarch64", Arch::Arm64),
  ("arm64", Arch::Arm64),
];

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    Self::from_name(std::env::consts::ARCH)
  }

  /// Map a machine name (as reported by `uname -m` or `std::env::consts::ARCH`) to a variant.
  pub fn from_name(name: &str) -> Option<Self> {
    let name = name.trim().to_ascii_lowercase();
    ARCH_NAMES.iter().find(|(n, _)| *n == name).map(|(_, arch)| *arch)
  }

  /// Returns the identifier used in Dart Sass release archive names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X64 => "x64",
      Self::Arm64 => "arm64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn machine_aliases_map_to_the_same_arch() {
    assert_eq!(Arch::from_name("x86_64"), Some(Arch::X64));
    assert_eq!(Arch::from_name("AMD64"), Some(Arch::X64));
    assert_eq!(Arch::from_name("aarch64"), Some(Arch::Arm64));
    assert_eq!(Arch::from_name("arm64"), Some(Arch::Arm64));
  }

  #[test]
  fn unknown_machines_are_unmapped() {
    assert_eq!(Arch::from_name("i686"), None);
    assert_eq!(Arch::from_name("riscv64"), None);
  }
}
