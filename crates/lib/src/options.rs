//! Dart Sass command-line option translation.
//!
//! [`BuildOptions`] only ever holds names from [`SASS_OPTIONS`] with values of the right
//! kind; validation happens when a value is set (including deserialization), so
//! [`build_arguments`] itself cannot fail.
//!
//! Run `sass --help` to see all options.
//! See <https://sass-lang.com/documentation/cli/dart-sass/>.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an option is rendered on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
  /// `--name=value`, restricted to the listed values.
  Value(&'static [&'static str]),
  /// `--name` when true, `--no-name` when false.
  Negatable,
  /// `--name` when true, nothing when false.
  Presence,
}

/// One recognized option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
  /// Canonical snake_case name used in configuration.
  pub name: &'static str,
  /// Flag without leading dashes.
  pub flag: &'static str,
  pub kind: FlagKind,
}

/// Recognized options, in emission order.
pub const SASS_OPTIONS: &[OptionSpec] = &[
  // Input and Output
  OptionSpec {
    name: "style",
    flag: "style",
    kind: FlagKind::Value(&["expanded", "compressed"]),
  },
  OptionSpec {
    name: "charset",
    flag: "charset",
    kind: FlagKind::Negatable,
  },
  // Source Maps
  OptionSpec {
    name: "source_map",
    flag: "source-map",
    kind: FlagKind::Negatable,
  },
  OptionSpec {
    name: "embed_sources",
    flag: "embed-sources",
    kind: FlagKind::Negatable,
  },
  OptionSpec {
    name: "embed_source_map",
    flag: "embed-source-map",
    kind: FlagKind::Negatable,
  },
  // Warnings
  OptionSpec {
    name: "quiet",
    flag: "quiet",
    kind: FlagKind::Negatable,
  },
  OptionSpec {
    name: "quiet_deps",
    flag: "quiet-deps",
    kind: FlagKind::Negatable,
  },
  // Other
  OptionSpec {
    name: "stop_on_error",
    flag: "stop-on-error",
    kind: FlagKind::Negatable,
  },
  OptionSpec {
    name: "trace",
    flag: "trace",
    kind: FlagKind::Negatable,
  },
  OptionSpec {
    name: "error_css",
    flag: "error-css",
    kind: FlagKind::Negatable,
  },
  OptionSpec {
    name: "update",
    flag: "update",
    kind: FlagKind::Presence,
  },
];

/// Source map flags that mean nothing once `--no-source-map` is emitted.
const SOURCE_MAP_DEPENDENT: &[&str] = &[
  "--embed-sources",
  "--embed-source-map",
  "--no-embed-sources",
  "--no-embed-source-map",
];

/// Errors raised when setting an option.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
  #[error("invalid option \"{name}\". Available options are: \"{}\"", valid_names().join("\", \""))]
  Unknown { name: String },

  #[error("invalid value \"{value}\" for option \"{name}\" (expected {expected})")]
  InvalidValue {
    name: String,
    value: String,
    expected: String,
  },
}

/// Output style of the generated CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
  /// Each selector and declaration on its own line (Dart Sass default).
  Expanded,
  /// Whole stylesheet on a single line, without comments.
  Compressed,
}

impl Style {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Expanded => "expanded",
      Self::Compressed => "compressed",
    }
  }
}

/// A set option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
  Bool(bool),
  Str(String),
}

impl fmt::Display for OptionValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Bool(b) => write!(f, "{b}"),
      Self::Str(s) => write!(f, "{s}"),
    }
  }
}

impl From<bool> for OptionValue {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<&str> for OptionValue {
  fn from(value: &str) -> Self {
    Self::Str(value.to_string())
  }
}

impl From<Style> for OptionValue {
  fn from(value: Style) -> Self {
    Self::Str(value.as_str().to_string())
  }
}

/// Flags passed to the compiler for a single invocation, never stored in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeFlags {
  pub watch: bool,
}

/// Validated Sass build options.
///
/// Unset options are omitted from the generated arguments; defaults are left to the
/// caller (or to Dart Sass itself).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "BTreeMap<String, OptionValue>", into = "BTreeMap<String, OptionValue>")]
pub struct BuildOptions {
  /// Keyed by index into [`SASS_OPTIONS`], so iteration follows table order.
  values: BTreeMap<usize, OptionValue>,
}

impl BuildOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set an option by name.
  ///
  /// Accepts snake_case, camelCase and kebab-case spellings of the canonical name.
  pub fn set(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<&mut Self, OptionError> {
    let index = lookup(name).ok_or_else(|| OptionError::Unknown { name: name.to_string() })?;
    let spec = &SASS_OPTIONS[index];
    let value = value.into();
    validate(spec, &value)?;
    self.values.insert(index, value);
    Ok(self)
  }

  /// Builder-style [`set`](Self::set).
  pub fn with(mut self, name: &str, value: impl Into<OptionValue>) -> Result<Self, OptionError> {
    self.set(name, value)?;
    Ok(self)
  }

  /// Remove an option, leaving it unset.
  pub fn unset(&mut self, name: &str) -> Result<&mut Self, OptionError> {
    let index = lookup(name).ok_or_else(|| OptionError::Unknown { name: name.to_string() })?;
    self.values.remove(&index);
    Ok(self)
  }

  pub fn get(&self, name: &str) -> Option<&OptionValue> {
    lookup(name).and_then(|index| self.values.get(&index))
  }

  /// The configured output style, if any.
  pub fn style(&self) -> Option<Style> {
    match self.get("style") {
      Some(OptionValue::Str(s)) if s == "compressed" => Some(Style::Compressed),
      Some(OptionValue::Str(s)) if s == "expanded" => Some(Style::Expanded),
      _ => None,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// True when source maps were explicitly turned off.
  pub fn source_map_disabled(&self) -> bool {
    matches!(self.get("source_map"), Some(OptionValue::Bool(false)))
  }

  fn iter(&self) -> impl Iterator<Item = (&'static OptionSpec, &OptionValue)> {
    self.values.iter().map(|(index, value)| (&SASS_OPTIONS[*index], value))
  }
}

impl TryFrom<BTreeMap<String, OptionValue>> for BuildOptions {
  type Error = OptionError;

  fn try_from(map: BTreeMap<String, OptionValue>) -> Result<Self, Self::Error> {
    let mut options = BuildOptions::new();
    for (name, value) in map {
      options.set(&name, value)?;
    }
    Ok(options)
  }
}

impl From<BuildOptions> for BTreeMap<String, OptionValue> {
  fn from(options: BuildOptions) -> Self {
    options
      .iter()
      .map(|(spec, value)| (spec.name.to_string(), value.clone()))
      .collect()
  }
}

/// Canonical names of every recognized option.
pub fn valid_names() -> Vec<&'static str> {
  SASS_OPTIONS.iter().map(|spec| spec.name).collect()
}

/// Normalize `sourceMap` / `source-map` / `source_map` to the canonical form.
fn canonical_name(name: &str) -> String {
  let mut out = String::with_capacity(name.len() + 4);
  for c in name.trim().chars() {
    if c.is_ascii_uppercase() {
      out.push('_');
      out.push(c.to_ascii_lowercase());
    } else if c == '-' {
      out.push('_');
    } else {
      out.push(c);
    }
  }
  out
}

fn lookup(name: &str) -> Option<usize> {
  let canonical = canonical_name(name);
  SASS_OPTIONS.iter().position(|spec| spec.name == canonical)
}

fn validate(spec: &OptionSpec, value: &OptionValue) -> Result<(), OptionError> {
  let invalid = |expected: String| OptionError::InvalidValue {
    name: spec.name.to_string(),
    value: value.to_string(),
    expected,
  };

  match (spec.kind, value) {
    (FlagKind::Value(allowed), OptionValue::Str(s)) if allowed.contains(&s.as_str()) => Ok(()),
    (FlagKind::Value(allowed), _) => Err(invalid(format!("one of \"{}\"", allowed.join("\", \"")))),
    (FlagKind::Negatable | FlagKind::Presence, OptionValue::Bool(_)) => Ok(()),
    (FlagKind::Negatable | FlagKind::Presence, _) => Err(invalid("a boolean".to_string())),
  }
}

/// Translate options into the argument tokens Dart Sass expects.
///
/// Tokens follow [`SASS_OPTIONS`] order, with `--watch` appended last when requested.
pub fn build_arguments(options: &BuildOptions, flags: RuntimeFlags) -> Vec<String> {
  let mut args: Vec<String> = Vec::new();

  for (spec, value) in options.iter() {
    match (spec.kind, value) {
      // --style=compressed
      (FlagKind::Value(_), OptionValue::Str(s)) => args.push(format!("--{}={}", spec.flag, s)),
      // --no-embed-source-map
      (FlagKind::Negatable, OptionValue::Bool(true)) => args.push(format!("--{}", spec.flag)),
      (FlagKind::Negatable, OptionValue::Bool(false)) => args.push(format!("--no-{}", spec.flag)),
      // --update
      (FlagKind::Presence, OptionValue::Bool(true)) => args.push(format!("--{}", spec.flag)),
      _ => {}
    }
  }

  if options.source_map_disabled() {
    args.retain(|arg| !SOURCE_MAP_DEPENDENT.contains(&arg.as_str()));
  }

  if flags.watch {
    args.push("--watch".to_string());
  }

  args
}
