//! Shared constants.

pub const APP_NAME: &str = "sasspipe";

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILENAME: &str = "sasspipe.toml";

/// Extension of Sass sources handled by the asset bridge.
pub const SASS_EXTENSION: &str = "scss";

/// Basename prefix marking a Sass partial.
pub const PARTIAL_PREFIX: char = '_';

/// Suffix appended to every compiled output stem.
pub const OUTPUT_SUFFIX: &str = ".output.css";

/// Command a user runs to produce compiled outputs.
pub const BUILD_COMMAND: &str = "sasspipe build";

pub const DEFAULT_RELEASES_URL: &str = "https://github.com/sass/dart-sass/releases/download";

pub const DEFAULT_LATEST_RELEASE_URL: &str = "https://api.github.com/repos/sass/dart-sass/releases/latest";
