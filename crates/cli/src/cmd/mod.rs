mod build;
mod info;
mod install;

use std::path::Path;

use anyhow::{Context, Result};

use sasspipe_lib::config::{SassConfig, find_config_path};

pub use build::cmd_build;
pub use info::cmd_info;
pub use install::cmd_install;

/// Load `sasspipe.toml`, or fall back to defaults rooted at the current directory.
fn load_config(explicit: Option<&Path>) -> Result<SassConfig> {
  let cwd = std::env::current_dir().context("Failed to read current directory")?;

  match find_config_path(explicit, &cwd)? {
    Some(path) => SassConfig::load(&path).with_context(|| format!("Failed to load {}", path.display())),
    None => Ok(SassConfig::defaults(cwd)),
  }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
