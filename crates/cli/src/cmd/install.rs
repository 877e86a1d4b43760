use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use sasspipe_lib::reporter::SharedReporter;

use super::{load_config, runtime};
use crate::output::{TermReporter, print_info, print_stat, print_success};

pub fn cmd_install(config: Option<&Path>, force: bool, verbose: bool) -> Result<()> {
  let config = load_config(config)?;
  let reporter: SharedReporter = Arc::new(TermReporter::new(verbose));
  let binary = config.binary(Some(reporter));

  if let Some(path) = binary.binary_path() {
    print_info("Using the configured Sass binary, nothing to download");
    print_stat("Path", &path.display().to_string());
    return Ok(());
  }

  let rt = runtime()?;
  let (path, version) = rt
    .block_on(async {
      let path = if force {
        binary.download_executable().await?
      } else {
        binary.ensure_binary().await?
      };
      let version = binary.version().await?;
      anyhow::Ok((path, version))
    })
    .context("Failed to install Sass")?;

  print_success("Sass binary ready");
  print_stat("Version", &version);
  print_stat("Path", &path.display().to_string());

  Ok(())
}
