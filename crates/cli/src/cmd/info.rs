use std::path::Path;

use anyhow::Result;

use sasspipe_lib::options::{RuntimeFlags, build_arguments};
use sasspipe_lib::platform::SassPlatform;

use super::load_config;
use crate::output::{print_item, print_stat, print_warning};

pub fn cmd_info(config: Option<&Path>) -> Result<()> {
  let config = load_config(config)?;

  println!("System:");
  match SassPlatform::current() {
    Ok(platform) => print_stat("Platform", platform.identifier()),
    Err(err) => print_stat("Platform", &err.to_string()),
  }

  println!("Project:");
  print_stat("Directory", &config.project_dir.display().to_string());
  print_stat("Output", &config.output_path().display().to_string());
  match &config.binary_path {
    Some(path) => print_stat("Binary", &config.project_path(path).display().to_string()),
    None => print_stat(
      "Binary",
      &format!(
        "{} ({})",
        config.binary_version.as_deref().unwrap_or("latest"),
        config.install_path().join("dart-sass").display()
      ),
    ),
  }

  let flags = build_arguments(&config.sass_options, RuntimeFlags::default());
  if !flags.is_empty() {
    print_stat("Options", &flags.join(" "));
  }

  println!("Targets:");
  match config.resolved_targets() {
    Ok(targets) => {
      for target in targets {
        print_item(&format!("{} -> {}", target.source.display(), target.output.display()));
      }
    }
    Err(err) => print_warning(&err.to_string()),
  }

  Ok(())
}
