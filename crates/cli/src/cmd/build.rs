//! Implementation of the `sasspipe build` and `sasspipe watch` commands.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use tracing::info;

use sasspipe_lib::reporter::{Reporter, SharedReporter};

use super::{load_config, runtime};
use crate::output::{TermReporter, format_duration, print_info, print_stat, print_success};

/// How long a watcher gets to exit after its input closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Run the compiler over every configured source, streaming its output.
///
/// In watch mode this runs until the compiler exits or Ctrl-C is pressed.
pub fn cmd_build(config: Option<&Path>, watch: bool, verbose: bool) -> Result<()> {
  let start = Instant::now();
  let config = load_config(config)?;

  let term = Arc::new(TermReporter::new(verbose));
  let reporter: SharedReporter = term.clone();
  let builder = config.builder(Some(reporter));

  let rt = runtime()?;
  let (outcome, interrupted) = rt.block_on(async {
    let mut process = builder.run_build(watch).await?;

    let waited = if watch {
      tokio::select! {
        outcome = process.wait(|_, text| term.write(text)) => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
      }
    } else {
      Some(process.wait(|_, text| term.write(text)).await)
    };

    match waited {
      Some(outcome) => anyhow::Ok((outcome?, false)),
      None => {
        info!("interrupted, stopping Sass watcher");
        anyhow::Ok((process.terminate(SHUTDOWN_GRACE).await?, true))
      }
    }
  })?;

  if interrupted {
    println!();
    print_info("Stopped watching");
    return Ok(());
  }

  if !outcome.success() {
    bail!("Sass build failed");
  }

  println!();
  print_success("Sass build complete");
  print_stat("Output", &config.output_path().display().to_string());
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
