//! Pipeline hooks.

use thiserror::Error;

use crate::build::{BuildError, SassBuilder};
use crate::reporter::SharedReporter;

#[derive(Debug, Error)]
pub enum HookError {
  #[error(transparent)]
  Build(#[from] BuildError),

  /// The compiler ran and exited unsuccessfully.
  #[error("error compiling Sass: \"{stderr}\"")]
  CompileFailed { stderr: String },
}

/// Compile every configured source before the asset pipeline runs.
///
/// Compiler output is forwarded to `reporter` as it arrives.
pub async fn pre_assets_compile(builder: &SassBuilder, reporter: Option<SharedReporter>) -> Result<(), HookError> {
  let mut process = builder.run_build(false).await?;

  let outcome = process
    .wait(|_, text| {
      if let Some(reporter) = &reporter {
        reporter.write(text);
      }
    })
    .await?;

  if outcome.success() {
    Ok(())
  } else {
    Err(HookError::CompileFailed { stderr: outcome.stderr })
  }
}
