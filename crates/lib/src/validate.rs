//! Smoke validation of a built interpreter.

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::consts::{SMOKE_HELPER_PACKAGE, SQLITE_VERSION_FLOOR};
use crate::execute::{Cmd, ExecuteError, Host};

/// Check script run with the built interpreter.
pub const SMOKE_SCRIPT: &str = include_str!("../assets/smoke_check.py");

const SMOKE_SCRIPT_NAME: &str = "smoke_check.py";

/// Step of the smoke validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeStep {
  InstallHelper,
  WriteScript,
  RunChecks,
}

impl fmt::Display for SmokeStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      SmokeStep::InstallHelper => "install helper package",
      SmokeStep::WriteScript => "write check script",
      SmokeStep::RunChecks => "run checks",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Error)]
#[error("smoke validation failed at '{step}': {source}")]
pub struct ValidationError {
  pub step: SmokeStep,
  #[source]
  pub source: ExecuteError,
}

impl ValidationError {
  fn at(step: SmokeStep) -> impl FnOnce(ExecuteError) -> Self {
    move |source| Self { step, source }
  }
}

/// Install the pinned helper through the interpreter, then run the check
/// script with it.
pub async fn validate(host: &impl Host, interpreter: &Path, work_dir: &Path) -> Result<(), ValidationError> {
  info!(interpreter = ?interpreter, "validating interpreter");

  host
    .run(
      &Cmd::new(interpreter.to_string_lossy())
        .args(["-m", "pip", "install", SMOKE_HELPER_PACKAGE]),
    )
    .await
    .map_err(ValidationError::at(SmokeStep::InstallHelper))?;

  let script = work_dir.join(SMOKE_SCRIPT_NAME);
  host
    .create_dir_all(work_dir)
    .await
    .map_err(ValidationError::at(SmokeStep::WriteScript))?;
  host
    .write(&script, SMOKE_SCRIPT)
    .await
    .map_err(ValidationError::at(SmokeStep::WriteScript))?;

  host
    .run(
      &Cmd::new(interpreter.to_string_lossy())
        .path_arg(&script)
        .arg(SQLITE_VERSION_FLOOR),
    )
    .await
    .map_err(ValidationError::at(SmokeStep::RunChecks))?;

  info!("interpreter passed smoke validation");
  Ok(())
}
