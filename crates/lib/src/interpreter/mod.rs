//! Producing the interpreter tree at its destination.
//!
//! POSIX hosts compile it with the bootstrapped build tool. Windows runs the
//! official installer instead, see [`installer`].

pub mod installer;

use std::path::Path;

use tracing::info;

use crate::bootstrap::BuildTool;
use crate::environment::BuildEnvironment;
use crate::execute::{Cmd, Host};
use crate::patch::PatchError;

/// Compile `version` into `destination` with the build tool.
///
/// A patched tool is verified first and then invoked directly with verbose
/// output. A failed build is not retried.
pub async fn build_interpreter(
  host: &impl Host,
  tool: &BuildTool,
  version: &str,
  destination: &Path,
  env: BuildEnvironment,
) -> Result<(), PatchError> {
  let mut cmd = Cmd::new(tool.program.to_string_lossy());

  if let Some(rule) = &tool.patch {
    rule.verify_file(host, &tool.program).await?;
    cmd = cmd.arg("--verbose");
  }

  let cmd = cmd.arg(version).path_arg(destination).env(env);
  info!(cmd = %cmd, "building interpreter");
  host.run(&cmd).await?;
  Ok(())
}
