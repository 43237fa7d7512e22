//! Cmd action implementation.
//!
//! Commands run with inherited stdio so the external tool's own diagnostics
//! reach the operator unchanged.

use tokio::process::Command;
use tracing::{debug, info};

use crate::execute::types::{Cmd, ExecuteError};

/// Execute a command and wait for it.
///
/// If the command carries a [`BuildEnvironment`](crate::environment::BuildEnvironment)
/// the child environment is cleared and replaced by it.
pub async fn execute_cmd(cmd: &Cmd) -> Result<(), ExecuteError> {
  info!(cmd = %cmd, "executing command");

  let mut command = Command::new(cmd.program());
  command.args(cmd.get_args());

  if let Some(dir) = cmd.get_cwd() {
    command.current_dir(dir);
  }

  if let Some(env) = cmd.get_env() {
    command.env_clear();
    for (key, value) in env.iter() {
      command.env(key, value);
    }
  }

  debug!(cwd = ?cmd.get_cwd(), isolated_env = cmd.get_env().is_some(), "spawning process");

  let status = command.status().await.map_err(|source| ExecuteError::Spawn {
    cmd: cmd.to_string(),
    source,
  })?;

  if !status.success() {
    return Err(ExecuteError::CmdFailed {
      cmd: cmd.to_string(),
      code: status.code(),
    });
  }

  Ok(())
}
