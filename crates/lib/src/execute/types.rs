//! Command values and execution errors.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::environment::BuildEnvironment;

/// Errors raised by external effects.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// Command exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// Command could not be started at all.
  #[error("failed to start command '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// HTTP download failed.
  #[error("fetch failed for {url}: {message}")]
  FetchFailed { url: String, message: String },

  /// I/O error during execution.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl ExecuteError {
  /// Exit code of the failed external command, if one ran to completion
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      ExecuteError::CmdFailed { code, .. } => *code,
      _ => None,
    }
  }
}

/// A single external command invocation.
///
/// When an environment is attached the child receives exactly that
/// environment; otherwise it inherits the parent's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
  program: String,
  args: Vec<String>,
  cwd: Option<PathBuf>,
  env: Option<BuildEnvironment>,
}

impl Cmd {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: None,
    }
  }

  /// A command that needs root, run through `sudo` when `elevate` is set
  pub fn privileged(elevate: bool, program: impl Into<String>) -> Self {
    if elevate {
      Self::new("sudo").arg(program.into())
    } else {
      Self::new(program)
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Append a path argument
  pub fn path_arg(self, path: &Path) -> Self {
    self.arg(path.to_string_lossy().into_owned())
  }

  pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn env(mut self, env: BuildEnvironment) -> Self {
    self.env = Some(env);
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn get_args(&self) -> &[String] {
    &self.args
  }

  pub fn get_cwd(&self) -> Option<&Path> {
    self.cwd.as_deref()
  }

  pub fn get_env(&self) -> Option<&BuildEnvironment> {
    self.env.as_ref()
  }
}

impl fmt::Display for Cmd {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        write!(f, " '{}'", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_quotes_arguments_with_spaces() {
    let cmd = Cmd::new("tar").args(["-czf", "out dir/a.tar.gz"]);
    assert_eq!(cmd.to_string(), "tar -czf 'out dir/a.tar.gz'");
  }

  #[test]
  fn privileged_prefixes_sudo_only_when_elevating() {
    assert_eq!(Cmd::privileged(true, "yum").arg("-y").to_string(), "sudo yum -y");
    assert_eq!(Cmd::privileged(false, "yum").arg("-y").to_string(), "yum -y");
  }

  #[test]
  fn exit_code_only_for_completed_commands() {
    let failed = ExecuteError::CmdFailed {
      cmd: "false".into(),
      code: Some(3),
    };
    assert_eq!(failed.exit_code(), Some(3));
    let io = ExecuteError::Io(std::io::Error::other("boom"));
    assert_eq!(io.exit_code(), None);
  }
}
