//! External effects.
//!
//! Every stage talks to the machine through a [`Host`]: running commands,
//! downloading files and touching the filesystem. [`SystemHost`] performs the
//! effects for real; tests substitute a recording fake.

pub mod actions;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use types::{Cmd, ExecuteError};

/// Side-effecting operations used by the pipeline.
///
/// Every call blocks the pipeline until it completes; there are no
/// timeouts and no cancellation beyond process termination.
#[allow(async_fn_in_trait)]
pub trait Host {
  /// Run a command to completion, failing on a non-zero exit.
  async fn run(&self, cmd: &Cmd) -> Result<(), ExecuteError>;

  /// Download `url` into `dir`, returning the downloaded file.
  async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, ExecuteError>;

  async fn create_dir_all(&self, path: &Path) -> Result<(), ExecuteError>;

  /// Remove a directory tree. A missing directory is not an error.
  async fn remove_dir_all(&self, path: &Path) -> Result<(), ExecuteError>;

  async fn read_to_string(&self, path: &Path) -> Result<String, ExecuteError>;

  async fn write(&self, path: &Path, contents: &str) -> Result<(), ExecuteError>;
}

/// Host that acts on the executing machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl Host for SystemHost {
  async fn run(&self, cmd: &Cmd) -> Result<(), ExecuteError> {
    actions::cmd::execute_cmd(cmd).await
  }

  async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, ExecuteError> {
    actions::fetch::execute_fetch(url, dir).await
  }

  async fn create_dir_all(&self, path: &Path) -> Result<(), ExecuteError> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
  }

  async fn remove_dir_all(&self, path: &Path) -> Result<(), ExecuteError> {
    match tokio::fs::remove_dir_all(path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        debug!(path = ?path, "nothing to remove");
        Ok(())
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn read_to_string(&self, path: &Path) -> Result<String, ExecuteError> {
    Ok(tokio::fs::read_to_string(path).await?)
  }

  async fn write(&self, path: &Path, contents: &str) -> Result<(), ExecuteError> {
    tokio::fs::write(path, contents).await?;
    Ok(())
  }
}
