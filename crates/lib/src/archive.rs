//! Packaging the interpreter tree into a `.tar.gz`.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::execute::{Cmd, ExecuteError, Host};
use crate::target::BuildTarget;

#[derive(Debug, Error)]
pub enum ArchiveError {
  /// The tree is not a direct child of the root it is archived relative to.
  #[error("{destination} is not a direct child of {root}")]
  OutsideRoot { destination: PathBuf, root: PathBuf },

  #[error(transparent)]
  Execute(#[from] ExecuteError),
}

/// What goes into the archive, and where the archive goes.
///
/// `member` is a single path component, so the archive always extracts to
/// exactly one top-level directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSpec {
  pub source_root: PathBuf,
  pub member: PathBuf,
  pub output_dir: PathBuf,
  pub output_filename: String,
}

impl ArchiveSpec {
  pub fn new(target: &BuildTarget, destination: &Path, root: &Path, output_dir: &Path) -> Result<Self, ArchiveError> {
    let outside = || ArchiveError::OutsideRoot {
      destination: destination.to_path_buf(),
      root: root.to_path_buf(),
    };

    let member = destination.strip_prefix(root).map_err(|_| outside())?;
    let mut components = member.components();
    match (components.next(), components.next()) {
      (Some(Component::Normal(name)), None) => Ok(Self {
        source_root: root.to_path_buf(),
        member: PathBuf::from(name),
        output_dir: output_dir.to_path_buf(),
        output_filename: target.archive_filename(),
      }),
      _ => Err(outside()),
    }
  }

  pub fn output_path(&self) -> PathBuf {
    self.output_dir.join(&self.output_filename)
  }

  fn tar(&self, compat: bool) -> Cmd {
    let cmd = Cmd::new("tar");
    let cmd = if compat { cmd.arg("--force-local") } else { cmd };
    cmd
      .arg("-czf")
      .path_arg(&self.output_path())
      .arg("-C")
      .path_arg(&self.source_root)
      .path_arg(&self.member)
  }
}

/// Write the archive described by `spec`, returning its path.
///
/// On Windows a failed attempt is retried once with `--force-local`, which
/// stops tar from reading a drive letter as a remote host. Any failure
/// triggers the retry, not only that one.
pub async fn create_archive(host: &impl Host, spec: &ArchiveSpec, windows: bool) -> Result<PathBuf, ArchiveError> {
  host.create_dir_all(&spec.output_dir).await?;

  match host.run(&spec.tar(false)).await {
    Ok(()) => {}
    Err(err) if windows => {
      warn!(error = %err, "archive attempt failed, retrying with --force-local");
      host.run(&spec.tar(true)).await?;
    }
    Err(err) => return Err(err.into()),
  }

  let output = spec.output_path();
  info!(archive = ?output, "archive written");
  Ok(output)
}
