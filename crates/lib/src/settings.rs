//! Run settings resolved from the ambient environment.
//!
//! Every environment variable the pipeline consumes is read here, once, so
//! the rest of the crate works on plain values.

use std::path::PathBuf;

use serde::Serialize;

use crate::consts::{ARTIFACT_DIR_VAR, DEV_BUILD_SENTINEL, PACKAGE_NAME, PACKAGES_DIR, RUN_NUMBER_VAR};
use crate::platform::PlatformProfile;
use crate::platform::paths::root_dir;

/// Inputs of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
  pub package_name: String,
  pub python_version: String,
  /// CI run number, or the dev-build sentinel outside CI.
  pub run_identifier: String,
  pub root_dir: PathBuf,
  /// Where the final archive is written.
  pub artifact_dir: PathBuf,
  /// Scratch space for downloads, auxiliary builds and the smoke script.
  pub work_dir: PathBuf,
  /// Prefix privileged commands with `sudo`.
  pub elevate: bool,
  /// `uid:gid` that should own directories created with elevation.
  pub owner: Option<String>,
}

impl Settings {
  /// Resolve settings for `profile` from the process environment
  pub fn from_env(profile: &PlatformProfile, python_version: &str) -> Self {
    let root_dir = root_dir(profile);
    let run_identifier = non_empty_var(RUN_NUMBER_VAR).unwrap_or_else(|| DEV_BUILD_SENTINEL.to_string());
    let artifact_dir = non_empty_var(ARTIFACT_DIR_VAR)
      .map(PathBuf::from)
      .unwrap_or_else(|| root_dir.join(PACKAGES_DIR));
    let (elevate, owner) = privileges();

    Self {
      package_name: PACKAGE_NAME.to_string(),
      python_version: python_version.to_string(),
      run_identifier,
      root_dir,
      artifact_dir,
      work_dir: std::env::temp_dir().join("basepy"),
      elevate,
      owner,
    }
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(unix)]
fn privileges() -> (bool, Option<String>) {
  let uid = rustix::process::getuid();
  let gid = rustix::process::getgid();
  (!uid.is_root(), Some(format!("{}:{}", uid.as_raw(), gid.as_raw())))
}

#[cfg(not(unix))]
fn privileges() -> (bool, Option<String>) {
  (false, None)
}
