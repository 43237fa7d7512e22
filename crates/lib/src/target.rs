//! Artifact naming and destination layout.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::platform::PlatformProfile;
use crate::settings::Settings;

/// What is being built, and for which platform.
///
/// The derived [`output_base_name`](BuildTarget::output_base_name) is unique
/// per (version, run identifier, platform), which is what lets concurrent CI
/// runs share one root directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
  pub package_name: String,
  pub runtime_version: String,
  pub run_identifier: String,
  pub profile: PlatformProfile,
}

impl BuildTarget {
  pub fn new(settings: &Settings, profile: &PlatformProfile) -> Self {
    Self {
      package_name: settings.package_name.clone(),
      runtime_version: settings.python_version.clone(),
      run_identifier: settings.run_identifier.clone(),
      profile: profile.clone(),
    }
  }

  /// `<package>-<version>-<run>-<platform tag>`
  pub fn output_base_name(&self) -> String {
    [
      self.package_name.as_str(),
      self.runtime_version.as_str(),
      self.run_identifier.as_str(),
      self.profile.tag().as_str(),
    ]
    .join("-")
  }

  /// `root / output_base_name`
  pub fn destination_path(&self, root: &Path) -> PathBuf {
    root.join(self.output_base_name())
  }

  pub fn archive_filename(&self) -> String {
    format!("{}.tar.gz", self.output_base_name())
  }
}
