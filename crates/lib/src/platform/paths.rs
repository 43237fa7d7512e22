use std::path::{Path, PathBuf};

use crate::consts::{BUILD_PLUGIN, BUILD_PLUGIN_BIN, BUILD_TOOL_CHECKOUT, POSIX_ROOT_DIR, WINDOWS_ROOT_DIR};

use super::PlatformProfile;

/// Returns the root install directory for the given platform
pub fn root_dir(profile: &PlatformProfile) -> PathBuf {
  if profile.is_windows() {
    PathBuf::from(WINDOWS_ROOT_DIR)
  } else {
    PathBuf::from(POSIX_ROOT_DIR)
  }
}

/// Returns the interpreter binary inside a built tree
pub fn interpreter_path(profile: &PlatformProfile, destination: &Path) -> PathBuf {
  if profile.is_windows() {
    destination.join("python.exe")
  } else {
    destination.join("bin").join("python")
  }
}

/// Returns the bin directory of the build plugin inside the scratch checkout
pub fn build_plugin_bin_dir() -> PathBuf {
  Path::new(BUILD_TOOL_CHECKOUT).join(BUILD_PLUGIN_BIN)
}

/// Returns the build plugin script inside the scratch checkout
pub fn build_plugin_script() -> PathBuf {
  build_plugin_bin_dir().join(BUILD_PLUGIN)
}
