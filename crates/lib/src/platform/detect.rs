//! Machine inspection for platform classification.
//!
//! Classification only ever reads: marker files, `/etc/os-release` and the
//! output of release-query commands. Nothing is cached, so every call
//! re-inspects the machine.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use super::{LinuxDistro, OsFamily, PlatformProfile};

/// Debian-family marker file.
const DEBIAN_MARKER: &str = "/etc/debian_version";

/// Red-Hat-family marker file.
const REDHAT_MARKER: &str = "/etc/redhat-release";

const OS_RELEASE: &str = "/etc/os-release";

/// Read-only view of the machine used by [`classify`].
pub trait SystemProbe {
  /// `std::env::consts::OS` style identifier.
  fn os(&self) -> &str;

  fn exists(&self, path: &Path) -> bool;

  /// Run a query command and return its trimmed stdout, `None` if it could
  /// not be run or exited non-zero.
  fn query(&self, program: &str, args: &[&str]) -> Option<String>;

  fn read_file(&self, path: &Path) -> Option<String>;
}

/// Probe backed by the executing machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl SystemProbe for HostProbe {
  fn os(&self) -> &str {
    std::env::consts::OS
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn query(&self, program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
      debug!(program, ?args, code = ?output.status.code(), "query command failed");
      return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn read_file(&self, path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
  }
}

/// Classify the machine seen through `probe`.
///
/// Linux without any recognised marker yields a generic Linux profile
/// rather than an error.
pub fn classify(probe: &impl SystemProbe) -> PlatformProfile {
  match OsFamily::from_os_str(probe.os()) {
    Some(OsFamily::MacOs) => PlatformProfile::macos(),
    Some(OsFamily::Windows) => PlatformProfile::windows(),
    Some(OsFamily::Linux) => classify_linux(probe),
    None => {
      warn!(os = probe.os(), "unrecognised operating system, using generic linux path");
      PlatformProfile::linux(LinuxDistro::None, None)
    }
  }
}

fn classify_linux(probe: &impl SystemProbe) -> PlatformProfile {
  if probe.exists(Path::new(DEBIAN_MARKER)) || distro_id_is_debian(probe) {
    return PlatformProfile::linux(LinuxDistro::DebianLike, debian_version(probe));
  }

  if probe.exists(Path::new(REDHAT_MARKER)) {
    return PlatformProfile::linux(LinuxDistro::RedHatLike, redhat_version(probe));
  }

  warn!("no distribution marker found, using generic linux path");
  PlatformProfile::linux(LinuxDistro::None, None)
}

fn distro_id_is_debian(probe: &impl SystemProbe) -> bool {
  probe
    .query("lsb_release", &["-is"])
    .map(|id| {
      let id = id.to_ascii_lowercase();
      id.contains("ubuntu") || id.contains("debian")
    })
    .unwrap_or(false)
}

fn debian_version(probe: &impl SystemProbe) -> Option<String> {
  probe
    .query("lsb_release", &["-rs"])
    .filter(|v| !v.is_empty())
    .or_else(|| probe.read_file(Path::new(OS_RELEASE)).and_then(|s| os_release_version(&s)))
}

fn redhat_version(probe: &impl SystemProbe) -> Option<String> {
  // rpm echoes the macro back unexpanded when it is not defined
  probe
    .query("rpm", &["-E", "%{rhel}"])
    .filter(|v| !v.is_empty() && !v.starts_with('%'))
}

/// Extract `VERSION_ID` from os-release content.
fn os_release_version(content: &str) -> Option<String> {
  content
    .lines()
    .find_map(|line| line.strip_prefix("VERSION_ID="))
    .map(|v| v.trim().trim_matches('"').to_string())
    .filter(|v| !v.is_empty())
}
