//! Platform classification.
//!
//! A [`PlatformProfile`] is derived once per run from the executing machine
//! and never mutated afterwards. Every platform-conditioned stage branches on
//! its [`BuildVariant`] rather than on the raw fields.

pub mod detect;
pub mod os;
pub mod paths;

use std::fmt;

use serde::Serialize;

use crate::consts::LEGACY_REDHAT_RELEASE;

pub use detect::{HostProbe, SystemProbe, classify};
pub use os::{LinuxDistro, OsFamily};

/// Operating system, Linux distribution family and distribution version.
///
/// `linux_distro` is always [`LinuxDistro::None`] unless the family is Linux;
/// the constructors are the only way to build a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlatformProfile {
  os_family: OsFamily,
  linux_distro: LinuxDistro,
  distro_version: Option<String>,
}

/// Exhaustive set of build paths a profile can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildVariant {
  MacOs,
  /// Installer-based, no build from source.
  Windows,
  Debian,
  /// The Red-Hat generation whose native SQLite is too old and whose build
  /// plugin must be patched to forward linker flags.
  RedHatLegacy,
  RedHat,
  /// Linux without a recognised distribution marker.
  GenericLinux,
}

impl PlatformProfile {
  pub fn macos() -> Self {
    Self {
      os_family: OsFamily::MacOs,
      linux_distro: LinuxDistro::None,
      distro_version: None,
    }
  }

  pub fn windows() -> Self {
    Self {
      os_family: OsFamily::Windows,
      linux_distro: LinuxDistro::None,
      distro_version: None,
    }
  }

  /// A Linux profile. A version without a known distribution is dropped.
  pub fn linux(distro: LinuxDistro, version: Option<String>) -> Self {
    let distro_version = match distro {
      LinuxDistro::None => None,
      _ => version.filter(|v| !v.is_empty()),
    };
    Self {
      os_family: OsFamily::Linux,
      linux_distro: distro,
      distro_version,
    }
  }

  pub fn os_family(&self) -> OsFamily {
    self.os_family
  }

  pub fn linux_distro(&self) -> LinuxDistro {
    self.linux_distro
  }

  pub fn distro_version(&self) -> Option<&str> {
    self.distro_version.as_deref()
  }

  pub fn is_windows(&self) -> bool {
    self.os_family == OsFamily::Windows
  }

  /// Select the build path for this profile
  pub fn variant(&self) -> BuildVariant {
    match (self.os_family, self.linux_distro) {
      (OsFamily::MacOs, _) => BuildVariant::MacOs,
      (OsFamily::Windows, _) => BuildVariant::Windows,
      (OsFamily::Linux, LinuxDistro::DebianLike) => BuildVariant::Debian,
      (OsFamily::Linux, LinuxDistro::RedHatLike) if self.major_version() == Some(LEGACY_REDHAT_RELEASE) => {
        BuildVariant::RedHatLegacy
      }
      (OsFamily::Linux, LinuxDistro::RedHatLike) => BuildVariant::RedHat,
      (OsFamily::Linux, LinuxDistro::None) => BuildVariant::GenericLinux,
    }
  }

  /// Whether the native SQLite is too old and a private one must be built
  pub fn needs_private_sqlite(&self) -> bool {
    self.variant() == BuildVariant::RedHatLegacy
  }

  /// Canonical platform tag used in artifact names (e.g. "ubuntu22.04")
  pub fn tag(&self) -> String {
    let (name, version) = match self.variant() {
      BuildVariant::MacOs => return "macos".to_string(),
      BuildVariant::Windows => return "windows".to_string(),
      BuildVariant::GenericLinux => return "linux".to_string(),
      BuildVariant::Debian => ("ubuntu", self.distro_version()),
      BuildVariant::RedHat | BuildVariant::RedHatLegacy => ("centos", self.distro_version()),
    };
    format!("{}{}", name, version.unwrap_or_default())
  }

  fn major_version(&self) -> Option<&str> {
    self.distro_version().and_then(|v| v.split('.').next())
  }
}

impl fmt::Display for PlatformProfile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (&self.linux_distro, &self.distro_version) {
      (LinuxDistro::None, _) => write!(f, "{}", self.os_family),
      (distro, Some(version)) => write!(f, "{} ({} {})", self.os_family, distro, version),
      (distro, None) => write!(f, "{} ({})", self.os_family, distro),
    }
  }
}
