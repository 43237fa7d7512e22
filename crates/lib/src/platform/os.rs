use std::fmt;

use serde::Serialize;

/// Operating system families the pipeline knows how to build on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
  MacOs,
  Windows,
  Linux,
}

impl OsFamily {
  /// Map a `std::env::consts::OS` style identifier to a family
  ///
  /// Returns `None` for anything that is not macOS, Windows or Linux.
  pub fn from_os_str(os: &str) -> Option<Self> {
    match os {
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      "linux" => Some(Self::Linux),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this family
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MacOs => "macos",
      Self::Windows => "windows",
      Self::Linux => "linux",
    }
  }
}

impl fmt::Display for OsFamily {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Linux distribution families, `None` on every other OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinuxDistro {
  None,
  DebianLike,
  RedHatLike,
}

impl LinuxDistro {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::None => "none",
      Self::DebianLike => "debian-like",
      Self::RedHatLike => "redhat-like",
    }
  }
}

impl fmt::Display for LinuxDistro {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_supported_os_identifiers() {
    assert_eq!(OsFamily::from_os_str("macos"), Some(OsFamily::MacOs));
    assert_eq!(OsFamily::from_os_str("windows"), Some(OsFamily::Windows));
    assert_eq!(OsFamily::from_os_str("linux"), Some(OsFamily::Linux));
    assert_eq!(OsFamily::from_os_str("freebsd"), None);
  }

  #[test]
  fn current_os_is_supported() {
    // CI only runs on the three supported families
    assert!(OsFamily::from_os_str(std::env::consts::OS).is_some());
  }
}
