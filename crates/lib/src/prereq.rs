//! Native prerequisites.
//!
//! Brings the machine's system libraries up to what the interpreter build
//! needs. Any package-manager failure aborts; nothing already installed is
//! rolled back.

use std::path::Path;

use tracing::{info, warn};

use crate::environment::BuildEnvironment;
use crate::execute::{Cmd, ExecuteError, Host};
use crate::package::sqlite;
use crate::platform::{BuildVariant, PlatformProfile};
use crate::settings::Settings;

const BREW_PACKAGES: &[&str] = &["openssl", "readline", "sqlite3", "xz", "zlib", "tcl-tk"];

const APT_PACKAGES: &[&str] = &[
  "build-essential",
  "curl",
  "git",
  "libbz2-dev",
  "libffi-dev",
  "liblzma-dev",
  "libncursesw5-dev",
  "libreadline-dev",
  "libsqlite3-dev",
  "libssl-dev",
  "libxml2-dev",
  "libxmlsec1-dev",
  "tk-dev",
  "xz-utils",
  "zlib1g-dev",
];

const YUM_PACKAGES: &[&str] = &[
  "bzip2",
  "bzip2-devel",
  "gcc",
  "git",
  "libffi-devel",
  "make",
  "readline-devel",
  "sqlite",
  "sqlite-devel",
  "tar",
  "tk-devel",
  "wget",
  "xz-devel",
  "zlib-devel",
];

/// The legacy generation gets a newer OpenSSL from EPEL instead of the native one.
const YUM_LEGACY_PACKAGES: &[&str] = &["openssl11-devel"];

const YUM_MODERN_PACKAGES: &[&str] = &["openssl-devel"];

/// Native package-manager invocations for a variant, in order
pub fn package_commands(variant: BuildVariant, elevate: bool) -> Vec<Cmd> {
  match variant {
    BuildVariant::MacOs => vec![
      Cmd::new("brew").arg("update"),
      Cmd::new("brew").arg("install").args(BREW_PACKAGES.iter().copied()),
    ],
    BuildVariant::Debian => vec![
      Cmd::privileged(elevate, "apt-get").arg("update"),
      Cmd::privileged(elevate, "apt-get")
        .args(["install", "-y"])
        .args(APT_PACKAGES.iter().copied()),
    ],
    BuildVariant::RedHatLegacy => vec![
      Cmd::privileged(elevate, "yum").args(["-y", "update"]),
      Cmd::privileged(elevate, "yum").args(["-y", "install", "epel-release"]),
      Cmd::privileged(elevate, "yum")
        .args(["-y", "install"])
        .args(YUM_PACKAGES.iter().chain(YUM_LEGACY_PACKAGES).copied()),
    ],
    BuildVariant::RedHat => vec![
      Cmd::privileged(elevate, "yum").args(["-y", "update"]),
      Cmd::privileged(elevate, "yum")
        .args(["-y", "install"])
        .args(YUM_PACKAGES.iter().chain(YUM_MODERN_PACKAGES).copied()),
    ],
    BuildVariant::Windows | BuildVariant::GenericLinux => Vec::new(),
  }
}

/// Install native prerequisites and, where the native SQLite is too old, a
/// private SQLite inside `destination`.
pub async fn ensure_prerequisites(
  host: &impl Host,
  profile: &PlatformProfile,
  settings: &Settings,
  destination: &Path,
  seed: &BuildEnvironment,
) -> Result<(), ExecuteError> {
  let variant = profile.variant();

  if variant == BuildVariant::GenericLinux {
    warn!("no known package manager for this distribution, assuming prerequisites are present");
  }

  for cmd in package_commands(variant, settings.elevate) {
    host.run(&cmd).await?;
  }

  if profile.needs_private_sqlite() {
    prepare_destination(host, settings, destination).await?;
    host.create_dir_all(&settings.work_dir).await?;
    sqlite::recipe(destination).build(host, &settings.work_dir, seed).await?;
  }

  info!(%profile, "prerequisites ready");
  Ok(())
}

/// Create the destination ahead of the build tool and hand it to the
/// invoking user, so later unprivileged installs can write into it.
async fn prepare_destination(host: &impl Host, settings: &Settings, destination: &Path) -> Result<(), ExecuteError> {
  host
    .run(&Cmd::privileged(settings.elevate, "mkdir").arg("-p").path_arg(destination))
    .await?;

  if let Some(owner) = &settings.owner {
    host
      .run(
        &Cmd::privileged(settings.elevate, "chown")
          .arg("-R")
          .arg(owner)
          .path_arg(destination),
      )
      .await?;
  }

  Ok(())
}
