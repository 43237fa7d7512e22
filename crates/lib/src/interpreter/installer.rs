//! Unattended install of the official Windows build.

use std::path::Path;

use tracing::info;

use crate::consts::WINDOWS_INSTALLER_BASE_URL;
use crate::execute::{Cmd, ExecuteError, Host};

/// Installer feature switches: no launcher, docs, shortcuts or test suite;
/// debug binaries and symbols included; everything byte-compiled.
const INSTALLER_OPTIONS: &[&str] = &[
  "/quiet",
  "InstallAllUsers=0",
  "Include_launcher=0",
  "Include_doc=0",
  "Include_debug=1",
  "Include_symbols=1",
  "Shortcuts=0",
  "Include_test=0",
  "CompileAll=1",
];

pub fn installer_url(version: &str) -> String {
  format!("{WINDOWS_INSTALLER_BASE_URL}/{version}/python-{version}-amd64.exe")
}

/// Download the installer for `version` into `work_dir` and install into
/// `destination`.
pub async fn run_installer(
  host: &impl Host,
  version: &str,
  destination: &Path,
  work_dir: &Path,
) -> Result<(), ExecuteError> {
  host.create_dir_all(work_dir).await?;
  let installer = host.download(&installer_url(version), work_dir).await?;

  let cmd = Cmd::new(installer.to_string_lossy())
    .args(INSTALLER_OPTIONS.iter().copied())
    .arg(format!("TargetDir={}", destination.display()));
  info!(cmd = %cmd, "running installer");
  host.run(&cmd).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{Effect, FakeHost};

  #[test]
  fn url_names_exact_version() {
    assert_eq!(
      installer_url("3.11.6"),
      "https://www.python.org/ftp/python/3.11.6/python-3.11.6-amd64.exe"
    );
  }

  #[tokio::test]
  async fn downloads_then_installs_quietly_to_destination() {
    let host = FakeHost::new();
    run_installer(&host, "3.11.6", Path::new("/ccdc/py/dest"), Path::new("/work"))
      .await
      .unwrap();

    assert_eq!(
      host.position(|e| matches!(e, Effect::Download(_))),
      Some(1),
      "download follows work dir creation"
    );
    let cmd = &host.commands()[0];
    assert!(cmd.program().ends_with("python-3.11.6-amd64.exe"));
    let args = cmd.get_args();
    assert_eq!(args[0], "/quiet");
    assert!(args.contains(&"Include_launcher=0".to_string()));
    assert!(args.contains(&"Include_symbols=1".to_string()));
    assert!(args.contains(&"CompileAll=1".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("TargetDir=/ccdc/py/dest"));
  }
}
