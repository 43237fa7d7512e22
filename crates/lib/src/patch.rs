//! Declarative text patches for third-party build scripts.
//!
//! A [`PatchRule`] replaces one exact substring. Applying it to content that
//! already carries the replacement is a detected no-op; content that carries
//! neither means the upstream script changed and is a hard error.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::environment::LegacyLinkFlags;
use crate::execute::{ExecuteError, Host};

/// Configure call issued by the build plugin for every package it compiles.
pub const PLUGIN_CONFIGURE_CALL: &str = r#"${!PACKAGE_CONFIGURE:-./configure} --prefix="${!PACKAGE_PREFIX_PATH:-$PREFIX_PATH}""#;

#[derive(Debug, Error)]
pub enum PatchError {
  /// The expected text is missing, the upstream script has drifted.
  #[error("patch '{rule}' does not apply to {path}: expected text not found")]
  PatternNotFound { rule: String, path: PathBuf },

  /// The patched text is missing after patching.
  #[error("patch '{rule}' is not in effect in {path}")]
  NotInEffect { rule: String, path: PathBuf },

  #[error(transparent)]
  Execute(#[from] ExecuteError),
}

/// The text a rule expects is absent from the content it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected text of patch '{0}' not found")]
pub struct PatternMissing(pub String);

/// Result of applying a rule to some content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
  Applied(String),
  AlreadyApplied,
}

/// Replace `expected` by `replacement`, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRule {
  pub name: String,
  pub expected: String,
  pub replacement: String,
}

impl PatchRule {
  pub fn new(name: impl Into<String>, expected: impl Into<String>, replacement: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      expected: expected.into(),
      replacement: replacement.into(),
    }
  }

  /// Make the build plugin forward shared-library and search-path settings
  /// to every configure call it issues.
  pub fn forward_link_flags(destination: &Path) -> Self {
    let flags = LegacyLinkFlags::new(destination);
    let replacement = format!(
      r#"{call} --enable-shared LD_RUN_PATH="{path}" LD_LIBRARY_PATH="{path}" LDFLAGS="{ldflags}" CPPFLAGS="{cppflags}""#,
      call = PLUGIN_CONFIGURE_CALL,
      path = flags.library_path,
      ldflags = flags.ldflags,
      cppflags = flags.cppflags,
    );
    Self::new("forward-link-flags", PLUGIN_CONFIGURE_CALL, replacement)
  }

  /// Whether `content` already carries the replacement
  pub fn is_applied(&self, content: &str) -> bool {
    content.contains(&self.replacement)
  }

  /// Apply the rule to `content`
  ///
  /// The replacement may itself contain the expected text, so "already
  /// applied" is checked first.
  pub fn apply(&self, content: &str) -> Result<PatchOutcome, PatternMissing> {
    if self.is_applied(content) {
      return Ok(PatchOutcome::AlreadyApplied);
    }
    if !content.contains(&self.expected) {
      return Err(PatternMissing(self.name.clone()));
    }
    Ok(PatchOutcome::Applied(content.replacen(&self.expected, &self.replacement, 1)))
  }

  /// Apply the rule to the file at `path` in place
  pub async fn apply_to_file(&self, host: &impl Host, path: &Path) -> Result<(), PatchError> {
    let content = host.read_to_string(path).await?;
    match self.apply(&content) {
      Ok(PatchOutcome::Applied(patched)) => {
        host.write(path, &patched).await?;
        info!(rule = %self.name, path = ?path, "patched build script");
        Ok(())
      }
      Ok(PatchOutcome::AlreadyApplied) => {
        debug!(rule = %self.name, path = ?path, "patch already applied");
        Ok(())
      }
      Err(PatternMissing(rule)) => Err(PatchError::PatternNotFound {
        rule,
        path: path.to_path_buf(),
      }),
    }
  }

  /// Confirm the file at `path` carries the patch
  pub async fn verify_file(&self, host: &impl Host, path: &Path) -> Result<(), PatchError> {
    let content = host.read_to_string(path).await?;
    if self.is_applied(&content) {
      Ok(())
    } else {
      Err(PatchError::NotInEffect {
        rule: self.name.clone(),
        path: path.to_path_buf(),
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::FakeHost;

  const SCRIPT: &str = r#"build_package_standard_build() {
  local package_name="$1"
  ( # shellcheck disable=SC2086
    ${!PACKAGE_CONFIGURE:-./configure} --prefix="${!PACKAGE_PREFIX_PATH:-$PREFIX_PATH}" \
      "${!PACKAGE_CONFIGURE_OPTS_ARRAY}" $CONFIGURE_OPTS ${!PACKAGE_CONFIGURE_OPTS} || return 1
  ) >&4 2>&1
}
"#;

  fn rule() -> PatchRule {
    PatchRule::forward_link_flags(Path::new("/opt/py/base_python-3.11.6-1-centos7"))
  }

  #[test]
  fn applies_single_substitution() {
    let PatchOutcome::Applied(patched) = rule().apply(SCRIPT).unwrap() else {
      panic!("expected the patch to apply");
    };
    assert!(patched.contains("--enable-shared"));
    assert!(patched.contains(r#"LD_RUN_PATH="/opt/py/base_python-3.11.6-1-centos7/lib:/usr/lib64/openssl11""#));
    assert!(patched.contains(r#"CPPFLAGS="-I/opt/py/base_python-3.11.6-1-centos7/include -I/usr/include/openssl11""#));
    assert!(patched.contains("$CONFIGURE_OPTS ${!PACKAGE_CONFIGURE_OPTS}"));
    assert_eq!(patched.matches("--enable-shared").count(), 1);
  }

  #[test]
  fn reapplying_is_a_detected_no_op() {
    let rule = rule();
    let PatchOutcome::Applied(once) = rule.apply(SCRIPT).unwrap() else {
      panic!("expected the patch to apply");
    };
    assert_eq!(rule.apply(&once).unwrap(), PatchOutcome::AlreadyApplied);
    assert!(rule.is_applied(&once));
  }

  #[test]
  fn drifted_script_is_rejected() {
    let drifted = SCRIPT.replace("./configure", "./configure.sh");
    assert_eq!(rule().apply(&drifted), Err(PatternMissing("forward-link-flags".to_string())));
  }

  #[tokio::test]
  async fn file_patch_is_idempotent() {
    let path = Path::new("/tmp/pyenv/plugins/python-build/bin/python-build");
    let host = FakeHost::new().with_file(path, SCRIPT);

    rule().apply_to_file(&host, path).await.unwrap();
    let once = host.file(path).unwrap();
    rule().apply_to_file(&host, path).await.unwrap();
    assert_eq!(host.file(path).unwrap(), once);

    rule().verify_file(&host, path).await.unwrap();
  }

  #[tokio::test]
  async fn missing_pattern_in_file_is_named_error() {
    let path = Path::new("/tmp/python-build");
    let host = FakeHost::new().with_file(path, "#!/bin/bash\necho nothing to see\n");
    let err = rule().apply_to_file(&host, path).await.unwrap_err();
    assert!(matches!(err, PatchError::PatternNotFound { .. }));
    assert_eq!(host.file(path).unwrap(), "#!/bin/bash\necho nothing to see\n");
  }

  #[tokio::test]
  async fn verify_rejects_unpatched_file() {
    let path = Path::new("/tmp/python-build");
    let host = FakeHost::new().with_file(path, SCRIPT);
    let err = rule().verify_file(&host, path).await.unwrap_err();
    assert!(matches!(err, PatchError::NotInEffect { .. }));
  }
}
