//! Version-manager bootstrap.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::{BUILD_PLUGIN, BUILD_TOOL_CHECKOUT, BUILD_TOOL_REPO};
use crate::execute::{Cmd, Host};
use crate::patch::{PatchError, PatchRule};
use crate::platform::paths::build_plugin_script;
use crate::platform::{BuildVariant, PlatformProfile};

/// A ready build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTool {
  /// Executable invoked to build an interpreter.
  pub program: PathBuf,
  /// Patch the program carries, checked again right before it is used.
  pub patch: Option<PatchRule>,
}

/// Make the build tool and its plugin available.
///
/// macOS installs it through Homebrew. Linux discards any previous checkout
/// and clones a fresh one, patching the plugin on the legacy Red-Hat
/// generation. Windows never reaches this stage.
pub async fn ensure_build_tool(
  host: &impl Host,
  profile: &PlatformProfile,
  destination: &Path,
) -> Result<BuildTool, PatchError> {
  let tool = match profile.variant() {
    BuildVariant::MacOs => {
      host.run(&Cmd::new("brew").args(["install", "pyenv"])).await?;
      BuildTool {
        program: PathBuf::from(BUILD_PLUGIN),
        patch: None,
      }
    }
    variant => {
      let checkout = Path::new(BUILD_TOOL_CHECKOUT);
      host.remove_dir_all(checkout).await?;
      host
        .run(&Cmd::new("git").arg("clone").arg(BUILD_TOOL_REPO).path_arg(checkout))
        .await?;

      let script = build_plugin_script();
      let patch = if variant == BuildVariant::RedHatLegacy {
        let rule = PatchRule::forward_link_flags(destination);
        rule.apply_to_file(host, &script).await?;
        Some(rule)
      } else {
        None
      };

      BuildTool { program: script, patch }
    }
  };

  info!(program = ?tool.program, patched = tool.patch.is_some(), "build tool ready");
  Ok(tool)
}
