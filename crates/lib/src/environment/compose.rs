use std::path::Path;

use crate::consts::{LEGACY_OPENSSL_INCLUDE, LEGACY_OPENSSL_LIB, MACOS_DEPLOYMENT_TARGET, MACOS_TOOLKIT_PREFIX};
use crate::platform::paths::build_plugin_bin_dir;
use crate::platform::{BuildVariant, PlatformProfile};

use super::BuildEnvironment;

/// Compose the environment the build tool runs with.
///
/// Pure in its inputs: `seed` is the inherited environment and is never read
/// from the process here. Windows builds from an installer and gets the seed
/// back unchanged.
pub fn compose(profile: &PlatformProfile, destination: &Path, seed: &BuildEnvironment) -> BuildEnvironment {
  let mut env = seed.clone();

  match profile.variant() {
    BuildVariant::Windows => {}
    BuildVariant::MacOs => overlay_macos(&mut env),
    BuildVariant::RedHatLegacy => {
      seed_plugin_path(&mut env);
      let flags = LegacyLinkFlags::new(destination);
      env.append_flags("LDFLAGS", &[flags.ldflags.as_str()]);
      env.append_flags("CPPFLAGS", &[flags.cppflags.as_str()]);
    }
    BuildVariant::Debian | BuildVariant::RedHat | BuildVariant::GenericLinux => seed_plugin_path(&mut env),
  }

  env
}

fn seed_plugin_path(env: &mut BuildEnvironment) {
  let bin = build_plugin_bin_dir().to_string_lossy().into_owned();
  env.prepend_path("PATH", &[bin.as_str()]);
}

fn overlay_macos(env: &mut BuildEnvironment) {
  let bin = format!("{}/bin", MACOS_TOOLKIT_PREFIX);
  let include = format!("{}/include", MACOS_TOOLKIT_PREFIX);
  let lib = format!("{}/lib", MACOS_TOOLKIT_PREFIX);
  let pkgconfig = format!("{}/pkgconfig", lib);
  let configure_opts = [
    format!("--with-tcltk-includes='-I{}'", include),
    format!("--with-tcltk-libs='-L{} -ltcl8.6 -ltk8.6'", lib),
    format!("MACOSX_DEPLOYMENT_TARGET={}", MACOS_DEPLOYMENT_TARGET),
  ];

  env.prepend_path("PATH", &[bin.as_str()]);
  env.set("MACOSX_DEPLOYMENT_TARGET", MACOS_DEPLOYMENT_TARGET);
  env.append_flags("LDFLAGS", &[format!("-L{}", lib).as_str()]);
  env.append_flags("CPPFLAGS", &[format!("-I{}", include).as_str()]);
  env.prepend_path("PKG_CONFIG_PATH", &[pkgconfig.as_str()]);
  env.append_flags("PYTHON_CONFIGURE_OPTS", &configure_opts.each_ref().map(String::as_str));
}

/// Search paths for the legacy Red-Hat generation: the destination's own
/// lib/include (private SQLite) and the versioned OpenSSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyLinkFlags {
  /// Runtime library search path, `:` separated.
  pub library_path: String,
  pub ldflags: String,
  pub cppflags: String,
}

impl LegacyLinkFlags {
  pub fn new(destination: &Path) -> Self {
    let lib = destination.join("lib").to_string_lossy().into_owned();
    let include = destination.join("include").to_string_lossy().into_owned();

    Self {
      library_path: format!("{}:{}", lib, LEGACY_OPENSSL_LIB),
      ldflags: format!(
        "-Wl,-rpath,{lib} -L{lib} -Wl,-rpath,{ssl} -L{ssl}",
        lib = lib,
        ssl = LEGACY_OPENSSL_LIB
      ),
      cppflags: format!("-I{} -I{}", include, LEGACY_OPENSSL_INCLUDE),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::LinuxDistro;

  const DEST: &str = "/opt/ccdc/third-party/python/base_python-3.11.6-1-centos7";

  fn seed() -> BuildEnvironment {
    [("PATH", "/usr/local/bin:/usr/bin"), ("HOME", "/home/ci"), ("LDFLAGS", "-L/mine")]
      .into_iter()
      .collect()
  }

  fn all_profiles() -> Vec<PlatformProfile> {
    vec![
      PlatformProfile::macos(),
      PlatformProfile::windows(),
      PlatformProfile::linux(LinuxDistro::None, None),
      PlatformProfile::linux(LinuxDistro::DebianLike, Some("22.04".into())),
      PlatformProfile::linux(LinuxDistro::RedHatLike, Some("7".into())),
      PlatformProfile::linux(LinuxDistro::RedHatLike, Some("8".into())),
    ]
  }

  #[test]
  fn compose_is_deterministic() {
    for profile in all_profiles() {
      let a = compose(&profile, Path::new(DEST), &seed());
      let b = compose(&profile, Path::new(DEST), &seed());
      assert_eq!(a, b, "{profile}");
    }
  }

  #[test]
  fn inherited_path_survives_as_contiguous_substring() {
    for profile in all_profiles() {
      let env = compose(&profile, Path::new(DEST), &seed());
      let path = env.get("PATH").unwrap();
      assert!(path.contains("/usr/local/bin:/usr/bin"), "{profile}: {path}");
      assert!(path.ends_with("/usr/local/bin:/usr/bin"), "{profile}: {path}");
    }
  }

  #[test]
  fn inherited_variables_are_kept() {
    for profile in all_profiles() {
      let env = compose(&profile, Path::new(DEST), &seed());
      assert_eq!(env.get("HOME"), Some("/home/ci"));
      assert!(env.get("LDFLAGS").unwrap().starts_with("-L/mine"));
    }
  }

  #[test]
  fn windows_gets_seed_back() {
    assert_eq!(compose(&PlatformProfile::windows(), Path::new(DEST), &seed()), seed());
  }

  #[test]
  fn debian_only_seeds_plugin_path() {
    let profile = PlatformProfile::linux(LinuxDistro::DebianLike, Some("22.04".into()));
    let env = compose(&profile, Path::new(DEST), &seed());
    let expected = format!("{}:/usr/local/bin:/usr/bin", build_plugin_bin_dir().display());
    assert_eq!(env.get("PATH"), Some(expected.as_str()));
    assert_eq!(env.get("LDFLAGS"), Some("-L/mine"));
    assert_eq!(env.get("CPPFLAGS"), None);
    assert_eq!(env.len(), seed().len());
  }

  #[test]
  fn macos_points_at_toolkit() {
    let env = compose(&PlatformProfile::macos(), Path::new(DEST), &seed());
    assert!(env.get("PATH").unwrap().starts_with("/usr/local/opt/tcl-tk/bin:"));
    assert_eq!(env.get("MACOSX_DEPLOYMENT_TARGET"), Some("10.15"));
    assert_eq!(env.get("LDFLAGS"), Some("-L/mine -L/usr/local/opt/tcl-tk/lib"));
    assert_eq!(env.get("CPPFLAGS"), Some("-I/usr/local/opt/tcl-tk/include"));
    assert_eq!(env.get("PKG_CONFIG_PATH"), Some("/usr/local/opt/tcl-tk/lib/pkgconfig"));

    let opts = env.get("PYTHON_CONFIGURE_OPTS").unwrap();
    assert!(opts.contains("--with-tcltk-includes='-I/usr/local/opt/tcl-tk/include'"));
    assert!(opts.contains("--with-tcltk-libs='-L/usr/local/opt/tcl-tk/lib"));
    assert!(opts.contains("MACOSX_DEPLOYMENT_TARGET=10.15"));
  }

  #[test]
  fn legacy_redhat_adds_destination_and_openssl_paths() {
    let profile = PlatformProfile::linux(LinuxDistro::RedHatLike, Some("7".into()));
    let env = compose(&profile, Path::new(DEST), &seed());

    let ldflags = env.get("LDFLAGS").unwrap();
    assert!(ldflags.starts_with("-L/mine "));
    assert!(ldflags.contains(&format!("-Wl,-rpath,{DEST}/lib")));
    assert!(ldflags.contains(&format!("-L{DEST}/lib")));
    assert!(ldflags.contains("-L/usr/lib64/openssl11"));

    let cppflags = env.get("CPPFLAGS").unwrap();
    assert_eq!(cppflags, format!("-I{DEST}/include -I/usr/include/openssl11"));
  }

  #[test]
  fn newer_redhat_has_no_flag_overlay() {
    let profile = PlatformProfile::linux(LinuxDistro::RedHatLike, Some("8".into()));
    let env = compose(&profile, Path::new(DEST), &seed());
    assert_eq!(env.get("LDFLAGS"), Some("-L/mine"));
    assert_eq!(env.get("CPPFLAGS"), None);
  }
}
