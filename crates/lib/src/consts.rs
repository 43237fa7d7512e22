//! Fixed names, paths and versions shared across the pipeline.

/// Package name that prefixes every produced artifact.
pub const PACKAGE_NAME: &str = "base_python";

/// Interpreter version built when none is requested.
pub const DEFAULT_PYTHON_VERSION: &str = "3.11.6";

/// CI variable holding the run/build number.
pub const RUN_NUMBER_VAR: &str = "BUILD_BUILDNUMBER";

/// CI variable holding the artifact staging directory.
pub const ARTIFACT_DIR_VAR: &str = "BUILD_ARTIFACTSTAGINGDIRECTORY";

/// Run token used when no CI run number is available.
pub const DEV_BUILD_SENTINEL: &str = "dont-use-me-dev-build";

/// Subdirectory of the root used for archives outside CI.
pub const PACKAGES_DIR: &str = "packages";

/// Root install directory on POSIX hosts.
pub const POSIX_ROOT_DIR: &str = "/opt/ccdc/third-party/python";

/// Root install directory on Windows hosts.
pub const WINDOWS_ROOT_DIR: &str = r"C:\ccdc\third-party\python";

/// Source repository of the version manager.
pub const BUILD_TOOL_REPO: &str = "https://github.com/pyenv/pyenv.git";

/// Scratch checkout of the version manager on Linux. Discarded on every run.
pub const BUILD_TOOL_CHECKOUT: &str = "/tmp/pyenv";

/// Location of the build plugin's executables inside a checkout.
pub const BUILD_PLUGIN_BIN: &str = "plugins/python-build/bin";

/// Name of the build plugin executable.
pub const BUILD_PLUGIN: &str = "python-build";

/// Tcl/Tk toolkit installed by Homebrew on macOS.
pub const MACOS_TOOLKIT_PREFIX: &str = "/usr/local/opt/tcl-tk";

/// Minimum macOS release the interpreter is built for.
pub const MACOS_DEPLOYMENT_TARGET: &str = "10.15";

/// Versioned OpenSSL headers on the legacy Red-Hat generation.
pub const LEGACY_OPENSSL_INCLUDE: &str = "/usr/include/openssl11";

/// Versioned OpenSSL libraries on the legacy Red-Hat generation.
pub const LEGACY_OPENSSL_LIB: &str = "/usr/lib64/openssl11";

/// Red-Hat major release that needs the plugin patch and a private SQLite.
pub const LEGACY_REDHAT_RELEASE: &str = "7";

/// Helper package installed into the fresh interpreter before the smoke check.
pub const SMOKE_HELPER_PACKAGE: &str = "packaging==23.2";

/// Download location of the official Windows installers.
pub const WINDOWS_INSTALLER_BASE_URL: &str = "https://www.python.org/ftp/python";

/// Oldest SQLite the smoke check accepts in the built interpreter.
pub const SQLITE_VERSION_FLOOR: &str = "3.17.0";
