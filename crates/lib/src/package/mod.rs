//! Auxiliary from-source package builds.
//!
//! A [`PackageRecipe`] describes one autotools package as plain data: where
//! its source comes from and which configure arguments, compiler flags and
//! linker flags it needs. The pipeline only ever calls [`PackageRecipe::build`].

pub mod sqlite;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::environment::BuildEnvironment;
use crate::execute::{Cmd, ExecuteError, Host};

/// Source tarball of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArchive {
  pub url: String,
  /// Directory the tarball extracts to.
  pub top_dir: String,
}

/// Capabilities of a single from-source package build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecipe {
  pub name: String,
  pub version: String,
  pub source: SourceArchive,
  pub prefix: PathBuf,
  pub configure_args: Vec<String>,
  pub cflags: Vec<String>,
  pub ldflags: Vec<String>,
  pub install_targets: Vec<String>,
}

impl PackageRecipe {
  pub fn new(name: impl Into<String>, version: impl Into<String>, source: SourceArchive, prefix: &Path) -> Self {
    Self {
      name: name.into(),
      version: version.into(),
      source,
      prefix: prefix.to_path_buf(),
      configure_args: Vec::new(),
      cflags: Vec::new(),
      ldflags: Vec::new(),
      install_targets: vec!["install".to_string()],
    }
  }

  pub fn configure_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.configure_args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn cflags<I, S>(mut self, flags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.cflags.extend(flags.into_iter().map(Into::into));
    self
  }

  pub fn ldflags<I, S>(mut self, flags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.ldflags.extend(flags.into_iter().map(Into::into));
    self
  }

  /// Full configure invocation arguments, `--prefix` first
  pub fn configure_invocation(&self) -> Vec<String> {
    std::iter::once(format!("--prefix={}", self.prefix.display()))
      .chain(self.configure_args.iter().cloned())
      .collect()
  }

  /// Fetch, extract, configure, compile and install into the prefix.
  ///
  /// `seed` is the environment the compile steps inherit; CFLAGS and LDFLAGS
  /// are appended to it.
  pub async fn build(&self, host: &impl Host, work_dir: &Path, seed: &BuildEnvironment) -> Result<(), ExecuteError> {
    info!(package = %self.name, version = %self.version, prefix = ?self.prefix, "building package from source");

    let build_root = work_dir.join(format!("{}-{}", self.name, self.version));
    host.remove_dir_all(&build_root).await?;
    host.create_dir_all(&build_root).await?;

    let tarball = host.download(&self.source.url, &build_root).await?;
    host
      .run(
        &Cmd::new("tar")
          .arg("-xzf")
          .path_arg(&tarball)
          .arg("-C")
          .path_arg(&build_root),
      )
      .await?;

    let src_dir = build_root.join(&self.source.top_dir);
    let env = self.compile_env(seed);

    host
      .run(
        &Cmd::new("./configure")
          .args(self.configure_invocation())
          .cwd(&src_dir)
          .env(env.clone()),
      )
      .await?;
    host.run(&Cmd::new("make").cwd(&src_dir).env(env.clone())).await?;
    host
      .run(
        &Cmd::new("make")
          .args(self.install_targets.iter().cloned())
          .cwd(&src_dir)
          .env(env),
      )
      .await?;

    info!(package = %self.name, "package installed");
    Ok(())
  }

  fn compile_env(&self, seed: &BuildEnvironment) -> BuildEnvironment {
    let mut env = seed.clone();
    if !self.cflags.is_empty() {
      let flags: Vec<&str> = self.cflags.iter().map(String::as_str).collect();
      env.append_flags("CFLAGS", &flags);
    }
    if !self.ldflags.is_empty() {
      let flags: Vec<&str> = self.ldflags.iter().map(String::as_str).collect();
      env.append_flags("LDFLAGS", &flags);
    }
    env
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{Effect, FakeHost};

  fn recipe() -> PackageRecipe {
    PackageRecipe::new(
      "zlib",
      "1.3",
      SourceArchive {
        url: "https://example.invalid/zlib-1.3.tar.gz".into(),
        top_dir: "zlib-1.3".into(),
      },
      Path::new("/opt/prefix"),
    )
    .configure_args(["--static"])
    .cflags(["-O2", "-fPIC"])
  }

  #[tokio::test]
  async fn build_runs_steps_in_order() {
    let host = FakeHost::new();
    let seed: BuildEnvironment = [("CFLAGS", "-g")].into_iter().collect();
    recipe().build(&host, Path::new("/work"), &seed).await.unwrap();

    let effects = host.effects();
    assert_eq!(effects[0], Effect::RemoveDir(PathBuf::from("/work/zlib-1.3")));
    assert_eq!(effects[1], Effect::CreateDir(PathBuf::from("/work/zlib-1.3")));
    assert_eq!(effects[2], Effect::Download("https://example.invalid/zlib-1.3.tar.gz".into()));

    let ran = host.ran();
    assert_eq!(
      ran,
      vec![
        "tar -xzf /work/zlib-1.3/zlib-1.3.tar.gz -C /work/zlib-1.3".to_string(),
        "./configure --prefix=/opt/prefix --static".to_string(),
        "make".to_string(),
        "make install".to_string(),
      ]
    );

    let configure = &host.commands()[1];
    assert_eq!(configure.get_cwd(), Some(Path::new("/work/zlib-1.3/zlib-1.3")));
    assert_eq!(configure.get_env().unwrap().get("CFLAGS"), Some("-g -O2 -fPIC"));
    assert_eq!(configure.get_env().unwrap().get("LDFLAGS"), None);
  }

  #[tokio::test]
  async fn linker_flags_follow_inherited_ones() {
    let host = FakeHost::new();
    let seed: BuildEnvironment = [("LDFLAGS", "-L/mine")].into_iter().collect();
    recipe()
      .ldflags(["-L/opt/prefix/lib", "-Wl,-rpath,/opt/prefix/lib"])
      .build(&host, Path::new("/work"), &seed)
      .await
      .unwrap();

    let configure = &host.commands()[1];
    let env = configure.get_env().unwrap();
    assert_eq!(env.get("LDFLAGS"), Some("-L/mine -L/opt/prefix/lib -Wl,-rpath,/opt/prefix/lib"));
    assert_eq!(env.get("CFLAGS"), Some("-O2 -fPIC"));
  }

  #[tokio::test]
  async fn failing_step_stops_the_build() {
    let host = FakeHost::new().fail_on("./configure", 77);
    let err = recipe().build(&host, Path::new("/work"), &BuildEnvironment::new()).await.unwrap_err();
    assert_eq!(err.exit_code(), Some(77));
    assert!(host.position_of_run("make").is_none());
  }
}
