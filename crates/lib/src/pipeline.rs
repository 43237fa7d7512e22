//! Stage sequencing.
//!
//! The stages run strictly one after another and the first failure ends the
//! run. Nothing done by earlier stages is rolled back.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::archive::{ArchiveError, ArchiveSpec, create_archive};
use crate::bootstrap::{BuildTool, ensure_build_tool};
use crate::environment::{BuildEnvironment, compose};
use crate::execute::{ExecuteError, Host};
use crate::interpreter::build_interpreter;
use crate::interpreter::installer::run_installer;
use crate::patch::PatchError;
use crate::platform::paths::interpreter_path;
use crate::platform::{BuildVariant, PlatformProfile};
use crate::prereq::ensure_prerequisites;
use crate::settings::Settings;
use crate::target::BuildTarget;
use crate::validate::{ValidationError, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  InstallPrerequisites,
  BootstrapBuildTool,
  BuildInterpreter,
  /// Windows only, stands in for bootstrap and build.
  RunInstaller,
  Validate,
  Archive,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::InstallPrerequisites => "install prerequisites",
      Stage::BootstrapBuildTool => "bootstrap build tool",
      Stage::BuildInterpreter => "build interpreter",
      Stage::RunInstaller => "run installer",
      Stage::Validate => "validate",
      Stage::Archive => "archive",
    };
    f.write_str(name)
  }
}

/// Stages a profile runs, in order
pub fn plan(profile: &PlatformProfile) -> Vec<Stage> {
  match profile.variant() {
    BuildVariant::Windows => vec![Stage::RunInstaller, Stage::Validate, Stage::Archive],
    _ => vec![
      Stage::InstallPrerequisites,
      Stage::BootstrapBuildTool,
      Stage::BuildInterpreter,
      Stage::Validate,
      Stage::Archive,
    ],
  }
}

#[derive(Debug, Error)]
pub enum StageError {
  #[error(transparent)]
  Execute(#[from] ExecuteError),
  #[error(transparent)]
  Patch(#[from] PatchError),
  #[error(transparent)]
  Validation(#[from] ValidationError),
  #[error(transparent)]
  Archive(#[from] ArchiveError),
  /// The build stage ran without a bootstrapped build tool.
  #[error("no build tool was bootstrapped before the build stage")]
  BuildToolMissing,
}

impl StageError {
  fn execute_error(&self) -> Option<&ExecuteError> {
    match self {
      StageError::Execute(e) => Some(e),
      StageError::Patch(PatchError::Execute(e)) => Some(e),
      StageError::Validation(e) => Some(&e.source),
      StageError::Archive(ArchiveError::Execute(e)) => Some(e),
      _ => None,
    }
  }
}

#[derive(Debug, Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct PipelineError {
  pub stage: Stage,
  #[source]
  pub source: StageError,
}

impl PipelineError {
  /// Process exit status: the failing command's own code when there is one
  pub fn exit_code(&self) -> i32 {
    self
      .source
      .execute_error()
      .and_then(ExecuteError::exit_code)
      .filter(|code| *code != 0)
      .unwrap_or(1)
  }
}

/// A completed stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
  pub stage: Stage,
  pub elapsed: Duration,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
  pub output_base_name: String,
  pub destination: PathBuf,
  pub archive: PathBuf,
  pub stages: Vec<StageReport>,
}

/// Receives progress as stages start and finish.
pub trait Progress {
  fn stage_started(&self, _stage: Stage) {}
  fn stage_finished(&self, _stage: Stage, _elapsed: Duration) {}
}

impl Progress for () {}

pub struct Pipeline<'a, H> {
  host: &'a H,
  settings: &'a Settings,
  profile: &'a PlatformProfile,
  target: BuildTarget,
  destination: PathBuf,
  /// Inherited environment every composed build environment starts from.
  seed: BuildEnvironment,
}

impl<'a, H: Host> Pipeline<'a, H> {
  pub fn new(host: &'a H, settings: &'a Settings, profile: &'a PlatformProfile, seed: BuildEnvironment) -> Self {
    let target = BuildTarget::new(settings, profile);
    let destination = target.destination_path(&settings.root_dir);
    Self {
      host,
      settings,
      profile,
      target,
      destination,
      seed,
    }
  }

  pub fn target(&self) -> &BuildTarget {
    &self.target
  }

  pub fn destination(&self) -> &Path {
    &self.destination
  }

  pub fn archive_path(&self) -> PathBuf {
    self.settings.artifact_dir.join(self.target.archive_filename())
  }

  /// Run every planned stage, stopping at the first failure.
  pub async fn run(&self, progress: &impl Progress) -> Result<PipelineReport, PipelineError> {
    info!(profile = %self.profile, destination = ?self.destination, "starting pipeline");

    let mut tool = None;
    let mut stages = Vec::new();

    for stage in plan(self.profile) {
      progress.stage_started(stage);
      let started = Instant::now();
      info!(stage = %stage, "stage started");

      let result = match stage {
        Stage::InstallPrerequisites => ensure_prerequisites(
          self.host,
          self.profile,
          self.settings,
          &self.destination,
          &self.seed,
        )
        .await
        .map_err(StageError::from),
        Stage::BootstrapBuildTool => ensure_build_tool(self.host, self.profile, &self.destination)
          .await
          .map(|t| tool = Some(t))
          .map_err(StageError::from),
        Stage::BuildInterpreter => match &tool {
          Some(tool) => self.build(tool).await,
          None => Err(StageError::BuildToolMissing),
        },
        Stage::RunInstaller => run_installer(
          self.host,
          &self.settings.python_version,
          &self.destination,
          &self.settings.work_dir,
        )
        .await
        .map_err(StageError::from),
        Stage::Validate => validate(
          self.host,
          &interpreter_path(self.profile, &self.destination),
          &self.settings.work_dir,
        )
        .await
        .map_err(StageError::from),
        Stage::Archive => self.archive().await,
      };

      if let Err(source) = result {
        error!(stage = %stage, error = %source, "stage failed");
        return Err(PipelineError { stage, source });
      }

      let elapsed = started.elapsed();
      info!(stage = %stage, elapsed = ?elapsed, "stage finished");
      progress.stage_finished(stage, elapsed);
      stages.push(StageReport { stage, elapsed });
    }

    Ok(PipelineReport {
      output_base_name: self.target.output_base_name(),
      destination: self.destination.clone(),
      archive: self.archive_path(),
      stages,
    })
  }

  async fn build(&self, tool: &BuildTool) -> Result<(), StageError> {
    let env = compose(self.profile, &self.destination, &self.seed);
    build_interpreter(self.host, tool, &self.settings.python_version, &self.destination, env).await?;
    Ok(())
  }

  /// Writes the archive to [`archive_path`](Self::archive_path).
  async fn archive(&self) -> Result<(), StageError> {
    let spec = ArchiveSpec::new(
      &self.target,
      &self.destination,
      &self.settings.root_dir,
      &self.settings.artifact_dir,
    )?;
    create_archive(self.host, &spec, self.profile.is_windows()).await?;
    Ok(())
  }
}
