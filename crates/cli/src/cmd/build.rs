//! Implementation of the default `basepy` run.
//!
//! Classifies the machine, resolves settings from the environment and runs
//! every stage, printing progress as stages complete.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use basepy_lib::environment::BuildEnvironment;
use basepy_lib::execute::SystemHost;
use basepy_lib::pipeline::{Pipeline, Progress, Stage};
use basepy_lib::platform::{HostProbe, classify};
use basepy_lib::settings::Settings;

use crate::output::{OutputFormat, format_duration, print_error, print_json, print_stat, print_step, print_success};

struct StageLines;

impl Progress for StageLines {
  fn stage_started(&self, stage: Stage) {
    print_step(&stage.to_string());
  }

  fn stage_finished(&self, stage: Stage, elapsed: Duration) {
    print_success(&format!("{} ({})", stage, format_duration(elapsed)));
  }
}

pub fn cmd_build(python_version: &str, format: OutputFormat) -> Result<ExitCode> {
  let profile = classify(&HostProbe);
  let settings = Settings::from_env(&profile, python_version);
  debug!(?settings, "resolved settings");

  let pipeline = Pipeline::new(&SystemHost, &settings, &profile, BuildEnvironment::from_process());
  print_step(&format!("Building {} on {}", pipeline.target().output_base_name(), profile));

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = match rt.block_on(pipeline.run(&StageLines)) {
    Ok(report) => report,
    Err(err) => {
      print_error(&err.to_string());
      let code = u8::try_from(err.exit_code()).unwrap_or(1);
      return Ok(ExitCode::from(code));
    }
  };

  if format.is_json() {
    print_json(&report)?;
  } else {
    let total: Duration = report.stages.iter().map(|s| s.elapsed).sum();
    println!();
    print_success(&format!("Built {}", report.output_base_name));
    print_stat("Interpreter tree", &report.destination.display().to_string());
    print_stat("Archive", &report.archive.display().to_string());
    print_stat("Total time", &format_duration(total));
  }

  Ok(ExitCode::SUCCESS)
}
