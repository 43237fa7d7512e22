//! Implementation of `basepy --plan`.
//!
//! Classifies the machine and prints what a run would produce, without
//! executing any stage.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use basepy_lib::environment::BuildEnvironment;
use basepy_lib::execute::SystemHost;
use basepy_lib::pipeline::{Pipeline, Stage, plan};
use basepy_lib::platform::{BuildVariant, HostProbe, PlatformProfile, classify};
use basepy_lib::settings::Settings;

use crate::output::{OutputFormat, print_info, print_json, print_stat, symbols};

#[derive(Serialize)]
struct PlanOutput<'a> {
  profile: &'a PlatformProfile,
  variant: BuildVariant,
  tag: String,
  output_base_name: String,
  destination: PathBuf,
  archive: PathBuf,
  stages: Vec<Stage>,
  settings: &'a Settings,
}

pub fn cmd_plan(python_version: &str, format: OutputFormat) -> Result<()> {
  let profile = classify(&HostProbe);
  let settings = Settings::from_env(&profile, python_version);
  let pipeline = Pipeline::new(&SystemHost, &settings, &profile, BuildEnvironment::new());

  let plan = PlanOutput {
    profile: &profile,
    variant: profile.variant(),
    tag: profile.tag(),
    output_base_name: pipeline.target().output_base_name(),
    destination: pipeline.destination().to_path_buf(),
    archive: pipeline.archive_path(),
    stages: plan(&profile),
    settings: &settings,
  };

  if format.is_json() {
    return print_json(&plan);
  }

  print_info(&format!("Plan for {}", plan.output_base_name));
  print_stat("Platform", &profile.to_string());
  print_stat("Tag", &plan.tag);
  print_stat("Destination", &plan.destination.display().to_string());
  print_stat("Archive", &plan.archive.display().to_string());
  print_stat("Elevate", if settings.elevate { "sudo" } else { "no" });
  println!();
  println!("Stages:");
  for (index, stage) in plan.stages.iter().enumerate() {
    println!("  {} {}. {}", symbols::INFO, index + 1, stage);
  }

  Ok(())
}
