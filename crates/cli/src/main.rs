mod cmd;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use basepy_lib::consts::DEFAULT_PYTHON_VERSION;

use crate::cmd::{cmd_build, cmd_plan};
use crate::output::{OutputFormat, print_error};

/// basepy - Build relocatable base Python interpreters
///
/// With no flags, builds the interpreter for the executing machine,
/// validates it and writes a .tar.gz archive.
#[derive(Parser)]
#[command(name = "basepy")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Python version to build
  #[arg(long, env = "BASEPY_PYTHON_VERSION", default_value = DEFAULT_PYTHON_VERSION)]
  python_version: String,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Print what would be built without running any stage
  #[arg(long)]
  plan: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value_t)]
  format: OutputFormat,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose && std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(&cli) {
    Ok(code) => code,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: &Cli) -> Result<ExitCode> {
  if cli.plan {
    cmd_plan(&cli.python_version, cli.format)?;
    return Ok(ExitCode::SUCCESS);
  }
  cmd_build(&cli.python_version, cli.format)
}
