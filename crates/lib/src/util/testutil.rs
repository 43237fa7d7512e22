//! Test utilities for basepy-lib.
//!
//! [`FakeHost`] records every effect a stage asks for, in order, and keeps an
//! in-memory filesystem so stages can be exercised without touching the
//! machine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::execute::actions::fetch::url_to_filename;
use crate::execute::{Cmd, ExecuteError, Host};

/// One recorded effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  Run(String),
  Download(String),
  CreateDir(PathBuf),
  RemoveDir(PathBuf),
  Read(PathBuf),
  Write(PathBuf),
}

#[derive(Default)]
pub struct FakeHost {
  effects: Mutex<Vec<Effect>>,
  commands: Mutex<Vec<Cmd>>,
  files: Mutex<HashMap<PathBuf, String>>,
  /// Commands whose rendering contains the pattern fail with the code.
  failures: Vec<(String, i32)>,
  /// Files that appear once a `git clone` runs.
  clone_fixtures: Vec<(PathBuf, String)>,
}

impl FakeHost {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn fail_on(mut self, pattern: &str, code: i32) -> Self {
    self.failures.push((pattern.to_string(), code));
    self
  }

  pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
    self.files.lock().unwrap().insert(path.into(), content.to_string());
    self
  }

  pub fn on_clone(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
    self.clone_fixtures.push((path.into(), content.to_string()));
    self
  }

  pub fn effects(&self) -> Vec<Effect> {
    self.effects.lock().unwrap().clone()
  }

  pub fn commands(&self) -> Vec<Cmd> {
    self.commands.lock().unwrap().clone()
  }

  /// Rendered commands, in the order they ran.
  pub fn ran(&self) -> Vec<String> {
    self.commands().iter().map(ToString::to_string).collect()
  }

  /// Index of the first recorded effect matching `pred`.
  pub fn position(&self, pred: impl Fn(&Effect) -> bool) -> Option<usize> {
    self.effects().iter().position(pred)
  }

  /// Index of the first command whose rendering contains `needle`.
  pub fn position_of_run(&self, needle: &str) -> Option<usize> {
    self.position(|e| matches!(e, Effect::Run(c) if c.contains(needle)))
  }

  pub fn file(&self, path: &Path) -> Option<String> {
    self.files.lock().unwrap().get(path).cloned()
  }

  fn record(&self, effect: Effect) {
    self.effects.lock().unwrap().push(effect);
  }
}

impl Host for FakeHost {
  async fn run(&self, cmd: &Cmd) -> Result<(), ExecuteError> {
    let rendered = cmd.to_string();
    self.record(Effect::Run(rendered.clone()));
    self.commands.lock().unwrap().push(cmd.clone());

    if let Some((_, code)) = self.failures.iter().find(|(pattern, _)| rendered.contains(pattern)) {
      return Err(ExecuteError::CmdFailed {
        cmd: rendered,
        code: Some(*code),
      });
    }

    if cmd.program() == "git" && cmd.get_args().first().map(String::as_str) == Some("clone") {
      let mut files = self.files.lock().unwrap();
      for (path, content) in &self.clone_fixtures {
        files.insert(path.clone(), content.clone());
      }
    }

    Ok(())
  }

  async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf, ExecuteError> {
    self.record(Effect::Download(url.to_string()));
    Ok(dir.join(url_to_filename(url)))
  }

  async fn create_dir_all(&self, path: &Path) -> Result<(), ExecuteError> {
    self.record(Effect::CreateDir(path.to_path_buf()));
    Ok(())
  }

  async fn remove_dir_all(&self, path: &Path) -> Result<(), ExecuteError> {
    self.record(Effect::RemoveDir(path.to_path_buf()));
    self.files.lock().unwrap().retain(|p, _| !p.starts_with(path));
    Ok(())
  }

  async fn read_to_string(&self, path: &Path) -> Result<String, ExecuteError> {
    self.record(Effect::Read(path.to_path_buf()));
    self.file(path).ok_or_else(|| {
      ExecuteError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
      ))
    })
  }

  async fn write(&self, path: &Path, contents: &str) -> Result<(), ExecuteError> {
    self.record(Effect::Write(path.to_path_buf()));
    self.files.lock().unwrap().insert(path.to_path_buf(), contents.to_string());
    Ok(())
  }
}
