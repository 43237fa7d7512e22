//! Build environments handed to external tools.
//!
//! A [`BuildEnvironment`] is seeded from an inherited environment and then
//! overlaid by [`compose`]. Path-like variables are prepended to, flag
//! variables are appended to; an inherited value is never dropped.

mod compose;

use std::collections::BTreeMap;

use tracing::warn;

pub use compose::{LegacyLinkFlags, compose};

/// Separator for path-like variables. Only POSIX builds compose environments.
pub const PATH_SEPARATOR: &str = ":";

/// Ordered mapping of variable name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnvironment {
  vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed from the environment of the current process
  ///
  /// Variables whose name or value is not valid UTF-8 are skipped.
  pub fn from_process() -> Self {
    std::env::vars_os()
      .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
        (Ok(name), Ok(value)) => Some((name, value)),
        (name, _) => {
          warn!(name = ?name, "skipping inherited variable that is not valid UTF-8");
          None
        }
      })
      .collect()
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(String::as_str)
  }

  /// Replace `name` outright
  pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.vars.insert(name.into(), value.into());
  }

  /// Put `entries` in front of any existing value of a path-like variable
  pub fn prepend_path(&mut self, name: &str, entries: &[&str]) {
    let mut parts: Vec<&str> = entries.to_vec();
    let existing = self.vars.get(name).cloned().unwrap_or_default();
    if !existing.is_empty() {
      parts.push(&existing);
    }
    let joined = parts.join(PATH_SEPARATOR);
    self.vars.insert(name.to_string(), joined);
  }

  /// Add `flags` after any existing value of a flag variable
  pub fn append_flags(&mut self, name: &str, flags: &[&str]) {
    let ours = flags.join(" ");
    let value = match self.vars.get(name) {
      Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing, ours),
      _ => ours,
    };
    self.vars.insert(name.to_string(), value);
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.vars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BuildEnvironment {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }
}
