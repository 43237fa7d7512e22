//! Download action implementation.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::execute::types::ExecuteError;

/// Download `url` into `dir`.
///
/// The file is always fetched fresh; an existing file with the same name is
/// overwritten.
pub async fn execute_fetch(url: &str, dir: &Path) -> Result<PathBuf, ExecuteError> {
  info!(url = %url, "fetching URL");

  fs::create_dir_all(dir).await?;
  let dest_path = dir.join(url_to_filename(url));

  let response = reqwest::get(url).await.map_err(|e| ExecuteError::FetchFailed {
    url: url.to_string(),
    message: e.to_string(),
  })?;

  if !response.status().is_success() {
    return Err(ExecuteError::FetchFailed {
      url: url.to_string(),
      message: format!("HTTP {}", response.status()),
    });
  }

  let bytes = response.bytes().await.map_err(|e| ExecuteError::FetchFailed {
    url: url.to_string(),
    message: e.to_string(),
  })?;

  let mut file = fs::File::create(&dest_path).await?;
  file.write_all(&bytes).await?;
  file.flush().await?;

  info!(path = ?dest_path, size = bytes.len(), "download complete");

  Ok(dest_path)
}

/// Convert a URL to a safe filename.
///
/// Takes the last path component and sanitizes it, falling back to
/// `download` when the URL has no usable file name.
pub fn url_to_filename(url: &str) -> String {
  let last = url.rsplit('/').next().unwrap_or_default();
  let last = last.split('?').next().unwrap_or(last);

  let sanitized: String = last
    .chars()
    .map(|c| {
      if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
        c
      } else {
        '_'
      }
    })
    .collect();

  if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
    "download".to_string()
  } else {
    sanitized
  }
}
