//! Private SQLite for platforms whose native library is too old.

use std::path::Path;

use super::{PackageRecipe, SourceArchive};

pub const SQLITE_VERSION: &str = "3.44.2";

const SQLITE_URL: &str = "https://www.sqlite.org/2023/sqlite-autoconf-3440200.tar.gz";

const SQLITE_TOP_DIR: &str = "sqlite-autoconf-3440200";

/// Compile-time features enabled in the private build.
pub const SQLITE_FEATURES: &[&str] = &[
  "-DSQLITE_ENABLE_FTS3",
  "-DSQLITE_ENABLE_FTS3_PARENTHESIS",
  "-DSQLITE_ENABLE_FTS4",
  "-DSQLITE_ENABLE_FTS5",
  "-DSQLITE_ENABLE_RTREE",
  "-DSQLITE_ENABLE_JSON1",
  "-DSQLITE_MAX_COLUMN=32767",
  "-DSQLITE_THREADSAFE=1",
];

/// Static, thread-safe SQLite installed under `prefix`.
pub fn recipe(prefix: &Path) -> PackageRecipe {
  PackageRecipe::new(
    "sqlite",
    SQLITE_VERSION,
    SourceArchive {
      url: SQLITE_URL.to_string(),
      top_dir: SQLITE_TOP_DIR.to_string(),
    },
    prefix,
  )
  .configure_args([
    "--enable-static",
    "--disable-shared",
    "--enable-threadsafe",
    "--enable-fts4",
    "--enable-fts5",
    "--enable-json1",
    "--enable-rtree",
    "--disable-tcl",
  ])
  .cflags(SQLITE_FEATURES.iter().copied().chain(["-O2", "-fPIC"]))
}
