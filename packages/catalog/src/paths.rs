#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the catalog data directory.
//!
//! All paths are relative to the project root's `data/` directory unless
//! `CRIME_DASH_DATA_DIR` points somewhere else.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CRIME_DASH_DATA_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory if the manifest is not two levels deep.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the data directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the path of the default catalog `DuckDB` file.
#[must_use]
pub fn catalog_db_path() -> PathBuf {
    data_dir().join("catalog.duckdb")
}

/// Returns the default directory for JSON document collections.
#[must_use]
pub fn documents_dir() -> PathBuf {
    data_dir().join("documents")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
