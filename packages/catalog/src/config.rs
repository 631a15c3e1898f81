//! Catalog store configuration.
//!
//! The backend is chosen once at startup from, in order of precedence:
//!
//! 1. the TOML file named by `CRIME_DASH_CONFIG`,
//! 2. `CATALOG_BACKEND` (`duckdb` or `documents`) plus `CATALOG_PATH`,
//! 3. the default `DuckDB` file under the data directory.
//!
//! ```toml
//! backend = "documents"
//! dir = "data/documents"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Environment variable naming a TOML configuration file.
pub const CONFIG_ENV: &str = "CRIME_DASH_CONFIG";
/// Environment variable selecting the backend.
pub const BACKEND_ENV: &str = "CATALOG_BACKEND";
/// Environment variable holding the backend's path.
pub const PATH_ENV: &str = "CATALOG_PATH";

/// Which catalog store to open, tagged by `backend` in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Relational store in a `DuckDB` file.
    Duckdb {
        /// Database file.
        path: PathBuf,
        /// Open without write access (the file must exist).
        #[serde(default = "default_true")]
        read_only: bool,
    },
    /// Directory of JSON document collections.
    Documents {
        /// Collection directory.
        dir: PathBuf,
    },
}

const fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Duckdb {
            path: crate::paths::catalog_db_path(),
            read_only: true,
        }
    }
}

impl StoreConfig {
    /// Parses a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Toml`] if the document is malformed or names
    /// an unknown backend.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, StoreError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Resolves the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the named config file is unreadable or an
    /// environment value is invalid.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through `lookup`, which stands in for the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the named config file is unreadable or a
    /// looked-up value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(file) = non_empty(CONFIG_ENV) {
            log::info!("Loading store configuration from {file}");
            return Self::from_file(Path::new(&file));
        }

        let path = non_empty(PATH_ENV).map(PathBuf::from);

        match non_empty(BACKEND_ENV).as_deref().map(str::trim) {
            None | Some("duckdb") => Ok(Self::Duckdb {
                path: path.unwrap_or_else(crate::paths::catalog_db_path),
                read_only: true,
            }),
            Some("documents") => Ok(Self::Documents {
                dir: path.unwrap_or_else(crate::paths::documents_dir),
            }),
            Some(other) => Err(StoreError::Config {
                message: format!(
                    "{BACKEND_ENV} must be 'duckdb' or 'documents', got '{other}'"
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_tagged_toml() {
        let config = StoreConfig::from_toml_str(
            r#"
            backend = "duckdb"
            path = "/srv/catalog.duckdb"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            StoreConfig::Duckdb {
                path: PathBuf::from("/srv/catalog.duckdb"),
                read_only: true,
            }
        );

        let config = StoreConfig::from_toml_str("backend = \"documents\"\ndir = \"docs\"").unwrap();
        assert_eq!(
            config,
            StoreConfig::Documents {
                dir: PathBuf::from("docs")
            }
        );
    }

    #[test]
    fn rejects_unknown_backend_in_toml() {
        let err = StoreConfig::from_toml_str("backend = \"mongo\"\nurl = \"x\"").unwrap_err();
        assert!(matches!(err, StoreError::Toml(_)));
    }

    #[test]
    fn env_selects_documents_backend() {
        let config = StoreConfig::from_lookup(lookup(&[
            (BACKEND_ENV, "documents"),
            (PATH_ENV, "/tmp/export"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            StoreConfig::Documents {
                dir: PathBuf::from("/tmp/export")
            }
        );
    }

    #[test]
    fn env_defaults_to_duckdb() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert!(matches!(config, StoreConfig::Duckdb { read_only: true, .. }));
    }

    #[test]
    fn env_rejects_unknown_backend() {
        let err = StoreConfig::from_lookup(lookup(&[(BACKEND_ENV, "sqlite")])).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }

    #[test]
    fn config_file_takes_precedence() {
        let dir = std::env::temp_dir().join(format!("crime_dash_cfg_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("store.toml");
        std::fs::write(&file, "backend = \"documents\"\ndir = \"from-file\"").unwrap();

        let config = StoreConfig::from_lookup(lookup(&[
            (CONFIG_ENV, file.to_str().unwrap()),
            (BACKEND_ENV, "duckdb"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            StoreConfig::Documents {
                dir: PathBuf::from("from-file")
            }
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
