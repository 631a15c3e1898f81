#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Catalog store backends and the session catalog snapshot.
//!
//! Reference tables and the crime-fact table can live in either a `DuckDB`
//! database ([`duckdb_store`]) or a directory of JSON document collections
//! ([`document_store`]). Both implement [`CatalogStore`] with the same
//! filter semantics and the same column set, so everything downstream is
//! written once against the trait. The backend is picked from
//! [`config::StoreConfig`] at startup by [`open_store`].

pub mod config;
pub mod document_store;
pub mod duckdb_store;
pub mod paths;
pub mod queries;
pub mod schema;
pub mod snapshot;

use crime_dash_catalog_models::{CatalogTable, Row, RowFilter};
use thiserror::Error;

use crate::config::StoreConfig;
use crate::document_store::DocumentStore;
use crate::duckdb_store::DuckDbStore;

pub use snapshot::CatalogSnapshot;

/// Errors that can occur while reading from a catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `DuckDB` operation failed.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or row deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A filter referenced a column the table does not declare.
    #[error("Unknown column '{column}' for table {table}")]
    UnknownColumn {
        /// Table being queried.
        table: CatalogTable,
        /// Rejected column name.
        column: String,
    },

    /// The document store has no file for a collection.
    #[error("Missing collection {table} in {dir}")]
    MissingCollection {
        /// Collection that was requested.
        table: CatalogTable,
        /// Directory that was searched.
        dir: String,
    },

    /// A stored or filter value could not be converted to the column type.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// Store configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}

/// A read-only source of catalog tables and crime facts.
///
/// Implementations must return, for the same data and filter, the same
/// rows with the same columns: exactly the table's declared columns, with
/// values coerced to the declared types (see [`schema`]). Row order is not
/// part of the contract.
pub trait CatalogStore: Send + Sync {
    /// Fetches every row of `table` matching `filter` (all rows when
    /// `filter` is `None`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the filter names an undeclared column,
    /// a filter value cannot be converted to its column type, or the
    /// underlying store fails.
    fn fetch_table(&self, table: CatalogTable, filter: Option<&RowFilter>)
    -> Result<Vec<Row>, StoreError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Opens the store described by `config`.
///
/// This is the one place where a backend is chosen.
///
/// # Errors
///
/// Returns [`StoreError`] if the database cannot be opened or the document
/// directory does not exist.
pub fn open_store(config: &StoreConfig) -> Result<Box<dyn CatalogStore>, StoreError> {
    match config {
        StoreConfig::Duckdb { path, read_only } => {
            log::info!("Opening DuckDB catalog store at {}", path.display());
            let store = if *read_only {
                DuckDbStore::open_read_only(path)?
            } else {
                DuckDbStore::open(path)?
            };
            Ok(Box::new(store))
        }
        StoreConfig::Documents { dir } => {
            log::info!("Opening document catalog store at {}", dir.display());
            Ok(Box::new(DocumentStore::open(dir)?))
        }
    }
}
