//! Typed reads over any [`CatalogStore`].

use crime_dash_catalog_models::{CatalogTable, CrimeFact, FactFilter, Row, RowFilter};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::duckdb_store::DuckDbStore;
use crate::{CatalogStore, StoreError};

/// Fetches `table` and deserializes every row into `T`.
///
/// # Errors
///
/// Returns [`StoreError`] if the fetch fails or a row does not match `T`.
pub fn fetch_typed<T: DeserializeOwned>(
    store: &dyn CatalogStore,
    table: CatalogTable,
    filter: Option<&RowFilter>,
) -> Result<Vec<T>, StoreError> {
    store
        .fetch_table(table, filter)?
        .into_iter()
        .map(|row| Ok(serde_json::from_value(Value::Object(row))?))
        .collect()
}

/// Fetches the crime facts matching `filter`.
///
/// # Errors
///
/// Returns [`StoreError`] if the fetch fails or a row is malformed.
pub fn fetch_facts(
    store: &dyn CatalogStore,
    filter: &FactFilter,
) -> Result<Vec<CrimeFact>, StoreError> {
    log::debug!(
        "fetch_facts: place={} group={} range={}..={}",
        filter.place_code,
        filter.group_code,
        filter.start,
        filter.end
    );
    fetch_typed(store, CatalogTable::CrimeFacts, Some(&RowFilter::from(filter)))
}

/// Copies every table of `from` into `to`, e.g. to turn a document export
/// into a `DuckDB` catalog. Each copied table replaces the rows already in
/// `to`, so re-importing the same export leaves the target unchanged.
/// Tables missing from `from` are skipped with a warning and left as they
/// are.
///
/// Returns the total number of rows copied.
///
/// # Errors
///
/// Returns [`StoreError`] if a read or insert fails.
pub fn copy_catalog(from: &dyn CatalogStore, to: &DuckDbStore) -> Result<u64, StoreError> {
    let mut total = 0u64;

    for table in CatalogTable::ALL {
        let rows: Vec<Row> = match from.fetch_table(*table, None) {
            Ok(rows) => rows,
            Err(StoreError::MissingCollection { table, dir }) => {
                log::warn!("Skipping {table}: no collection in {dir}");
                continue;
            }
            Err(e) => return Err(e),
        };

        let cleared = to.clear_table(*table)?;
        if cleared > 0 {
            log::info!("Replacing {cleared} existing rows of {table}");
        }
        let copied = to.load_rows(*table, &rows)?;
        log::info!(
            "Copied {copied} rows of {table} from {} store",
            from.backend_name()
        );
        total += copied;
    }

    Ok(total)
}
