//! JSON document catalog store.
//!
//! A directory holds one collection file per table, named after the
//! table's physical name: either `<name>.jsonl` with one document per line
//! (the `mongoexport` layout) or `<name>.json` holding a JSON array. When
//! both exist the `.jsonl` file wins. Files are read on every query, so no
//! handles are held between requests.

use std::cmp::Ordering;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crime_dash_catalog_models::{CatalogTable, Comparison, FilterValue, Row, RowFilter};
use serde_json::Value;

use crate::schema::{self, ResolvedCondition};
use crate::{CatalogStore, StoreError};

/// Catalog store over a directory of JSON collections.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    /// Opens the collection directory at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if `dir` is not an existing directory.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::Config {
                message: format!("Document directory {} does not exist", dir.display()),
            });
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn collection_path(&self, table: CatalogTable) -> Result<PathBuf, StoreError> {
        let name = table.physical_name();
        let jsonl = self.dir.join(format!("{name}.jsonl"));
        if jsonl.is_file() {
            return Ok(jsonl);
        }
        let json = self.dir.join(format!("{name}.json"));
        if json.is_file() {
            return Ok(json);
        }
        Err(StoreError::MissingCollection {
            table,
            dir: self.dir.display().to_string(),
        })
    }

    fn read_documents(&self, table: CatalogTable) -> Result<Vec<Row>, StoreError> {
        let path = self.collection_path(table)?;
        log::trace!("Reading collection {}", path.display());

        if path.extension().is_some_and(|ext| ext == "jsonl") {
            let reader = BufReader::new(fs::File::open(&path)?);
            let mut documents = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                documents.push(as_document(serde_json::from_str(&line)?, table)?);
            }
            Ok(documents)
        } else {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&contents)? {
                Value::Array(values) => values
                    .into_iter()
                    .map(|value| as_document(value, table))
                    .collect(),
                _ => Err(StoreError::Conversion {
                    message: format!("{} must contain a JSON array", path.display()),
                }),
            }
        }
    }
}

impl CatalogStore for DocumentStore {
    fn fetch_table(
        &self,
        table: CatalogTable,
        filter: Option<&RowFilter>,
    ) -> Result<Vec<Row>, StoreError> {
        let conditions = schema::resolve_filter(table, filter)?;
        log::debug!("fetch_table {table} with {} conditions", conditions.len());

        let mut rows = Vec::new();
        for document in self.read_documents(table)? {
            let row = schema::project_row(table, document)?;
            if conditions.iter().all(|c| matches(c, &row)) {
                rows.push(row);
            }
        }

        log::debug!("Fetched {} rows from {table}", rows.len());
        Ok(rows)
    }

    fn backend_name(&self) -> &'static str {
        "documents"
    }
}

fn as_document(value: Value, table: CatalogTable) -> Result<Row, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Conversion {
            message: format!("{table} document is not an object: {other}"),
        }),
    }
}

/// Evaluates one condition against a projected row. A `null` never
/// matches, as in SQL.
fn matches(condition: &ResolvedCondition, row: &Row) -> bool {
    let Some(value) = row.get(condition.column.name) else {
        return false;
    };

    let ordering = match (&condition.value, value) {
        (FilterValue::Text(expected), Value::String(actual)) => {
            Some(actual.as_str().cmp(expected.as_str()))
        }
        (FilterValue::Integer(expected), Value::Number(actual)) => {
            actual.as_i64().map(|actual| actual.cmp(expected))
        }
        (FilterValue::Real(expected), Value::Number(actual)) => {
            actual.as_f64().and_then(|actual| actual.partial_cmp(expected))
        }
        _ => None,
    };

    ordering.is_some_and(|ordering| match condition.comparison {
        Comparison::Eq => ordering == Ordering::Equal,
        Comparison::Gte => ordering != Ordering::Less,
        Comparison::Lte => ordering != Ordering::Greater,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_dash_catalog_models::{FactFilter, Period, columns};
    use serde_json::json;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crime_dash_docs_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_facts(dir: &Path) {
        let lines = [
            json!({"_id": {"$oid": "1"}, "CVE_LUGAR": "P00", "Aniomes": 202_401, "Id_Agrupador_Delito": 1, "tasa": 2.5, "Num_Delitos": 10}),
            json!({"_id": {"$oid": "2"}, "CVE_LUGAR": "P00", "Aniomes": 202_402, "Id_Agrupador_Delito": 1, "tasa": 3.0, "Num_Delitos": 12}),
            json!({"_id": {"$oid": "3"}, "CVE_LUGAR": "P00", "Aniomes": 202_403, "Id_Agrupador_Delito": 2, "tasa": 1.0, "Num_Delitos": 4}),
            json!({"_id": {"$oid": "4"}, "CVE_LUGAR": "E9", "Aniomes": {"$numberLong": "202402"}, "Id_Agrupador_Delito": "1", "tasa": 8.0, "Num_Delitos": 7}),
        ];
        let body = lines
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(dir.join("dfDefinitivo.jsonl"), body).unwrap();
    }

    #[test]
    fn open_rejects_missing_directory() {
        let dir = std::env::temp_dir().join(format!("crime_dash_missing_{}", uuid::Uuid::new_v4()));
        assert!(matches!(
            DocumentStore::open(&dir),
            Err(StoreError::Config { .. })
        ));
    }

    #[test]
    fn reads_jsonl_and_strips_internal_id() {
        let dir = temp_dir();
        write_facts(&dir);
        let store = DocumentStore::open(&dir).unwrap();

        let rows = store.fetch_table(CatalogTable::CrimeFacts, None).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| !r.contains_key("_id")));
        assert!(rows.iter().all(|r| r[columns::GROUP_CODE].is_string()));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn applies_fact_filter_as_predicates() {
        let dir = temp_dir();
        write_facts(&dir);
        let store = DocumentStore::open(&dir).unwrap();

        let filter = RowFilter::from(&FactFilter::state(
            "1",
            "9",
            Period::from_code(202_401).unwrap(),
            Period::from_code(202_412).unwrap(),
        ));
        let rows = store
            .fetch_table(CatalogTable::CrimeFacts, Some(&filter))
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][columns::PERIOD], json!(202_402));
        assert_eq!(rows[0][columns::RATE], json!(8.0));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn reads_json_array_collections() {
        let dir = temp_dir();
        fs::write(
            dir.join("col_aniomes.json"),
            r#"[{"Aniomes": 202401}, {"Aniomes": 202402}]"#,
        )
        .unwrap();
        let store = DocumentStore::open(&dir).unwrap();

        let filter = RowFilter::new().at_least(columns::PERIOD, 202_402_i64);
        let rows = store
            .fetch_table(CatalogTable::Periods, Some(&filter))
            .unwrap();
        assert_eq!(rows.len(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_collection_is_an_error() {
        let dir = temp_dir();
        let store = DocumentStore::open(&dir).unwrap();
        let err = store.fetch_table(CatalogTable::Places, None).unwrap_err();
        assert!(matches!(err, StoreError::MissingCollection { .. }));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn hostile_literals_match_nothing() {
        let dir = temp_dir();
        write_facts(&dir);
        let store = DocumentStore::open(&dir).unwrap();

        let filter = RowFilter::new().equals(columns::PLACE_CODE, "' OR 1=1 --");
        let rows = store
            .fetch_table(CatalogTable::CrimeFacts, Some(&filter))
            .unwrap();
        assert!(rows.is_empty());

        fs::remove_dir_all(&dir).ok();
    }
}
