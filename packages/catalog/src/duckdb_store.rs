//! `DuckDB`-backed catalog store.
//!
//! Every table lives in one database file under its physical name. Queries
//! are assembled only from the static, quoted identifiers declared in
//! [`CatalogTable::columns`]; every filter value is bound as a parameter.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crime_dash_catalog_models::{CatalogTable, Column, ColumnType, FilterValue, Row, RowFilter};
use duckdb::Connection;
use duckdb::types::Value as SqlValue;
use serde_json::Value;

use crate::schema::{self, ResolvedCondition};
use crate::{CatalogStore, StoreError};

/// Number of rows per INSERT chunk.
const CHUNK_SIZE: usize = 2_000;

/// Catalog store over a single `DuckDB` connection.
///
/// `duckdb::Connection` is `Send` but not `Sync`, so it is wrapped in a
/// `Mutex` to be shared across server workers.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl DuckDbStore {
    /// Opens (or creates) the database at `path` and ensures every catalog
    /// table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }
        let conn = Connection::open(path)?;
        create_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    /// Opens an existing database at `path` without write access.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file does not exist or cannot be opened.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            duckdb::Config::default().access_mode(duckdb::AccessMode::ReadOnly)?,
        )?;
        Ok(Self::from_connection(conn))
    }

    /// Opens an empty in-memory database with every catalog table created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if `DuckDB` fails to initialize.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    const fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `rows` to `table`. Each row is first projected onto the
    /// declared columns, so extra keys are ignored and missing ones are
    /// stored as `NULL`.
    ///
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a value does not fit its column or the
    /// insert fails.
    pub fn load_rows(&self, table: CatalogTable, rows: &[Row]) -> Result<u64, StoreError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let columns = table.columns();
        let projected = rows
            .iter()
            .map(|row| schema::project_row(table, row.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let column_list = quoted_column_list(columns);
        let row_placeholders = format!("({})", vec!["?"; columns.len()].join(", "));

        let conn = self.connection();
        let mut total_inserted = 0u64;

        for chunk in projected.chunks(CHUNK_SIZE) {
            let sql = format!(
                "INSERT INTO {} ({column_list}) VALUES {}",
                quote_ident(table.physical_name()),
                vec![row_placeholders.as_str(); chunk.len()].join(", "),
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut param_idx = 1usize;

            for row in chunk {
                for column in columns {
                    let value = row.get(column.name).unwrap_or(&Value::Null);
                    stmt.raw_bind_parameter(param_idx, json_to_sql(column, value))?;
                    param_idx += 1;
                }
            }

            let inserted = stmt.raw_execute()?;
            total_inserted += u64::try_from(inserted).unwrap_or(0);
        }

        log::debug!("Loaded {total_inserted} rows into {table}");
        Ok(total_inserted)
    }

    /// Deletes every row of `table`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    pub fn clear_table(&self, table: CatalogTable) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {}", quote_ident(table.physical_name()));
        let deleted = self.connection().execute(&sql, duckdb::params![])?;
        Ok(u64::try_from(deleted).unwrap_or(0))
    }
}

impl CatalogStore for DuckDbStore {
    fn fetch_table(
        &self,
        table: CatalogTable,
        filter: Option<&RowFilter>,
    ) -> Result<Vec<Row>, StoreError> {
        let conditions = schema::resolve_filter(table, filter)?;
        let columns = table.columns();
        let sql = select_sql(table, &conditions);
        log::trace!("fetch_table: {sql}");

        let conn = self.connection();
        let mut stmt = conn.prepare(&sql)?;
        for (i, condition) in conditions.iter().enumerate() {
            stmt.raw_bind_parameter(i + 1, filter_to_sql(&condition.value))?;
        }

        stmt.raw_execute()?;
        let mut rows = stmt.raw_query();
        let mut result = Vec::new();

        while let Some(row) = rows.next()? {
            let mut out = Row::new();
            for (i, column) in columns.iter().enumerate() {
                let value = match column.ty {
                    ColumnType::Text => row
                        .get::<_, Option<String>>(i)?
                        .map_or(Value::Null, Value::String),
                    ColumnType::Integer => {
                        row.get::<_, Option<i64>>(i)?.map_or(Value::Null, Value::from)
                    }
                    ColumnType::Real => row
                        .get::<_, Option<f64>>(i)?
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Value::Null, Value::Number),
                };
                out.insert(column.name.to_string(), value);
            }
            result.push(out);
        }

        log::debug!("Fetched {} rows from {table}", result.len());
        Ok(result)
    }

    fn backend_name(&self) -> &'static str {
        "duckdb"
    }
}

fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    let ddl = CatalogTable::ALL
        .iter()
        .map(|table| {
            let columns = table
                .columns()
                .iter()
                .map(|c| format!("{} {}", quote_ident(c.name), sql_type(c.ty)))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "CREATE TABLE IF NOT EXISTS {} ({columns});",
                quote_ident(table.physical_name())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    conn.execute_batch(&ddl)?;
    Ok(())
}

fn select_sql(table: CatalogTable, conditions: &[ResolvedCondition]) -> String {
    let mut sql = format!(
        "SELECT {} FROM {}",
        quoted_column_list(table.columns()),
        quote_ident(table.physical_name())
    );

    if !conditions.is_empty() {
        let clauses = conditions
            .iter()
            .map(|c| {
                format!(
                    "{} {} ?",
                    quote_ident(c.column.name),
                    c.comparison.sql_operator()
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ");
        sql.push_str(" WHERE ");
        sql.push_str(&clauses);
    }

    sql
}

const fn sql_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Text => "TEXT",
        ColumnType::Integer => "BIGINT",
        ColumnType::Real => "DOUBLE",
    }
}

/// Quotes a static identifier. Only names from the declared schema are ever
/// passed here.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quoted_column_list(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn filter_to_sql(value: &FilterValue) -> SqlValue {
    match value {
        FilterValue::Integer(i) => SqlValue::BigInt(*i),
        FilterValue::Real(f) => SqlValue::Double(*f),
        FilterValue::Text(s) => SqlValue::Text(s.clone()),
    }
}

/// Converts an already-projected JSON value to a `DuckDB` value.
fn json_to_sql(column: &Column, value: &Value) -> SqlValue {
    match (column.ty, value) {
        (ColumnType::Text, Value::String(s)) => SqlValue::Text(s.clone()),
        (ColumnType::Integer, Value::Number(n)) => n.as_i64().map_or(SqlValue::Null, SqlValue::BigInt),
        (ColumnType::Real, Value::Number(n)) => n.as_f64().map_or(SqlValue::Null, SqlValue::Double),
        _ => SqlValue::Null,
    }
}
