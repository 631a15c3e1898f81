//! Column typing shared by both store backends.
//!
//! Document collections are loosely typed (codes may arrive as numbers,
//! counts as floats, Mongo exports wrap numbers in `{"$numberLong": ..}`),
//! while `DuckDB` columns are strictly typed. Both backends run their rows
//! and filter values through this module so that a query yields the same
//! logical result whichever store serves it.

use crime_dash_catalog_models::{CatalogTable, Column, ColumnType, Comparison, FilterValue, Row, RowFilter};
use serde_json::{Number, Value};

use crate::StoreError;

/// A filter condition checked against the table schema, with its value
/// converted to the column type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCondition {
    /// Declared column.
    pub column: &'static Column,
    /// Operator.
    pub comparison: Comparison,
    /// Value, already of the column's type.
    pub value: FilterValue,
}

/// Validates `filter` against the declared columns of `table` and coerces
/// every value to its column type.
///
/// # Errors
///
/// Returns [`StoreError::UnknownColumn`] for an undeclared column and
/// [`StoreError::Conversion`] for a value that does not fit its column.
pub fn resolve_filter(
    table: CatalogTable,
    filter: Option<&RowFilter>,
) -> Result<Vec<ResolvedCondition>, StoreError> {
    let Some(filter) = filter else {
        return Ok(Vec::new());
    };

    filter
        .conditions()
        .iter()
        .map(|condition| {
            let column =
                table
                    .column(&condition.column)
                    .ok_or_else(|| StoreError::UnknownColumn {
                        table,
                        column: condition.column.clone(),
                    })?;
            Ok(ResolvedCondition {
                column,
                comparison: condition.comparison,
                value: coerce_filter_value(column, &condition.value)?,
            })
        })
        .collect()
}

/// Restricts a raw document to the declared columns of `table`, coercing
/// each value. Undeclared keys (including the internal `_id`) are dropped
/// and missing columns become `null`.
///
/// # Errors
///
/// Returns [`StoreError::Conversion`] if a value does not fit its column.
pub fn project_row(table: CatalogTable, mut raw: Row) -> Result<Row, StoreError> {
    let mut row = Row::new();
    for column in table.columns() {
        let value = raw.remove(column.name).unwrap_or(Value::Null);
        row.insert(column.name.to_string(), coerce_value(column, value)?);
    }
    Ok(row)
}

/// Coerces a stored JSON value to the type of `column`.
///
/// # Errors
///
/// Returns [`StoreError::Conversion`] if the value cannot represent the
/// column type.
pub fn coerce_value(column: &Column, value: Value) -> Result<Value, StoreError> {
    let value = unwrap_extended_json(value);
    let mismatch = |value: &Value| StoreError::Conversion {
        message: format!(
            "value {value} does not fit {:?} column {}",
            column.ty, column.name
        ),
    };

    match (column.ty, value) {
        (_, Value::Null) => Ok(Value::Null),

        (ColumnType::Text, Value::String(s)) => Ok(Value::String(s)),
        (ColumnType::Text, Value::Number(n)) => Ok(Value::String(number_to_text(&n))),
        (ColumnType::Text, Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (ColumnType::Integer, Value::Number(n)) => {
            number_to_i64(&n).map(Value::from).ok_or_else(|| mismatch(&Value::Number(n)))
        }
        (ColumnType::Integer, Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            text_to_i64(trimmed)
                .map(Value::from)
                .ok_or_else(|| mismatch(&Value::String(s.clone())))
        }

        (ColumnType::Real, Value::Number(n)) => Ok(n
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)),
        (ColumnType::Real, Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(Value::Null);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| mismatch(&Value::String(s.clone())))
        }

        (_, other) => Err(mismatch(&other)),
    }
}

/// Coerces a filter literal to the type of `column`.
///
/// # Errors
///
/// Returns [`StoreError::Conversion`] if the literal cannot represent the
/// column type without changing the comparison's meaning.
pub fn coerce_filter_value(column: &Column, value: &FilterValue) -> Result<FilterValue, StoreError> {
    let mismatch = || StoreError::Conversion {
        message: format!(
            "filter value {value:?} does not fit {:?} column {}",
            column.ty, column.name
        ),
    };

    match (column.ty, value) {
        (ColumnType::Text, FilterValue::Text(s)) => Ok(FilterValue::Text(s.clone())),
        (ColumnType::Text, FilterValue::Integer(i)) => Ok(FilterValue::Text(i.to_string())),
        (ColumnType::Text, FilterValue::Real(f)) => Number::from_f64(*f)
            .map(|n| FilterValue::Text(number_to_text(&n)))
            .ok_or_else(mismatch),

        (ColumnType::Integer, FilterValue::Integer(i)) => Ok(FilterValue::Integer(*i)),
        (ColumnType::Integer, FilterValue::Real(f)) => {
            integral_f64_to_i64(*f).map(FilterValue::Integer).ok_or_else(mismatch)
        }
        (ColumnType::Integer, FilterValue::Text(s)) => {
            text_to_i64(s.trim()).map(FilterValue::Integer).ok_or_else(mismatch)
        }

        #[allow(clippy::cast_precision_loss)]
        (ColumnType::Real, FilterValue::Integer(i)) => Ok(FilterValue::Real(*i as f64)),
        (ColumnType::Real, FilterValue::Real(f)) => Ok(FilterValue::Real(*f)),
        (ColumnType::Real, FilterValue::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(FilterValue::Real)
            .map_err(|_| mismatch()),
    }
}

/// Unwraps Mongo extended JSON number wrappers such as
/// `{"$numberLong": "42"}`.
fn unwrap_extended_json(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 => {
            let Some((key, inner)) = map.iter().next() else {
                return Value::Object(map);
            };
            if key.starts_with("$number") {
                inner.clone()
            } else {
                Value::Object(map)
            }
        }
        other => other,
    }
}

fn number_to_text(n: &Number) -> String {
    number_to_i64(n).map_or_else(|| n.to_string(), |i| i.to_string())
}

fn number_to_i64(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().and_then(integral_f64_to_i64))
}

fn text_to_i64(s: &str) -> Option<i64> {
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(integral_f64_to_i64))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral_f64_to_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crime_dash_catalog_models::columns;
    use serde_json::json;

    fn column(table: CatalogTable, name: &str) -> &'static Column {
        table.column(name).unwrap()
    }

    #[test]
    fn projects_to_declared_columns_and_strips_id() {
        let raw = json!({
            "_id": {"$oid": "65a0f0"},
            "CVE_LUGAR": "P00",
            "Aniomes": {"$numberLong": "202401"},
            "Id_Agrupador_Delito": 7,
            "tasa": "12.5",
            "Num_Delitos": 30.0,
            "extra": true
        });
        let Value::Object(raw) = raw else { unreachable!() };

        let row = project_row(CatalogTable::CrimeFacts, raw).unwrap();

        assert_eq!(row.len(), CatalogTable::CrimeFacts.columns().len());
        assert!(!row.contains_key("_id"));
        assert!(!row.contains_key("extra"));
        assert_eq!(row[columns::PERIOD], json!(202_401));
        assert_eq!(row[columns::GROUP_CODE], json!("7"));
        assert_eq!(row[columns::RATE], json!(12.5));
        assert_eq!(row[columns::INCIDENTS], json!(30));
    }

    #[test]
    fn missing_columns_become_null() {
        let Value::Object(raw) = json!({"CVE_LUGAR": "E9"}) else {
            unreachable!()
        };
        let row = project_row(CatalogTable::Places, raw).unwrap();
        assert_eq!(row[columns::PLACE_NAME], Value::Null);
        assert_eq!(row[columns::STATE_CODE], Value::Null);
    }

    #[test]
    fn rejects_non_integral_values_for_integer_columns() {
        let col = column(CatalogTable::CrimeFacts, columns::INCIDENTS);
        assert!(coerce_value(col, json!(2.5)).is_err());
        assert!(coerce_value(col, json!("many")).is_err());
        assert_eq!(coerce_value(col, json!("")).unwrap(), Value::Null);
    }

    #[test]
    fn resolves_filter_values_to_column_types() {
        let filter = RowFilter::new()
            .equals(columns::GROUP_CODE, 11_i64)
            .at_least(columns::PERIOD, "202401");
        let resolved = resolve_filter(CatalogTable::CrimeFacts, Some(&filter)).unwrap();

        assert_eq!(resolved[0].value, FilterValue::Text("11".to_string()));
        assert_eq!(resolved[1].value, FilterValue::Integer(202_401));
    }

    #[test]
    fn rejects_undeclared_filter_columns() {
        let filter = RowFilter::new().equals("1=1; DROP TABLE x; --", "a");
        let err = resolve_filter(CatalogTable::CrimeFacts, Some(&filter)).unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }
}
