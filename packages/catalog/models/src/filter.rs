//! Backend-neutral row filters.
//!
//! A [`RowFilter`] is a conjunction of column comparisons. Store backends
//! translate it into their own query form: bound SQL parameters for the
//! relational store, predicates for the document store.

use serde::{Deserialize, Serialize};

use crate::{NATIONAL_PLACE_CODE, Period, columns, state_aggregate_code};

/// A fetched row: column name to JSON value, restricted to the table's
/// declared columns.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `column = value`
    Eq,
    /// `column >= value`
    Gte,
    /// `column <= value`
    Lte,
}

impl Comparison {
    /// Returns the SQL operator.
    #[must_use]
    pub const fn sql_operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }
}

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Real(f64),
    /// Text literal.
    Text(String),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Period> for FilterValue {
    fn from(value: Period) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// One `column <op> value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Physical column name.
    pub column: String,
    /// Operator.
    pub comparison: Comparison,
    /// Right-hand side literal.
    pub value: FilterValue,
}

/// A conjunction (`AND`) of conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowFilter {
    conditions: Vec<Condition>,
}

impl RowFilter {
    /// Creates an empty filter (matches every row).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Adds an arbitrary condition.
    #[must_use]
    pub fn with(
        mut self,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            comparison,
            value: value.into(),
        });
        self
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn equals(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(column, Comparison::Eq, value)
    }

    /// Adds `column >= value`.
    #[must_use]
    pub fn at_least(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(column, Comparison::Gte, value)
    }

    /// Adds `column <= value`.
    #[must_use]
    pub fn at_most(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(column, Comparison::Lte, value)
    }

    /// Returns the conditions in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether the filter has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// The only filter shape ever used against the crime-fact table: exact
/// place, exact crime group, inclusive period range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactFilter {
    /// Place code.
    pub place_code: String,
    /// Crime group code.
    pub group_code: String,
    /// First period (inclusive).
    pub start: Period,
    /// Last period (inclusive).
    pub end: Period,
}

impl FactFilter {
    /// Filter for a specific place.
    #[must_use]
    pub fn for_place(place_code: &str, group_code: &str, start: Period, end: Period) -> Self {
        Self {
            place_code: place_code.to_string(),
            group_code: group_code.to_string(),
            start,
            end,
        }
    }

    /// Filter for the nationwide aggregate.
    #[must_use]
    pub fn national(group_code: &str, start: Period, end: Period) -> Self {
        Self::for_place(NATIONAL_PLACE_CODE, group_code, start, end)
    }

    /// Filter for a state aggregate.
    #[must_use]
    pub fn state(group_code: &str, state_code: &str, start: Period, end: Period) -> Self {
        Self {
            place_code: state_aggregate_code(state_code),
            group_code: group_code.to_string(),
            start,
            end,
        }
    }
}

impl From<&FactFilter> for RowFilter {
    fn from(filter: &FactFilter) -> Self {
        Self::new()
            .equals(columns::PLACE_CODE, filter.place_code.as_str())
            .equals(columns::GROUP_CODE, filter.group_code.as_str())
            .at_least(columns::PERIOD, filter.start)
            .at_most(columns::PERIOD, filter.end)
    }
}
