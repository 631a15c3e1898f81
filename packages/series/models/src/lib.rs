#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Series table and chart types.
//!
//! A [`SeriesTable`] is the merged, period-aligned result of one dashboard
//! rebuild: the selected place's rate next to the state and national
//! reference rates, the fitted trend and the period-over-period variation.
//! Its serialized column names are the ones the chart layer addresses
//! (see [`columns`]).

pub mod chart;

use crime_dash_catalog_models::Period;
use serde::{Deserialize, Serialize};

pub use chart::{
    ChartEntry, ChartSpec, ChartToggles, LineStyle, MarkStyle, OverlaySeries,
};

/// Column names of a [`SeriesTable`].
pub mod columns {
    /// Place rate.
    pub const PLACE_RATE: &str = "tasa";
    /// Place incident count.
    pub const PLACE_INCIDENTS: &str = "Num_Delitos";
    /// State reference rate.
    pub const STATE_RATE: &str = "tasa_est";
    /// National reference rate.
    pub const NATIONAL_RATE: &str = "tasa_nal";
    /// Fitted linear trend of the place rate.
    pub const TREND: &str = "rate_regression";
    /// Period-over-period variation of the place rate, in percent.
    pub const VARIATION: &str = "Variacion";
}

/// One observation of a fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Month of the observation.
    pub period: Period,
    /// Incidents per 100k inhabitants.
    pub rate: f64,
    /// Raw incident count.
    pub incidents: u64,
}

/// One fitted value of the trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Month the value is predicted for.
    pub period: Period,
    /// Predicted rate.
    pub value: f64,
}

/// One period of the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// Row key.
    #[serde(rename = "Aniomes")]
    pub period: Period,
    /// Place rate, zero when the place had no data.
    #[serde(rename = "tasa")]
    pub rate: f64,
    /// Place incident count, zero when the place had no data.
    #[serde(rename = "Num_Delitos")]
    pub incidents: u64,
    /// State reference rate.
    #[serde(rename = "tasa_est")]
    pub state_rate: f64,
    /// National reference rate.
    #[serde(rename = "tasa_nal")]
    pub national_rate: f64,
    /// Trend value, absent when the trend was omitted.
    #[serde(rename = "rate_regression")]
    pub trend: Option<f64>,
    /// Variation from the previous row in percent, absent for the first
    /// row and wherever the change is not finite.
    #[serde(rename = "Variacion")]
    pub variation: Option<f64>,
}

/// The merged series for one place, crime group and period range.
///
/// Rows are ascending by period with exactly one row per catalog period in
/// the requested range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTable {
    rows: Vec<SeriesRow>,
    has_trend: bool,
}

impl SeriesTable {
    /// Wraps merged rows. `has_trend` must be `true` only if every row
    /// carries a trend value.
    #[must_use]
    pub const fn new(rows: Vec<SeriesRow>, has_trend: bool) -> Self {
        Self { rows, has_trend }
    }

    /// Returns the rows.
    #[must_use]
    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    /// Writes the variation column. Extra values are ignored and missing
    /// ones leave the row undefined.
    pub fn set_variations(&mut self, variations: &[Option<f64>]) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.variation = variations.get(i).copied().flatten();
        }
    }

    /// Whether the trend column is present.
    #[must_use]
    pub const fn has_trend(&self) -> bool {
        self.has_trend
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row periods.
    #[must_use]
    pub fn periods(&self) -> Vec<Period> {
        self.rows.iter().map(|r| r.period).collect()
    }

    /// Returns the place rate column.
    #[must_use]
    pub fn rates(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.rate).collect()
    }

    /// Names of the columns present in this table.
    #[must_use]
    pub fn available_columns(&self) -> Vec<&'static str> {
        let mut names = vec![
            columns::PLACE_RATE,
            columns::PLACE_INCIDENTS,
            columns::STATE_RATE,
            columns::NATIONAL_RATE,
        ];
        if self.has_trend {
            names.push(columns::TREND);
        }
        names.push(columns::VARIATION);
        names
    }

    /// Returns a numeric column by name, or `None` if the table has no
    /// such column.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let extract: fn(&SeriesRow) -> Option<f64> = match name {
            columns::PLACE_RATE => |r| Some(r.rate),
            columns::PLACE_INCIDENTS => |r| Some(r.incidents as f64),
            columns::STATE_RATE => |r| Some(r.state_rate),
            columns::NATIONAL_RATE => |r| Some(r.national_rate),
            columns::TREND if self.has_trend => |r| r.trend,
            columns::VARIATION => |r| r.variation,
            _ => return None,
        };
        Some(self.rows.iter().map(extract).collect())
    }
}

/// Summary of the variation column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationSummary {
    /// Mean of the defined variations rounded to one decimal, absent when
    /// no variation is defined.
    pub mean_variation: Option<f64>,
    /// Number of rows with a defined variation.
    pub defined_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: u32, rate: f64) -> SeriesRow {
        SeriesRow {
            period: Period::from_code(code).unwrap(),
            rate,
            incidents: 3,
            state_rate: 1.0,
            national_rate: 2.0,
            trend: None,
            variation: None,
        }
    }

    #[test]
    fn trend_column_is_absent_without_trend() {
        let table = SeriesTable::new(vec![row(202_401, 1.0)], false);
        assert!(table.column(columns::TREND).is_none());
        assert!(!table.available_columns().contains(&columns::TREND));
        assert_eq!(table.column(columns::NATIONAL_RATE), Some(vec![Some(2.0)]));
        assert!(table.column("nope").is_none());
    }

    #[test]
    fn set_variations_aligns_by_index() {
        let mut table = SeriesTable::new(vec![row(202_401, 1.0), row(202_402, 2.0)], false);
        table.set_variations(&[None, Some(100.0)]);
        assert_eq!(
            table.column(columns::VARIATION),
            Some(vec![None, Some(100.0)])
        );
    }

    #[test]
    fn rows_serialize_with_stable_column_names() {
        let json = serde_json::to_value(row(202_401, 1.5)).unwrap();
        for name in [
            columns::PLACE_RATE,
            columns::PLACE_INCIDENTS,
            columns::STATE_RATE,
            columns::NATIONAL_RATE,
            columns::TREND,
            columns::VARIATION,
        ] {
            assert!(json.get(name).is_some(), "Missing column {name}");
        }
        assert_eq!(json["Aniomes"], 202_401);
    }
}
