#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the catalog and series types so the API contract can evolve on its
//! own.

use chrono::NaiveDate;
use crime_dash_catalog_models::{CrimeGroup, Period, Place, PlaceKind, PlaceSelector};
use crime_dash_series_models::{ChartSpec, SeriesRow, VariationSummary};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Catalog store backend in use.
    pub backend: String,
}

/// A catalog period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPeriod {
    /// `YYYYMM` code.
    pub code: u32,
    /// `YYYY-MM` label.
    pub label: String,
    /// First day of the month.
    pub date: NaiveDate,
}

impl From<Period> for ApiPeriod {
    fn from(period: Period) -> Self {
        Self {
            code: period.code(),
            label: period.to_string(),
            date: period.to_date(),
        }
    }
}

/// Response of the periods endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPeriods {
    /// Every catalog period, ascending.
    pub periods: Vec<ApiPeriod>,
    /// Start of the default range.
    pub default_start: Option<ApiPeriod>,
    /// End of the default range.
    pub default_end: Option<ApiPeriod>,
    /// Year of the latest period.
    pub max_year: Option<u32>,
}

/// A crime group with its member crime codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCrimeGroup {
    /// Group code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Member crime codes.
    pub crime_codes: Vec<String>,
}

impl ApiCrimeGroup {
    /// Builds the API form of `group`.
    #[must_use]
    pub fn new(group: &CrimeGroup, crime_codes: Vec<String>) -> Self {
        Self {
            code: group.code.clone(),
            name: group.name.clone(),
            crime_codes,
        }
    }
}

/// A place with its population at the catalog's latest year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlace {
    /// Place code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Kind.
    pub kind: PlaceKind,
    /// Enclosing state code, if any.
    pub state_code: Option<String>,
    /// Inhabitants, if known for the year.
    pub population: Option<u64>,
}

impl ApiPlace {
    /// Builds the API form of `place`.
    #[must_use]
    pub fn new(place: &Place, population: Option<u64>) -> Self {
        Self {
            code: place.code.clone(),
            name: place.name.clone(),
            kind: place.kind,
            state_code: place.enclosing_state().map(str::to_string),
            population,
        }
    }
}

/// Query parameters for the places endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesQueryParams {
    /// Which list to return.
    pub selector: PlaceSelector,
}

/// Response of the places endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlaces {
    /// Selector that produced the list.
    pub selector: PlaceSelector,
    /// Display label of the selector.
    pub label: String,
    /// Year the populations refer to.
    pub year: Option<u32>,
    /// Places, ordered by name.
    pub places: Vec<ApiPlace>,
}

/// Query parameters for the series endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesQueryParams {
    /// Place code.
    pub place: String,
    /// Crime group code.
    pub group: String,
    /// First period as `YYYYMM` or `YYYY-MM`.
    pub start: Option<String>,
    /// Last period as `YYYYMM` or `YYYY-MM`.
    pub end: Option<String>,
    /// Comma-separated overlays (`national`, `state`, `trend`).
    pub overlays: Option<String>,
    /// Comma-separated marks (`bar`, `line`), one per slot.
    pub marks: Option<String>,
    /// Slot 0 color.
    pub color1: Option<String>,
    /// Slot 1 color.
    pub color2: Option<String>,
    /// Slot 2 color.
    pub color3: Option<String>,
    /// Bar width.
    pub bar_width: Option<f64>,
    /// Line width.
    pub line_width: Option<f64>,
    /// Line style (`-`, `--`, `-.`, `:`, `None`).
    pub line_style: Option<String>,
}

/// Response of the series endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSeries {
    /// Selected place with its population.
    pub place: ApiPlace,
    /// Selected crime group.
    pub group: ApiCrimeGroup,
    /// First period of the table.
    pub start: ApiPeriod,
    /// Last period of the table.
    pub end: ApiPeriod,
    /// Year the place population refers to.
    pub population_year: Option<u32>,
    /// Merged rows.
    pub rows: Vec<SeriesRow>,
    /// Whether the trend column is present.
    pub has_trend: bool,
    /// Mean variation.
    pub variation: VariationSummary,
    /// What to draw.
    pub chart: ChartSpec,
    /// Degradations applied while building the series.
    pub warnings: Vec<String>,
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable kind.
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_serializes_code_label_and_date() {
        let json = serde_json::to_value(ApiPeriod::from(Period::from_code(202_402).unwrap())).unwrap();
        assert_eq!(json["code"], 202_402);
        assert_eq!(json["label"], "2024-02");
        assert_eq!(json["date"], "2024-02-01");
    }

    #[test]
    fn national_place_has_no_state_code() {
        let place = Place {
            code: "P00".to_string(),
            name: "Nacional".to_string(),
            kind: PlaceKind::Country,
            local_code: None,
            state_code: Some("0".to_string()),
        };
        let api = ApiPlace::new(&place, Some(130_000_000));
        assert_eq!(api.state_code, None);
        assert_eq!(api.population, Some(130_000_000));
    }
}
