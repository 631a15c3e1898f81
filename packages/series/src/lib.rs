#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime-rate series assembly.
//!
//! One dashboard rebuild runs, in order:
//!
//! 1. [`axis::build_period_axis`]: catalog periods inside the range,
//! 2. [`fetch`]: place, state and national series from the store,
//! 3. [`trend::fit_trend`]: least-squares line over the zero-filled place
//!    series,
//! 4. [`merge::merge_series`]: one row per axis period,
//! 5. [`variation::apply_variations`]: month-over-month change and its mean,
//! 6. [`chart::resolve_chart_spec`]: what to draw.
//!
//! [`pipeline::build_view`] wires these together for a
//! [`pipeline::SeriesRequest`].

pub mod axis;
pub mod chart;
pub mod fetch;
pub mod merge;
pub mod pipeline;
pub mod trend;
pub mod variation;

use crime_dash_catalog::StoreError;
use crime_dash_catalog_models::Period;
use crime_dash_series_models::OverlaySeries;
use thiserror::Error;

/// Errors that can occur while assembling a series.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// The requested range is inverted or a bound is not a catalog period.
    #[error("Invalid period range {start}..={end}: {reason}")]
    InvalidRange {
        /// Requested first period.
        start: Period,
        /// Requested last period.
        end: Period,
        /// What is wrong with it.
        reason: String,
    },

    /// The catalog holds no periods, so no range can be chosen.
    #[error("The catalog has no periods")]
    EmptyCatalog,

    /// A reference series that is assumed complete came back empty.
    #[error("No {series} reference data for place {place_code} in the requested range")]
    IncompleteReferenceData {
        /// Which reference series.
        series: OverlaySeries,
        /// Aggregate place code that was queried.
        place_code: String,
    },

    /// A reference series lacks a period of the axis.
    #[error("{series} series has no value for period {period}")]
    ReferenceSeriesMismatch {
        /// Which reference series.
        series: OverlaySeries,
        /// First axis period missing from it.
        period: Period,
    },

    /// Too few periods to fit a line.
    #[error("Trend needs at least 2 periods, got {periods}")]
    TrendUndefined {
        /// Number of periods available.
        periods: usize,
    },

    /// The place code is not in the catalog.
    #[error("Unknown place code '{code}'")]
    UnknownPlace {
        /// Rejected code.
        code: String,
    },

    /// The crime group code is not in the catalog.
    #[error("Unknown crime group code '{code}'")]
    UnknownCrimeGroup {
        /// Rejected code.
        code: String,
    },

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
