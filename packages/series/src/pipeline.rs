//! One dashboard rebuild, from a request to everything the view shows.

use crime_dash_catalog::{CatalogSnapshot, CatalogStore};
use crime_dash_catalog_models::{CrimeGroup, Period, Place};
use crime_dash_series_models::{
    ChartSpec, ChartToggles, OverlaySeries, SeriesTable, VariationSummary,
};
use serde::{Deserialize, Serialize};

use crate::SeriesError;
use crate::axis::build_period_axis;
use crate::chart::{chart_title, resolve_chart_spec};
use crate::fetch::{fetch_national_series, fetch_place_series, fetch_state_series};
use crate::merge::{StateReference, merge_series, zero_fill};
use crate::trend::fit_trend;
use crate::variation::apply_variations;

/// Number of periods shown when the request names no range.
pub const DEFAULT_RANGE_PERIODS: usize = 12;

/// A user's selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRequest {
    /// Place code.
    pub place_code: String,
    /// Crime group code.
    pub group_code: String,
    /// First period; defaults to the start of the default range.
    pub start: Option<Period>,
    /// Last period; defaults to the latest catalog period.
    pub end: Option<Period>,
    /// Chart controls.
    pub toggles: ChartToggles,
}

/// Everything a rebuild produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Selected place.
    pub place: Place,
    /// Selected crime group.
    pub group: CrimeGroup,
    /// First period of the table.
    pub start: Period,
    /// Last period of the table.
    pub end: Period,
    /// Merged series.
    pub table: SeriesTable,
    /// Mean variation.
    pub variation: VariationSummary,
    /// What to draw.
    pub chart: ChartSpec,
    /// Population of the place at `population_year`.
    pub population: Option<u64>,
    /// Latest catalog year.
    pub population_year: Option<u32>,
    /// Degradations applied during the rebuild.
    pub warnings: Vec<String>,
}

/// Resolves the request's range against the catalog.
///
/// # Errors
///
/// Returns [`SeriesError::EmptyCatalog`] if a bound must be defaulted but
/// the catalog has no periods.
pub fn resolve_range(
    snapshot: &CatalogSnapshot,
    start: Option<Period>,
    end: Option<Period>,
) -> Result<(Period, Period), SeriesError> {
    if let (Some(start), Some(end)) = (start, end) {
        return Ok((start, end));
    }
    let (default_start, default_end) = snapshot
        .default_range(DEFAULT_RANGE_PERIODS)
        .ok_or(SeriesError::EmptyCatalog)?;
    Ok((start.unwrap_or(default_start), end.unwrap_or(default_end)))
}

/// Runs the full rebuild for `request`.
///
/// # Errors
///
/// Returns [`SeriesError`] if the selection is not in the catalog, the
/// range is invalid, a reference series is incomplete, or the store fails.
/// An undefined trend is not an error: the trend is omitted and a warning
/// is recorded.
pub fn build_view(
    snapshot: &CatalogSnapshot,
    store: &dyn CatalogStore,
    request: &SeriesRequest,
) -> Result<DashboardView, SeriesError> {
    let place = snapshot
        .place(&request.place_code)
        .ok_or_else(|| SeriesError::UnknownPlace {
            code: request.place_code.clone(),
        })?;
    let group = snapshot
        .crime_group(&request.group_code)
        .ok_or_else(|| SeriesError::UnknownCrimeGroup {
            code: request.group_code.clone(),
        })?;

    let (start, end) = resolve_range(snapshot, request.start, request.end)?;
    let axis = build_period_axis(snapshot.periods(), start, end)?;
    log::debug!(
        "build_view: place={} group={} {} periods",
        place.code,
        group.code,
        axis.len()
    );

    let mut warnings = Vec::new();

    let place_series = fetch_place_series(store, &place.code, &group.code, start, end)?;
    let national = fetch_national_series(store, &group.code, start, end)?;
    let state_series = match place.enclosing_state() {
        Some(state_code) => Some(fetch_state_series(
            store,
            &group.code,
            state_code,
            start,
            end,
        )?),
        None => None,
    };
    let state = state_series
        .as_deref()
        .map_or(StateReference::NationalFallback, StateReference::Series);

    let trend = match fit_trend(&zero_fill(&axis, &place_series)) {
        Ok(trend) => Some(trend),
        Err(SeriesError::TrendUndefined { periods }) => {
            log::warn!("Omitting trend for place {}: {periods} period(s)", place.code);
            warnings.push(format!(
                "Trend omitted: at least 2 periods are needed, the range has {periods}"
            ));
            None
        }
        Err(e) => return Err(e),
    };

    let mut table = merge_series(&axis, &place_series, trend.as_deref(), &national, state)?;
    let variation = apply_variations(&mut table);

    if !table.has_trend() && request.toggles.overlays.contains(&OverlaySeries::Trend) {
        warnings.push("Trend overlay dropped because the trend was omitted".to_string());
    }
    let chart = resolve_chart_spec(
        &request.toggles,
        &table.available_columns(),
        &chart_title(&group.name, &place.name),
    );

    let population_year = snapshot.max_year();
    let population = population_year.and_then(|year| snapshot.population_for(place, year));

    Ok(DashboardView {
        place: place.clone(),
        group: group.clone(),
        start,
        end,
        table,
        variation,
        chart,
        population,
        population_year,
        warnings,
    })
}
