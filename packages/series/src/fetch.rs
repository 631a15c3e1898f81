//! Place, state and national series retrieval.
//!
//! All three fetches use the same [`FactFilter`] shape, so they behave the
//! same on every [`CatalogStore`] backend.

use std::collections::BTreeMap;

use crime_dash_catalog::CatalogStore;
use crime_dash_catalog::queries::fetch_facts;
use crime_dash_catalog_models::{CrimeFact, FactFilter, NATIONAL_PLACE_CODE, Period};
use crime_dash_series_models::{OverlaySeries, SeriesPoint};

use crate::SeriesError;

/// Fetches the series of one place. An empty result is valid: the place
/// had no incidents of the group in the range.
///
/// # Errors
///
/// Returns [`SeriesError::Store`] if the store query fails.
pub fn fetch_place_series(
    store: &dyn CatalogStore,
    place_code: &str,
    group_code: &str,
    start: Period,
    end: Period,
) -> Result<Vec<SeriesPoint>, SeriesError> {
    let filter = FactFilter::for_place(place_code, group_code, start, end);
    Ok(to_points(fetch_facts(store, &filter)?))
}

/// Fetches the nationwide aggregate series.
///
/// # Errors
///
/// Returns [`SeriesError::IncompleteReferenceData`] if the store has no
/// national rows in the range, or [`SeriesError::Store`] if the query
/// fails.
pub fn fetch_national_series(
    store: &dyn CatalogStore,
    group_code: &str,
    start: Period,
    end: Period,
) -> Result<Vec<SeriesPoint>, SeriesError> {
    let filter = FactFilter::national(group_code, start, end);
    let points = to_points(fetch_facts(store, &filter)?);
    if points.is_empty() {
        return Err(SeriesError::IncompleteReferenceData {
            series: OverlaySeries::National,
            place_code: NATIONAL_PLACE_CODE.to_string(),
        });
    }
    Ok(points)
}

/// Fetches the aggregate series of the state with code `state_code`.
///
/// # Errors
///
/// Returns [`SeriesError::Store`] if the store query fails.
pub fn fetch_state_series(
    store: &dyn CatalogStore,
    group_code: &str,
    state_code: &str,
    start: Period,
    end: Period,
) -> Result<Vec<SeriesPoint>, SeriesError> {
    let filter = FactFilter::state(group_code, state_code, start, end);
    Ok(to_points(fetch_facts(store, &filter)?))
}

/// Orders facts by period. A repeated period breaks the one-row-per-key
/// invariant of the fact table; the last row wins.
fn to_points(facts: Vec<CrimeFact>) -> Vec<SeriesPoint> {
    let mut by_period = BTreeMap::new();
    for fact in facts {
        let point = SeriesPoint {
            period: fact.period,
            rate: fact.rate,
            incidents: fact.incidents,
        };
        if by_period.insert(fact.period, point).is_some() {
            log::warn!(
                "Duplicate fact row for place {} group {} period {}",
                fact.place_code,
                fact.group_code,
                fact.period
            );
        }
    }
    by_period.into_values().collect()
}
