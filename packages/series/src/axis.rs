//! Period axis: the authoritative row set of a series table.

use std::collections::BTreeSet;

use crime_dash_catalog_models::Period;

use crate::SeriesError;

/// Returns the catalog periods within `[start, end]`, ascending and
/// without duplicates.
///
/// Every merged table gets exactly one row per returned period, even
/// months in which the selected place had no incidents.
///
/// # Errors
///
/// Returns [`SeriesError::InvalidRange`] if `start > end` or either bound
/// is not a catalog period.
pub fn build_period_axis(
    catalog_periods: &[Period],
    start: Period,
    end: Period,
) -> Result<Vec<Period>, SeriesError> {
    let invalid = |reason: &str| SeriesError::InvalidRange {
        start,
        end,
        reason: reason.to_string(),
    };

    if start > end {
        return Err(invalid("start is after end"));
    }

    let catalog: BTreeSet<Period> = catalog_periods.iter().copied().collect();
    if !catalog.contains(&start) {
        return Err(invalid("start is not a catalog period"));
    }
    if !catalog.contains(&end) {
        return Err(invalid("end is not a catalog period"));
    }

    Ok(catalog.range(start..=end).copied().collect())
}
