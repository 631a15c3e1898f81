//! Period-over-period variation of the place rate.

use crime_dash_series_models::{SeriesTable, VariationSummary};

/// Percentage change of each rate from the previous one.
///
/// The first value is always `None`. A change that is not finite (division
/// by a zero rate, including `0 / 0`) is `None` as well.
#[must_use]
pub fn period_variations(rates: &[f64]) -> Vec<Option<f64>> {
    let mut variations = Vec::with_capacity(rates.len());
    if rates.is_empty() {
        return variations;
    }

    variations.push(None);
    variations.extend(rates.windows(2).map(|pair| {
        let change = (pair[1] - pair[0]) / pair[0] * 100.0;
        change.is_finite().then_some(change)
    }));
    variations
}

/// Mean of the defined variations, rounded to one decimal with ties to
/// even. `None` when no variation is defined.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_variation(variations: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = variations.iter().flatten().copied().collect();
    if defined.is_empty() {
        return None;
    }
    let mean = defined.iter().sum::<f64>() / defined.len() as f64;
    Some((mean * 10.0).round_ties_even() / 10.0)
}

/// Fills the variation column of `table` and summarizes it.
pub fn apply_variations(table: &mut SeriesTable) -> VariationSummary {
    let variations = period_variations(&table.rates());
    table.set_variations(&variations);

    VariationSummary {
        mean_variation: mean_variation(&variations),
        defined_count: variations.iter().flatten().count(),
    }
}
