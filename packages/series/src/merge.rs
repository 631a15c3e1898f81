//! Alignment of every series onto the period axis.
//!
//! The axis is authoritative. The place series is left-joined (a missing
//! month means zero incidents); trend, national and state series are
//! inner-joined and must cover every axis period.

use std::collections::BTreeMap;

use crime_dash_catalog_models::Period;
use crime_dash_series_models::{OverlaySeries, SeriesPoint, SeriesRow, SeriesTable, TrendPoint};

use crate::SeriesError;

/// Source of the state column.
#[derive(Debug, Clone, Copy)]
pub enum StateReference<'a> {
    /// The place's enclosing state series.
    Series(&'a [SeriesPoint]),
    /// The place has no enclosing state; the state column copies the
    /// national one.
    NationalFallback,
}

/// Left-joins `place` onto `axis`, filling months without data with a zero
/// rate and zero incidents.
#[must_use]
pub fn zero_fill(axis: &[Period], place: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let by_period: BTreeMap<Period, &SeriesPoint> = place.iter().map(|p| (p.period, p)).collect();

    axis.iter()
        .map(|period| {
            by_period.get(period).map_or(
                SeriesPoint {
                    period: *period,
                    rate: 0.0,
                    incidents: 0,
                },
                |p| **p,
            )
        })
        .collect()
}

/// Merges all series into one table with a row per axis period.
///
/// `trend` is `None` when the trend was omitted; the table then reports
/// [`SeriesTable::has_trend`] as `false`.
///
/// # Errors
///
/// Returns [`SeriesError::ReferenceSeriesMismatch`] naming the first axis
/// period missing from the trend, national or state series.
pub fn merge_series(
    axis: &[Period],
    place: &[SeriesPoint],
    trend: Option<&[TrendPoint]>,
    national: &[SeriesPoint],
    state: StateReference<'_>,
) -> Result<SeriesTable, SeriesError> {
    let filled = zero_fill(axis, place);

    let trend_values = trend
        .map(|points| {
            let lookup: BTreeMap<Period, f64> = points.iter().map(|p| (p.period, p.value)).collect();
            inner_join(axis, &lookup, OverlaySeries::Trend)
        })
        .transpose()?;

    let national_values = inner_join(axis, &rates_by_period(national), OverlaySeries::National)?;

    let state_values = match state {
        StateReference::Series(points) => {
            inner_join(axis, &rates_by_period(points), OverlaySeries::State)?
        }
        StateReference::NationalFallback => national_values.clone(),
    };

    let rows = filled
        .iter()
        .enumerate()
        .map(|(i, point)| SeriesRow {
            period: point.period,
            rate: point.rate,
            incidents: point.incidents,
            state_rate: state_values[i],
            national_rate: national_values[i],
            trend: trend_values.as_ref().map(|values| values[i]),
            variation: None,
        })
        .collect();

    Ok(SeriesTable::new(rows, trend_values.is_some()))
}

fn rates_by_period(points: &[SeriesPoint]) -> BTreeMap<Period, f64> {
    points.iter().map(|p| (p.period, p.rate)).collect()
}

fn inner_join(
    axis: &[Period],
    values: &BTreeMap<Period, f64>,
    series: OverlaySeries,
) -> Result<Vec<f64>, SeriesError> {
    axis.iter()
        .map(|period| {
            values
                .get(period)
                .copied()
                .ok_or(SeriesError::ReferenceSeriesMismatch {
                    series,
                    period: *period,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{period, periods};

    fn series(codes_and_rates: &[(u32, f64)]) -> Vec<SeriesPoint> {
        codes_and_rates
            .iter()
            .map(|(code, rate)| SeriesPoint {
                period: period(*code),
                rate: *rate,
                incidents: 1,
            })
            .collect()
    }

    fn axis() -> Vec<Period> {
        periods(&[202_401, 202_402, 202_403])
    }

    fn national() -> Vec<SeriesPoint> {
        series(&[(202_401, 5.0), (202_402, 6.0), (202_403, 7.0)])
    }

    #[test]
    fn place_without_rows_is_all_zero() {
        let table = merge_series(&axis(), &[], None, &national(), StateReference::NationalFallback)
            .unwrap();
        assert_eq!(table.len(), 3, "No axis row may be dropped");
        assert!(table.rows().iter().all(|r| r.rate == 0.0 && r.incidents == 0));
        assert_eq!(table.periods(), axis());
    }

    #[test]
    fn place_gaps_are_zero_filled() {
        let place = series(&[(202_402, 2.0)]);
        let table = merge_series(&axis(), &place, None, &national(), StateReference::NationalFallback)
            .unwrap();
        assert_eq!(table.rates(), vec![0.0, 2.0, 0.0]);
        assert_eq!(table.rows()[1].incidents, 1);
    }

    #[test]
    fn place_rows_outside_axis_are_ignored() {
        let place = series(&[(202_312, 9.0), (202_401, 1.0)]);
        let table = merge_series(&axis(), &place, None, &national(), StateReference::NationalFallback)
            .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rates()[0], 1.0);
    }

    #[test]
    fn missing_national_period_is_a_mismatch() {
        let national = series(&[(202_401, 5.0), (202_403, 7.0)]);
        let err = merge_series(&axis(), &[], None, &national, StateReference::NationalFallback)
            .unwrap_err();
        match err {
            SeriesError::ReferenceSeriesMismatch { series, period: p } => {
                assert_eq!(series, OverlaySeries::National);
                assert_eq!(p, period(202_402));
            }
            other => panic!("Expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_state_period_is_a_mismatch() {
        let state = series(&[(202_401, 1.0)]);
        let err = merge_series(&axis(), &[], None, &national(), StateReference::Series(&state))
            .unwrap_err();
        assert!(matches!(
            err,
            SeriesError::ReferenceSeriesMismatch {
                series: OverlaySeries::State,
                ..
            }
        ));
    }

    #[test]
    fn misaligned_trend_is_a_mismatch() {
        let trend = vec![TrendPoint {
            period: period(202_401),
            value: 1.0,
        }];
        let err = merge_series(
            &axis(),
            &[],
            Some(&trend),
            &national(),
            StateReference::NationalFallback,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SeriesError::ReferenceSeriesMismatch {
                series: OverlaySeries::Trend,
                ..
            }
        ));
    }

    #[test]
    fn national_selection_copies_national_into_state() {
        let table = merge_series(&axis(), &[], None, &national(), StateReference::NationalFallback)
            .unwrap();
        for row in table.rows() {
            assert_eq!(row.state_rate, row.national_rate);
        }
    }

    #[test]
    fn merges_every_column() {
        let place = series(&[(202_401, 1.0), (202_402, 2.0), (202_403, 3.0)]);
        let state = series(&[(202_401, 4.0), (202_402, 4.5), (202_403, 5.0), (202_404, 9.0)]);
        let trend: Vec<TrendPoint> = axis()
            .into_iter()
            .zip([1.0, 2.0, 3.0])
            .map(|(period, value)| TrendPoint { period, value })
            .collect();

        let table = merge_series(
            &axis(),
            &place,
            Some(&trend),
            &national(),
            StateReference::Series(&state),
        )
        .unwrap();

        assert!(table.has_trend());
        let row = table.rows()[1];
        assert_eq!(row.rate, 2.0);
        assert_eq!(row.state_rate, 4.5);
        assert_eq!(row.national_rate, 6.0);
        assert_eq!(row.trend, Some(2.0));
        assert_eq!(row.variation, None);
    }
}
