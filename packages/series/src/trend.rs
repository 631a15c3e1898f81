//! Ordinary least-squares trend over the place series.
//!
//! The regressor is the zero-based row index, not the period code, so the
//! gap between December and January counts as one step.

use crime_dash_series_models::{SeriesPoint, TrendPoint};

use crate::SeriesError;

/// Fits `rate = intercept + slope * index` to `points` and returns the
/// fitted value for every point's period.
///
/// `points` should already be zero-filled onto the period axis (see
/// [`crate::merge::zero_fill`]).
///
/// # Errors
///
/// Returns [`SeriesError::TrendUndefined`] for fewer than 2 points.
#[allow(clippy::cast_precision_loss)]
pub fn fit_trend(points: &[SeriesPoint]) -> Result<Vec<TrendPoint>, SeriesError> {
    let n = points.len();
    if n < 2 {
        return Err(SeriesError::TrendUndefined { periods: n });
    }

    let count = n as f64;
    let x_mean = (count - 1.0) / 2.0;
    let y_mean = points.iter().map(|p| p.rate).sum::<f64>() / count;

    let (sxy, sxx) = points
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, p)| {
            let dx = i as f64 - x_mean;
            (dx.mul_add(p.rate - y_mean, sxy), dx.mul_add(dx, sxx))
        });

    // sxx > 0 whenever n >= 2.
    let slope = sxy / sxx;
    let intercept = slope.mul_add(-x_mean, y_mean);

    Ok(points
        .iter()
        .enumerate()
        .map(|(i, p)| TrendPoint {
            period: p.period,
            value: slope.mul_add(i as f64, intercept),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::period;

    fn points(codes_and_rates: &[(u32, f64)]) -> Vec<SeriesPoint> {
        codes_and_rates
            .iter()
            .map(|(code, rate)| SeriesPoint {
                period: period(*code),
                rate: *rate,
                incidents: 0,
            })
            .collect()
    }

    #[test]
    fn perfect_line_is_reproduced() {
        let trend = fit_trend(&points(&[(202_401, 10.0), (202_402, 20.0), (202_403, 30.0)])).unwrap();
        let expected = [10.0, 20.0, 30.0];
        for (point, want) in trend.iter().zip(expected) {
            assert!(
                (point.value - want).abs() < 1e-9,
                "Expected {want}, got {}",
                point.value
            );
        }
        assert_eq!(trend[2].period, period(202_403));
    }

    #[test]
    fn uses_row_index_not_period_code() {
        // Dec -> Jan is one step, like any other month.
        let trend = fit_trend(&points(&[(202_311, 1.0), (202_312, 2.0), (202_401, 3.0)])).unwrap();
        assert!((trend[2].value - 3.0).abs() < 1e-9);
    }

    #[test]
    fn fits_least_squares_through_noise() {
        // y = 1, 3, 2, 4 -> slope 0.8, intercept 1.3
        let trend = fit_trend(&points(&[
            (202_401, 1.0),
            (202_402, 3.0),
            (202_403, 2.0),
            (202_404, 4.0),
        ]))
        .unwrap();
        assert!((trend[0].value - 1.3).abs() < 1e-9);
        assert!((trend[3].value - 3.7).abs() < 1e-9);
    }

    #[test]
    fn flat_series_gives_flat_trend() {
        let trend = fit_trend(&points(&[(202_401, 0.0), (202_402, 0.0)])).unwrap();
        assert!(trend.iter().all(|p| p.value.abs() < 1e-12));
    }

    #[test]
    fn undefined_below_two_points() {
        assert!(matches!(
            fit_trend(&points(&[(202_401, 5.0)])),
            Err(SeriesError::TrendUndefined { periods: 1 })
        ));
        assert!(matches!(
            fit_trend(&[]),
            Err(SeriesError::TrendUndefined { periods: 0 })
        ));
    }

    #[test]
    fn fit_is_deterministic() {
        let input = points(&[(202_401, 1.25), (202_402, 7.5), (202_403, 3.0)]);
        assert_eq!(fit_trend(&input).unwrap(), fit_trend(&input).unwrap());
    }
}
