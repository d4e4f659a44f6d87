//! Linear trend removal.
//!
//! A small calibration offset in acceleration integrates into unbounded
//! drift in velocity and displacement, so every series is detrended before
//! integration and the result detrended again afterwards: a residual
//! constant or linear term in acceleration becomes a linear or quadratic
//! term in displacement.

use axl_core::{Error, Result};

/// Remove the least-squares linear fit `y = m x + b` from `series`.
///
/// For a single sample this reduces to subtracting the mean. An empty
/// input is a precondition violation.
pub fn detrend(series: &[f64]) -> Result<Vec<f64>> {
    if series.is_empty() {
        return Err(Error::EmptySeries);
    }

    let n = series.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = series.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in series.iter().enumerate() {
        let x = i as f64;
        numerator += (x - x_mean) * (y - y_mean);
        denominator += (x - x_mean).powi(2);
    }

    let slope = if denominator.abs() > 1e-10 {
        numerator / denominator
    } else {
        0.0
    };
    let intercept = y_mean - slope * x_mean;

    Ok(series
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (slope * i as f64 + intercept))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_detrend_rejects_empty() {
        assert!(detrend(&[]).is_err());
    }

    #[test]
    fn test_detrend_removes_ramp() {
        let ramp: Vec<f64> = (0..512).map(|i| 0.3 * i as f64 - 7.0).collect();
        let residual = detrend(&ramp).unwrap();

        let mean = residual.iter().sum::<f64>() / residual.len() as f64;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);

        let slope =
            (residual.last().unwrap() - residual.first().unwrap()) / (residual.len() - 1) as f64;
        assert_abs_diff_eq!(slope, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_detrend_removes_constant_offset() {
        let series = vec![9.81; 100];
        let residual = detrend(&series).unwrap();
        for v in residual {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_detrend_preserves_oscillation() {
        // A zero-mean sine over whole periods should pass through nearly
        // unchanged.
        let n = 256;
        let series: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 4.0 * i as f64 / n as f64).sin())
            .collect();
        let residual = detrend(&series).unwrap();
        for (r, s) in residual.iter().zip(&series) {
            assert_abs_diff_eq!(r, s, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_detrend_single_sample() {
        let residual = detrend(&[3.5]).unwrap();
        assert_eq!(residual, vec![0.0]);
    }
}
