//! Cumulative integration of uniformly sampled series.
//!
//! Two strategies with different error profiles:
//!
//! - **Trapezoidal**: time-domain cumulative trapezoid. Each integration
//!   step consumes one boundary sample, so order-k integration of N samples
//!   yields exactly N−k samples. Accumulates drift over long windows.
//! - **Dft**: frequency-domain integration. Transform, divide every
//!   non-DC bin by `(iω)^k`, zero the DC bin, transform back. Length is
//!   preserved and there is no cumulative drift, at the cost of assuming
//!   the windowed segment is (near-)periodic; artifacts near the window
//!   edges are an accepted limitation of the method.

use num_complex::Complex;
use rustfft::FftPlanner;

use axl_core::{Error, Result};

/// Integration strategy, selected at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationMethod {
    /// Time-domain cumulative trapezoid; output shrinks by one sample per
    /// order.
    #[default]
    Trapezoidal,
    /// Frequency-domain integration; output keeps the input length.
    Dft,
}

/// Integrate `series` `order` times with the given sample spacing.
///
/// Order 1 turns acceleration into velocity, order 2 into displacement.
/// The input is expected to be detrended; callers should detrend again
/// afterwards (see `crate::derive`).
pub fn integrate(
    series: &[f64],
    dt: f64,
    order: usize,
    method: IntegrationMethod,
) -> Result<Vec<f64>> {
    if series.is_empty() {
        return Err(Error::EmptySeries);
    }
    if !(dt.is_finite() && dt > 0.0) {
        return Err(Error::InvalidSpacing { dt });
    }
    if order == 0 {
        return Err(Error::InvalidOrder { order });
    }

    match method {
        IntegrationMethod::Trapezoidal => {
            if series.len() <= order {
                return Err(Error::InsufficientData {
                    required: order + 1,
                    available: series.len(),
                });
            }

            let mut out = series.to_vec();
            for _ in 0..order {
                out = cumtrapz(&out, dt);
            }
            Ok(out)
        }
        IntegrationMethod::Dft => Ok(dft_integrate(series, dt, order)),
    }
}

/// Cumulative trapezoidal integral; output is one sample shorter than the
/// input.
fn cumtrapz(series: &[f64], dt: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len() - 1);
    let mut acc = 0.0;
    for w in series.windows(2) {
        acc += 0.5 * (w[0] + w[1]) * dt;
        out.push(acc);
    }
    out
}

fn dft_integrate(series: &[f64], dt: f64, order: usize) -> Vec<f64> {
    let n = series.len();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut buf: Vec<Complex<f64>> = series.iter().map(|&v| Complex::new(v, 0.0)).collect();
    fft.process(&mut buf);

    for (k, c) in buf.iter_mut().enumerate() {
        if k == 0 {
            // Integrating the mean is division by zero; the DC component is
            // removed explicitly instead.
            *c = Complex::new(0.0, 0.0);
        } else {
            let omega = 2.0 * std::f64::consts::PI * bin_frequency(k, n, dt);
            *c /= Complex::new(0.0, omega).powi(order as i32);
        }
    }

    ifft.process(&mut buf);

    // rustfft leaves the inverse transform unnormalized.
    buf.iter().map(|c| c.re / n as f64).collect()
}

/// Frequency in Hz of DFT bin `k` for an `n`-point transform at spacing
/// `dt`; bins above `n / 2` are the negative frequencies.
fn bin_frequency(k: usize, n: usize, dt: f64) -> f64 {
    let n_f = n as f64;
    if k < n.div_ceil(2) {
        k as f64 / (n_f * dt)
    } else {
        (k as f64 - n_f) / (n_f * dt)
    }
}

/// Frequency axis of an `n`-point DFT at spacing `dt`.
pub fn frequency_axis(n: usize, dt: f64) -> Vec<f64> {
    (0..n).map(|k| bin_frequency(k, n, dt)).collect()
}
