//! Velocity and displacement derivation.
//!
//! The full recipe for turning raw vertical acceleration into a usable
//! motion series: detrend, integrate, detrend again. The trailing detrend
//! matters because any residual constant or linear term in acceleration
//! shows up as a linear or quadratic ramp after integration.

use axl_core::{Result, Timestamp};

use crate::detrend::detrend;
use crate::integrate::{frequency_axis, integrate, IntegrationMethod};

/// A quantity derived from an acceleration series, with its time axis
/// trimmed to whatever length the integration step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    /// DFT bin frequencies (Hz) when the frequency-domain method was used,
    /// `None` for time-domain integration.
    pub frequencies: Option<Vec<f64>>,
    /// The derived samples: velocity in m/s or displacement in m.
    pub values: Vec<f64>,
    /// Absolute timestamp of each value, aligned to the input's start.
    pub time: Vec<Timestamp>,
}

/// Vertical velocity from vertical acceleration.
pub fn velocity(
    z: &[f64],
    dt: f64,
    start: Timestamp,
    method: IntegrationMethod,
) -> Result<DerivedSeries> {
    derive(z, dt, start, 1, method)
}

/// Vertical displacement from vertical acceleration.
pub fn displacement(
    z: &[f64],
    dt: f64,
    start: Timestamp,
    method: IntegrationMethod,
) -> Result<DerivedSeries> {
    derive(z, dt, start, 2, method)
}

fn derive(
    z: &[f64],
    dt: f64,
    start: Timestamp,
    order: usize,
    method: IntegrationMethod,
) -> Result<DerivedSeries> {
    let accel = detrend(z)?;
    let integrated = integrate(&accel, dt, order, method)?;
    let values = detrend(&integrated)?;

    let frequencies = match method {
        IntegrationMethod::Dft => Some(frequency_axis(z.len(), dt)),
        IntegrationMethod::Trapezoidal => None,
    };

    Ok(DerivedSeries {
        frequencies,
        time: time_axis(start, dt, values.len()),
        values,
    })
}

/// Uniform time axis of `n` samples from `start` at spacing `dt`.
pub fn time_axis(start: Timestamp, dt: f64, n: usize) -> Vec<Timestamp> {
    let period = (dt * 1_000_000_000.0).round() as i64;
    (0..n as i64)
        .map(|i| Timestamp::from_nanos(start.as_nanos() + i * period))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn wave(n: usize, cycles: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * cycles * i as f64 / n as f64).sin())
            .collect()
    }

    #[test]
    fn test_velocity_time_domain_length_and_axis() {
        let n = 1024;
        let dt = 1.0 / 52.0;
        let start = Timestamp::from_secs_f64(100.0);

        let v = velocity(&wave(n, 6.0), dt, start, IntegrationMethod::Trapezoidal).unwrap();
        assert_eq!(v.values.len(), n - 1);
        assert_eq!(v.time.len(), n - 1);
        assert_eq!(v.time[0], start);
        assert!(v.frequencies.is_none());
    }

    #[test]
    fn test_displacement_time_domain_length() {
        let n = 1024;
        let dt = 1.0 / 20.8;
        let start = Timestamp::from_secs_f64(0.0);

        let u = displacement(&wave(n, 6.0), dt, start, IntegrationMethod::Trapezoidal).unwrap();
        assert_eq!(u.values.len(), n - 2);
        assert_eq!(u.time.len(), n - 2);
    }

    #[test]
    fn test_dft_derivation_keeps_length_and_reports_frequencies() {
        let n = 512;
        let dt = 1.0 / 52.0;
        let start = Timestamp::from_secs_f64(0.0);

        let u = displacement(&wave(n, 8.0), dt, start, IntegrationMethod::Dft).unwrap();
        assert_eq!(u.values.len(), n);
        assert_eq!(u.time.len(), n);

        let freqs = u.frequencies.unwrap();
        assert_eq!(freqs.len(), n);
        assert_eq!(freqs[0], 0.0);
    }

    #[test]
    fn test_displacement_amplitude_of_known_wave() {
        // Acceleration a = A sin(ωt) corresponds to displacement
        // u = -A/ω² sin(ωt); a 0.5 m wave at a typical swell period should
        // come back with that amplitude.
        let n = 2048;
        let dt = 1.0 / 52.0;
        let cycles = 4.0; // one cycle ≈ 9.8 s
        let omega = 2.0 * PI * cycles / (n as f64 * dt);
        let amp_u = 0.5;
        let amp_a = amp_u * omega * omega;

        let z: Vec<f64> = (0..n)
            .map(|i| amp_a * (omega * i as f64 * dt).sin())
            .collect();

        let u = displacement(&z, dt, Timestamp::from_secs_f64(0.0), IntegrationMethod::Dft)
            .unwrap();

        let max = u.values.iter().cloned().fold(f64::MIN, f64::max);
        assert_abs_diff_eq!(max, amp_u, epsilon = 1e-3);
    }

    #[test]
    fn test_constant_acceleration_derives_to_nothing() {
        // A pure calibration offset carries no wave information; after
        // detrend → integrate → detrend it must vanish instead of growing
        // quadratically.
        let z = vec![9.81; 256];
        let u = displacement(
            &z,
            1.0 / 20.8,
            Timestamp::from_secs_f64(0.0),
            IntegrationMethod::Trapezoidal,
        )
        .unwrap();

        for v in &u.values {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let r = velocity(
            &[],
            0.05,
            Timestamp::from_secs_f64(0.0),
            IntegrationMethod::Dft,
        );
        assert!(r.is_err());
    }
}
