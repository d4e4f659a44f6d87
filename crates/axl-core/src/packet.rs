//! Accelerometer burst packets.
//!
//! A buoy samples vertical acceleration continuously, fills a fixed-length
//! block, and transmits it opportunistically over the modem. Transmission
//! order and data order are unrelated: packets arrive late, out of order,
//! and occasionally twice. The reception metadata (`received`, `storage_id`)
//! reflects the backend's view and is kept for latency analysis only; all
//! ordering of the data itself goes by `start`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Timestamp;

/// One immutable accelerometer burst with its metadata.
///
/// Samples are uniformly spaced at `frequency`; the struct cannot be
/// modified after construction. Clipping produces a new trimmed packet
/// rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxlPacket {
    start: Timestamp,
    frequency: f64,
    z: Vec<f64>,
    received: Timestamp,
    storage_id: u64,
    lon: f64,
    lat: f64,
}

impl AxlPacket {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start: Timestamp,
        frequency: f64,
        z: Vec<f64>,
        received: Timestamp,
        storage_id: u64,
        lon: f64,
        lat: f64,
    ) -> Result<Self> {
        if z.is_empty() {
            return Err(Error::InvalidPacket("no samples".into()));
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(Error::InvalidPacket(format!(
                "non-positive frequency: {frequency}"
            )));
        }

        Ok(Self {
            start,
            frequency,
            z,
            received,
            storage_id,
            lon,
            lat,
        })
    }

    /// Timestamp of the first sample.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// One sample period past the last sample: `start + len / frequency`.
    pub fn end(&self) -> Timestamp {
        Timestamp::from_nanos(self.start.as_nanos() + self.len() as i64 * self.period_nanos())
    }

    /// Sampling rate in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Sample spacing in seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.frequency
    }

    /// Length of the burst in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.frequency
    }

    /// When the backend received this packet. Always at or after `start`.
    pub fn received(&self) -> Timestamp {
        self.received
    }

    /// Backend storage identifier. Monotonic in reception order, not in
    /// data order.
    pub fn storage_id(&self) -> u64 {
        self.storage_id
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Vertical acceleration samples.
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Seconds between data capture and backend reception.
    pub fn latency(&self) -> f64 {
        self.received.seconds_since(self.start)
    }

    /// Absolute timestamp of every sample.
    pub fn time(&self) -> Vec<Timestamp> {
        let period = self.period_nanos();
        (0..self.len() as i64)
            .map(|i| Timestamp::from_nanos(self.start.as_nanos() + i * period))
            .collect()
    }

    /// Sample period in integer nanoseconds.
    ///
    /// The rounding error (sub-nanosecond per step) stays far below one
    /// sample period over a burst, which is the accuracy the clipping
    /// contract asks for.
    pub(crate) fn period_nanos(&self) -> i64 {
        (1_000_000_000.0 / self.frequency).round() as i64
    }

    /// Trim this packet to the samples lying within `[a, b]`.
    ///
    /// Returns a new packet whose first sample is the earliest sample at or
    /// after `a` and whose last sample is the latest at or before `b`, or
    /// `None` if no sample falls inside the window. Index arithmetic is done
    /// in integer nanoseconds so the result is deterministic and clipping an
    /// already-clipped packet to the same window is an exact no-op.
    pub(crate) fn clipped(&self, a: Timestamp, b: Timestamp) -> Option<AxlPacket> {
        let period = self.period_nanos();
        let last_sample = self.start.as_nanos() + (self.len() as i64 - 1) * period;

        if b.as_nanos() < self.start.as_nanos() || a.as_nanos() > last_sample {
            return None;
        }

        let rel_a = a.as_nanos() - self.start.as_nanos();
        let i0 = if rel_a <= 0 {
            0
        } else {
            (rel_a + period - 1) / period // ceiling division
        };

        let rel_b = b.as_nanos() - self.start.as_nanos();
        let i1 = (rel_b / period).min(self.len() as i64 - 1);

        if i1 < i0 {
            return None;
        }

        Some(AxlPacket {
            start: Timestamp::from_nanos(self.start.as_nanos() + i0 * period),
            frequency: self.frequency,
            z: self.z[i0 as usize..=i1 as usize].to_vec(),
            received: self.received,
            storage_id: self.storage_id,
            lon: self.lon,
            lat: self.lat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_packet(start_secs: f64, frequency: f64, n: usize) -> AxlPacket {
        AxlPacket::new(
            Timestamp::from_secs_f64(start_secs),
            frequency,
            (0..n).map(|i| (i as f64 * 0.1).sin()).collect(),
            Timestamp::from_secs_f64(start_secs + 120.0),
            1,
            5.32,
            60.39,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_samples() {
        let r = AxlPacket::new(
            Timestamp::from_nanos(0),
            52.0,
            vec![],
            Timestamp::from_nanos(0),
            0,
            0.0,
            0.0,
        );
        assert!(r.is_err());
    }

    #[test]
    fn test_rejects_bad_frequency() {
        for f in [0.0, -1.0, f64::NAN] {
            let r = AxlPacket::new(
                Timestamp::from_nanos(0),
                f,
                vec![0.0; 8],
                Timestamp::from_nanos(0),
                0,
                0.0,
                0.0,
            );
            assert!(r.is_err(), "frequency {f} should be rejected");
        }
    }

    #[test]
    fn test_duration_and_end() {
        let p = test_packet(0.0, 20.0, 1024);
        assert!((p.duration() - 51.2).abs() < 1e-9);
        assert!((p.end().as_secs_f64() - 51.2).abs() < 1e-6);
    }

    #[test]
    fn test_time_axis_spacing() {
        let p = test_packet(10.0, 52.0, 64);
        let time = p.time();
        assert_eq!(time.len(), 64);
        assert_eq!(time[0], p.start());
        let step = time[1].seconds_since(time[0]);
        assert!((step - 1.0 / 52.0).abs() < 1e-6);
    }

    #[test]
    fn test_clipped_interior_window() {
        let p = test_packet(0.0, 20.0, 1024);
        let a = Timestamp::from_secs_f64(0.5);
        let b = Timestamp::from_secs_f64(51.2);
        let c = p.clipped(a, b).unwrap();

        // First sample at or after 0.5 s at 20 Hz is index 10, t = 0.5.
        assert!((c.start().as_secs_f64() - 0.5).abs() < p.dt());
        assert_eq!(c.z()[0], p.z()[10]);
        assert_eq!(c.len(), 1014);
    }

    #[test]
    fn test_clipped_disjoint_window() {
        let p = test_packet(0.0, 20.0, 128);
        let a = Timestamp::from_secs_f64(100.0);
        let b = Timestamp::from_secs_f64(200.0);
        assert!(p.clipped(a, b).is_none());
    }

    #[test]
    fn test_clipped_idempotent() {
        let p = test_packet(0.0, 20.8, 1024);
        let a = Timestamp::from_secs_f64(3.3);
        let b = Timestamp::from_secs_f64(40.0);
        let once = p.clipped(a, b).unwrap();
        let twice = once.clipped(a, b).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clipped_superset_is_identity() {
        let p = test_packet(5.0, 52.0, 256);
        let c = p
            .clipped(Timestamp::from_secs_f64(0.0), Timestamp::from_secs_f64(100.0))
            .unwrap();
        assert_eq!(c, p);
    }
}
