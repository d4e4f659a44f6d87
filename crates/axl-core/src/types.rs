//! Fundamental types shared across the axl processing crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Nominal number of samples per accelerometer burst.
///
/// The buoy firmware fills a fixed 1024-sample block before handing it to
/// the modem, regardless of the configured output rate.
pub const NOMINAL_BURST_LEN: usize = 1024;

/// Nominal output rates of the buoy firmware (Hz). The 833 Hz internal rate
/// is decimated to one of these before transmission. A device may switch
/// between them, so packets from the same buoy can disagree on frequency.
pub const NOMINAL_FREQUENCIES: [f64; 2] = [52.0, 20.8];

/// UTC timestamp with nanosecond precision.
///
/// Sample times are derived by repeated addition of a sample period, so the
/// representation must be exact under that arithmetic; integer nanoseconds
/// are, `DateTime` math in and out happens only at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1_000_000_000.0).round() as i64)
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_nanos_opt().unwrap_or(0))
    }

    /// Shift by a (possibly negative) number of seconds.
    pub fn offset_secs(&self, secs: f64) -> Self {
        Self(self.0 + (secs * 1_000_000_000.0).round() as i64)
    }

    /// Elapsed seconds since `earlier`. Negative if `earlier` is later.
    pub fn seconds_since(&self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0) as f64 / 1_000_000_000.0
    }
}
