//! # axl-signal
//!
//! Stateless numeric operations for buoy motion reconstruction: detrending
//! and numerically stable integration of vertical acceleration into
//! velocity and displacement.
//!
//! All operations are pure CPU computations over in-memory slices; nothing
//! here performs I/O or keeps state between calls. Inputs come from an
//! `axl_core::AxlCollection` or `AxlSegment` (their concatenated `z()`
//! arrays), but only plain slices are accepted, so the crate is equally
//! usable on synthetic series in tests.
//!
//! ## Choosing an integration method
//!
//! - [`IntegrationMethod::Trapezoidal`] for short, well-behaved windows;
//!   exact output-length contract (N−k), drifts over long windows.
//! - [`IntegrationMethod::Dft`] for continuous display of long windows; no
//!   cumulative drift, but assumes the window is near-periodic and shows
//!   artifacts at the window edges.

pub mod derive;
pub mod detrend;
pub mod integrate;

pub use derive::{displacement, time_axis, velocity, DerivedSeries};
pub use detrend::detrend;
pub use integrate::{frequency_axis, integrate, IntegrationMethod};
