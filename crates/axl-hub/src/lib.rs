//! # axl-hub
//!
//! Client side of the telemetry hub the buoys sync against, plus the live
//! monitoring loop built on top of it.
//!
//! The [`Hub`] trait is the retrieval boundary: range queries by reception
//! time and single-packet lookups by storage id. [`HttpHub`] talks to a
//! real deployment; [`MockHub`] preloads packets in memory for tests and
//! offline work. The [`Monitor`] polls a hub at a fixed interval with an
//! injected [`Clock`] and an explicit stop signal.

pub mod client;
pub mod clock;
pub mod config;
pub mod mock;
pub mod monitor;

pub use client::{Hub, HttpHub, PacketDto};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::HubConfig;
pub use mock::MockHub;
pub use monitor::{Monitor, MonitorConfig, MonitorFrame};
