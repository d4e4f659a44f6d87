//! # axl-core
//!
//! Packet, collection and segment model for wave buoy accelerometer data.
//!
//! An ocean wave buoy samples vertical acceleration in fixed-length bursts
//! ("packets") and transmits them intermittently over a cellular modem.
//! Packets arrive out of order, at varying sampling rates, and with gaps.
//! This crate reassembles them:
//!
//! 1. **Collection**: sort a retrieval batch into the canonical ordered
//!    stream, filter mixed sampling rates, clip to a time window down to
//!    single-sample resolution.
//! 2. **Diagnostics**: signed inter-packet gaps; a negative gap marks
//!    overlapping packets, reported rather than raised.
//! 3. **Segmentation**: split the stream into maximal gap-free segments
//!    for per-segment analysis.
//! 4. **Export**: flat columnar CSV, one row per sample.
//!
//! Numeric processing of the assembled series (detrending, integration to
//! velocity and displacement) lives in `axl-signal`.

pub mod collection;
pub mod error;
pub mod export;
pub mod packet;
pub mod segment;
pub mod types;

pub use collection::AxlCollection;
pub use error::{Error, Result};
pub use packet::AxlPacket;
pub use segment::AxlSegment;
pub use types::{Timestamp, NOMINAL_BURST_LEN, NOMINAL_FREQUENCIES};
