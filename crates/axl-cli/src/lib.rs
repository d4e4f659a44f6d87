//! Command-line interface for buoy accelerometer data.
//!
//! Subcommands mirror the operator workflow: `list` what a buoy has
//! transmitted, assemble and segment a time series with `ts`, inspect a
//! single packet with `file`, and watch live motion with `monitor`.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};

use axl_core::Timestamp;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "axl", about = "Wave buoy accelerometer data tools", version)]
pub struct Cli {
    /// Hub configuration file; settings default from the environment
    /// (AXL_SERVER, AXL_TOKEN)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List packets transmitted by a buoy
    List {
        /// Device name
        dev: String,

        /// Only packets received after this time
        #[arg(long, value_parser = parse_utc)]
        tx_start: Option<DateTime<Utc>>,

        /// Only packets received before this time
        #[arg(long, value_parser = parse_utc)]
        tx_end: Option<DateTime<Utc>>,
    },

    /// Assemble a time series, split it into gap-free segments, optionally
    /// export it
    Ts {
        /// Device name
        dev: String,

        /// Search packets received after this time (default: 24h ago)
        #[arg(long, value_parser = parse_utc)]
        tx_start: Option<DateTime<Utc>>,

        /// Search packets received before this time (default: now)
        #[arg(long, value_parser = parse_utc)]
        tx_end: Option<DateTime<Utc>>,

        /// Clip data before this time (default: tx-start)
        #[arg(long, value_parser = parse_utc)]
        start: Option<DateTime<Utc>>,

        /// Clip data after this time (default: tx-end)
        #[arg(long, value_parser = parse_utc)]
        end: Option<DateTime<Utc>>,

        /// Export the clipped collection to this file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Maximum gap (seconds) between packets before splitting into a
        /// new segment
        #[arg(long)]
        gap: Option<f64>,

        /// Only use packets with this sampling rate, within 2 Hz (usually
        /// 52 or 20.8)
        #[arg(long)]
        freq: Option<f64>,
    },

    /// Show motion statistics for a single packet
    File {
        /// Device name
        dev: String,

        /// Packet storage id
        storage_id: u64,
    },

    /// Monitor live vertical motion of a buoy
    Monitor {
        /// Device name
        dev: String,

        /// Seconds between updates
        #[arg(long, default_value_t = 5.0)]
        sleep: f64,

        /// Time window to show (seconds)
        #[arg(long, default_value_t = 60.0)]
        window: f64,

        /// Delay in data; use to replay the past (seconds)
        #[arg(long, default_value_t = 0.0)]
        delay: f64,
    },
}

/// Parse a UTC timestamp in any of the formats operators actually type.
pub fn parse_utc(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(format!("unrecognized datetime: {s}"))
}

pub(crate) fn to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp::from_datetime(dt)
}
