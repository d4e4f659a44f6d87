//! Subcommand implementations.
//!
//! Each command is split into a pure row-building step, exercised directly
//! by tests through the generic [`Hub`] bound, and a thin printing wrapper
//! used by `main`.

use std::path::Path;

use anyhow::{ensure, Context};
use chrono::{DateTime, Duration, Utc};
use tabled::{settings::Style, Table, Tabled};
use tracing::{info, warn};

use axl_core::{export, AxlCollection, Timestamp, NOMINAL_FREQUENCIES};
use axl_hub::{Hub, Monitor, MonitorConfig, SystemClock};
use axl_signal::{detrend, displacement, velocity, IntegrationMethod};

use crate::to_timestamp;

/// Frequency filter tolerance (Hz); devices report 52 or 20.8 nominal but
/// individual packets wobble around those.
const FREQ_TOLERANCE: f64 = 2.0;

#[derive(Tabled)]
pub struct PacketRow {
    #[tabled(rename = "DataTime")]
    pub data_time: String,
    #[tabled(rename = "Lon")]
    pub lon: f64,
    #[tabled(rename = "Lat")]
    pub lat: f64,
    #[tabled(rename = "Freq")]
    pub frequency: f64,
    #[tabled(rename = "TxTime")]
    pub tx_time: String,
    #[tabled(rename = "StID")]
    pub storage_id: u64,
}

#[derive(Tabled)]
pub struct SegmentRow {
    #[tabled(rename = "Start")]
    pub start: String,
    #[tabled(rename = "End")]
    pub end: String,
    #[tabled(rename = "Duration (s)")]
    pub duration: String,
    #[tabled(rename = "Max Internal Gap")]
    pub max_gap: String,
    #[tabled(rename = "Segment Gap")]
    pub segment_gap: String,
    #[tabled(rename = "Packets")]
    pub packets: usize,
    #[tabled(rename = "Start ID")]
    pub start_id: u64,
    #[tabled(rename = "End ID")]
    pub end_id: u64,
}

#[derive(Tabled)]
pub struct StatRow {
    #[tabled(rename = "Quantity")]
    pub quantity: String,
    #[tabled(rename = "Samples")]
    pub samples: usize,
    #[tabled(rename = "Min")]
    pub min: String,
    #[tabled(rename = "Max")]
    pub max: String,
    #[tabled(rename = "Std")]
    pub std: String,
}

fn format_time(t: Timestamp) -> String {
    t.to_datetime().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// `list`: one row per packet, in reception range.
pub async fn list_rows(
    hub: &impl Hub,
    dev: &str,
    tx_start: Option<DateTime<Utc>>,
    tx_end: Option<DateTime<Utc>>,
) -> anyhow::Result<Vec<PacketRow>> {
    let pcks = hub
        .fetch_range(dev, tx_start.map(to_timestamp), tx_end.map(to_timestamp))
        .await?;
    info!(device = dev, packets = pcks.len(), "listing packets");

    Ok(pcks
        .iter()
        .map(|p| PacketRow {
            data_time: format_time(p.start()),
            lon: p.lon(),
            lat: p.lat(),
            frequency: p.frequency(),
            tx_time: format_time(p.received()),
            storage_id: p.storage_id(),
        })
        .collect())
}

pub async fn list(
    hub: &impl Hub,
    dev: &str,
    tx_start: Option<DateTime<Utc>>,
    tx_end: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let rows = list_rows(hub, dev, tx_start, tx_end).await?;
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

/// Options for the `ts` command after defaulting.
pub struct TsOptions {
    pub tx_start: Timestamp,
    pub tx_end: Timestamp,
    pub start: Timestamp,
    pub end: Timestamp,
    pub gap: f64,
    pub freq: Option<f64>,
}

impl TsOptions {
    /// Apply the operator-facing defaults: reception window is the last
    /// 24 h, the clip window defaults to the reception window, and the
    /// reception window is widened so it always covers the clip window.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        now: DateTime<Utc>,
        tx_start: Option<DateTime<Utc>>,
        tx_end: Option<DateTime<Utc>>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        gap: Option<f64>,
        freq: Option<f64>,
    ) -> Self {
        let tx_start = tx_start.unwrap_or(now - Duration::days(1));
        let tx_end = tx_end.unwrap_or(now);
        let start = start.unwrap_or(tx_start);
        let end = end.unwrap_or(tx_end);

        let tx_start = tx_start.min(start);
        let tx_end = tx_end.max(end);

        Self {
            tx_start: to_timestamp(tx_start),
            tx_end: to_timestamp(tx_end),
            start: to_timestamp(start),
            end: to_timestamp(end),
            gap: gap.unwrap_or(AxlCollection::GAP_LIMIT),
            freq,
        }
    }
}

/// `ts`: fetch, filter, clip; returns the assembled collection.
pub async fn ts_collection(
    hub: &impl Hub,
    dev: &str,
    opts: &TsOptions,
) -> anyhow::Result<AxlCollection> {
    let pcks = hub
        .fetch_range(dev, Some(opts.tx_start), Some(opts.tx_end))
        .await?;
    info!(packets = pcks.len(), "packets in tx range");

    let mut collection = AxlCollection::new(pcks);

    if let Some(freq) = opts.freq {
        if !NOMINAL_FREQUENCIES
            .iter()
            .any(|f| (f - freq).abs() <= FREQ_TOLERANCE)
        {
            warn!(freq, "requested rate matches no nominal buoy output rate");
        }
        collection.filter_by_frequency(freq, FREQ_TOLERANCE);
        info!(
            packets = collection.len(),
            freq, "packets matching frequency"
        );
    }

    collection.clip(opts.start, opts.end);
    info!(packets = collection.len(), "packets in clip window");

    Ok(collection)
}

/// Build the segment table for an assembled collection.
pub fn segment_rows(collection: &AxlCollection, eps_gap: f64) -> anyhow::Result<Vec<SegmentRow>> {
    let segments = collection.segments(eps_gap);

    let total: usize = segments.iter().map(|s| s.len()).sum();
    ensure!(
        total == collection.len(),
        "segments do not partition the collection: {total} != {}",
        collection.len()
    );

    let mut rows = Vec::with_capacity(segments.len());
    for (i, s) in segments.iter().enumerate() {
        // Gap from the previous segment's end; by construction it exceeds
        // the threshold.
        let segment_gap = if i == 0 {
            "-".to_string()
        } else {
            format!("{:.1}", s.start().seconds_since(segments[i - 1].end()))
        };

        rows.push(SegmentRow {
            start: format_time(s.start()),
            end: format_time(s.end()),
            duration: format!("{:.1}", s.duration()),
            max_gap: format!("{:.2}", s.max_gap()),
            segment_gap,
            packets: s.len(),
            start_id: s.first_storage_id(),
            end_id: s.last_storage_id(),
        });
    }

    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
pub async fn ts(
    hub: &impl Hub,
    dev: &str,
    tx_start: Option<DateTime<Utc>>,
    tx_end: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    file: Option<&Path>,
    gap: Option<f64>,
    freq: Option<f64>,
) -> anyhow::Result<()> {
    let opts = TsOptions::resolve(Utc::now(), tx_start, tx_end, start, end, gap, freq);

    let collection = ts_collection(hub, dev, &opts).await?;
    let rows = segment_rows(&collection, opts.gap)?;
    println!("{}", Table::new(rows).with(Style::sharp()));

    if let Some(path) = file {
        info!(path = %path.display(), "saving collection");
        export::write_csv(&collection, dev, path)
            .with_context(|| format!("exporting to {}", path.display()))?;
    }

    Ok(())
}

fn stat_row(quantity: &str, values: &[f64]) -> StatRow {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt();

    StatRow {
        quantity: quantity.to_string(),
        samples: values.len(),
        min: format!("{min:.4}"),
        max: format!("{max:.4}"),
        std: format!("{std:.4}"),
    }
}

/// `file`: motion statistics for a single packet.
pub async fn file_rows(
    hub: &impl Hub,
    dev: &str,
    storage_id: u64,
) -> anyhow::Result<Vec<StatRow>> {
    let packet = hub.fetch_one(dev, storage_id).await?;
    info!(
        device = dev,
        storage_id,
        start = %format_time(packet.start()),
        duration = packet.duration(),
        frequency = packet.frequency(),
        "inspecting packet"
    );

    let a = detrend(packet.z())?;
    let w = velocity(
        packet.z(),
        packet.dt(),
        packet.start(),
        IntegrationMethod::Trapezoidal,
    )?;
    let u = displacement(
        packet.z(),
        packet.dt(),
        packet.start(),
        IntegrationMethod::Trapezoidal,
    )?;

    Ok(vec![
        stat_row("acceleration (m/s²)", &a),
        stat_row("velocity (m/s)", &w.values),
        stat_row("displacement (m)", &u.values),
    ])
}

pub async fn file(hub: &impl Hub, dev: &str, storage_id: u64) -> anyhow::Result<()> {
    let rows = file_rows(hub, dev, storage_id).await?;
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

/// `monitor`: poll and print displacement summaries until Ctrl-C.
pub async fn monitor(
    hub: impl Hub,
    dev: &str,
    sleep: f64,
    window: f64,
    delay: f64,
) -> anyhow::Result<()> {
    let config = MonitorConfig {
        window_secs: window,
        sleep_secs: sleep,
        delay_secs: delay,
        ..MonitorConfig::default()
    };

    let monitor = Monitor::new(hub, SystemClock, dev, config);

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    monitor
        .run(stop_rx, |frame| {
            let peak = frame
                .displacement
                .iter()
                .fold(0.0f64, |acc, v| acc.max(v.abs()));
            println!(
                "{} -> {}  {} packets  f={:.1} Hz  peak |u| = {peak:.3} m",
                format_time(frame.start),
                format_time(frame.end),
                frame.packets,
                frame.frequency,
            );
        })
        .await?;

    Ok(())
}
