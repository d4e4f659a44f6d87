//! Flat columnar export of a collection.
//!
//! One record per sample with the per-packet metadata (position, rate,
//! storage id) repeated for every sample of its packet, plus a small block
//! of collection-level attributes in `#`-prefixed header lines. Timestamps
//! are written as integer nanoseconds since the epoch so the round trip is
//! exact.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collection::AxlCollection;
use crate::error::{Error, Result};
use crate::types::Timestamp;

/// One exported sample row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Absolute sample time, nanoseconds since the Unix epoch.
    pub time: i64,
    /// Vertical acceleration.
    pub z: f64,
    pub lon: f64,
    pub lat: f64,
    /// Sampling rate of the packet this sample came from (Hz).
    pub frequency: f64,
    /// Storage id of the packet this sample came from.
    pub storage_id: u64,
}

/// A re-read export: collection attributes plus all sample rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDataset {
    pub device: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub duration: f64,
    pub samples: Vec<SampleRecord>,
}

/// Write `collection` to `path` as CSV.
///
/// Fails with [`Error::ExportExists`] before writing anything if the
/// destination already exists; there is no overwrite and no partial write
/// on that path. An empty collection has no start or end and cannot be
/// exported.
pub fn write_csv(collection: &AxlCollection, device: &str, path: &Path) -> Result<()> {
    let (start, end) = match (collection.start(), collection.end()) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(Error::EmptySeries),
    };

    if path.exists() {
        return Err(Error::ExportExists(path.to_path_buf()));
    }

    // create_new re-checks atomically in case the file appeared since.
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::ExportExists(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# device: {device}")?;
    writeln!(out, "# start: {}", start.as_nanos())?;
    writeln!(out, "# end: {}", end.as_nanos())?;
    writeln!(out, "# duration: {}", collection.duration())?;

    let mut writer = csv::Writer::from_writer(out);

    for packet in collection.packets() {
        for (time, z) in packet.time().iter().zip(packet.z()) {
            writer.serialize(SampleRecord {
                time: time.as_nanos(),
                z: *z,
                lon: packet.lon(),
                lat: packet.lat(),
                frequency: packet.frequency(),
                storage_id: packet.storage_id(),
            })?;
        }
    }

    writer.flush()?;
    info!(path = %path.display(), packets = collection.len(), "wrote collection export");

    Ok(())
}

/// Read back a file written by [`write_csv`].
pub fn read_csv(path: &Path) -> Result<ExportedDataset> {
    let contents = std::fs::read_to_string(path)?;

    let mut device = None;
    let mut start = None;
    let mut end = None;
    let mut duration = None;

    for line in contents.lines().take_while(|l| l.starts_with('#')) {
        let Some((key, value)) = line.trim_start_matches('#').split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "device" => device = Some(value.to_string()),
            "start" => start = value.parse::<i64>().ok().map(Timestamp::from_nanos),
            "end" => end = value.parse::<i64>().ok().map(Timestamp::from_nanos),
            "duration" => duration = value.parse::<f64>().ok(),
            _ => {}
        }
    }

    let (device, start, end, duration) = match (device, start, end, duration) {
        (Some(d), Some(s), Some(e), Some(du)) => (d, s, e, du),
        _ => {
            return Err(Error::ExportFormat(
                "missing or malformed attribute header".into(),
            ))
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .from_reader(contents.as_bytes());

    let samples = reader
        .deserialize()
        .collect::<std::result::Result<Vec<SampleRecord>, _>>()?;

    Ok(ExportedDataset {
        device,
        start,
        end,
        duration,
        samples,
    })
}
