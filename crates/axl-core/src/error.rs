//! Error types for the axl processing system.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    #[error("export destination already exists: {0}")]
    ExportExists(PathBuf),

    #[error("export format error: {0}")]
    ExportFormat(String),

    #[error("empty sample series")]
    EmptySeries,

    #[error("invalid sample spacing: dt = {dt}")]
    InvalidSpacing { dt: f64 },

    #[error("integration order must be at least 1, got {order}")]
    InvalidOrder { order: usize },

    #[error("insufficient samples: need {required}, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("hub error: {0}")]
    Hub(String),

    #[error("packet not found: {device}/{storage_id}")]
    PacketNotFound { device: String, storage_id: u64 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::ExportFormat(e.to_string())
    }
}
