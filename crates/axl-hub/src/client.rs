//! Hub retrieval interface.
//!
//! The hub is the backend the buoys sync against. It indexes packets by
//! *reception* time, so a range query is over when packets arrived at the
//! backend, not over the time of the data they carry; a packet transmitted
//! late shows up in a late window with an early `start`. Callers get the
//! batch unordered, possibly with duplicates, and hand it to
//! `AxlCollection::new` to sort it out.
//!
//! Retry and backoff policy is owned by the hub deployment, not this
//! client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use axl_core::{AxlPacket, Error, Result, Timestamp};

use crate::config::HubConfig;

/// Remote retrieval API for buoy packets.
#[async_trait]
pub trait Hub: Send + Sync {
    /// Fetch all packets for `device` whose reception time falls within
    /// `[tx_start, tx_end]`; an open bound means "since forever" or "up to
    /// now". Ordering is not guaranteed and duplicates may occur.
    async fn fetch_range(
        &self,
        device: &str,
        tx_start: Option<Timestamp>,
        tx_end: Option<Timestamp>,
    ) -> Result<Vec<AxlPacket>>;

    /// Fetch a single packet by its storage id.
    async fn fetch_one(&self, device: &str, storage_id: u64) -> Result<AxlPacket>;
}

/// Wire representation of a packet in the hub's JSON API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketDto {
    pub storage_id: u64,
    /// First sample time, nanoseconds since the epoch.
    pub start: i64,
    /// Backend reception time, nanoseconds since the epoch.
    pub received: i64,
    pub frequency: f64,
    pub lon: f64,
    pub lat: f64,
    pub z: Vec<f64>,
}

impl PacketDto {
    pub fn into_packet(self) -> Result<AxlPacket> {
        AxlPacket::new(
            Timestamp::from_nanos(self.start),
            self.frequency,
            self.z,
            Timestamp::from_nanos(self.received),
            self.storage_id,
            self.lon,
            self.lat,
        )
    }

    pub fn from_packet(packet: &AxlPacket) -> Self {
        Self {
            storage_id: packet.storage_id(),
            start: packet.start().as_nanos(),
            received: packet.received().as_nanos(),
            frequency: packet.frequency(),
            lon: packet.lon(),
            lat: packet.lat(),
            z: packet.z().to_vec(),
        }
    }
}

/// HTTP hub client.
pub struct HttpHub {
    config: HubConfig,
    client: reqwest::Client,
}

impl HttpHub {
    pub fn new(config: HubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Hub(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.server.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Hub for HttpHub {
    async fn fetch_range(
        &self,
        device: &str,
        tx_start: Option<Timestamp>,
        tx_end: Option<Timestamp>,
    ) -> Result<Vec<AxlPacket>> {
        let mut request = self
            .client
            .get(self.url(&format!("buoys/{device}/packets")))
            .header("SFY-AUTH-TOKEN", &self.config.token);

        if let Some(start) = tx_start {
            request = request.query(&[("tx_start", start.as_nanos())]);
        }
        if let Some(end) = tx_end {
            request = request.query(&[("tx_end", end.as_nanos())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::Hub(e.to_string()))?;

        let dtos: Vec<PacketDto> = response
            .json()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?;

        dtos.into_iter().map(PacketDto::into_packet).collect()
    }

    async fn fetch_one(&self, device: &str, storage_id: u64) -> Result<AxlPacket> {
        let response = self
            .client
            .get(self.url(&format!("buoys/{device}/packets/{storage_id}")))
            .header("SFY-AUTH-TOKEN", &self.config.token)
            .send()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::PacketNotFound {
                device: device.to_string(),
                storage_id,
            });
        }

        let response = response
            .error_for_status()
            .map_err(|e| Error::Hub(e.to_string()))?;

        let dto: PacketDto = response
            .json()
            .await
            .map_err(|e| Error::Hub(e.to_string()))?;

        dto.into_packet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dto_roundtrip() {
        // Samples like 41 * 0.01 have no short decimal form; bit-exact
        // equality after JSON requires correctly rounded float parsing.
        let packet = AxlPacket::new(
            Timestamp::from_secs_f64(1000.0),
            52.0,
            (0..64).map(|i| i as f64 * 0.01).collect(),
            Timestamp::from_secs_f64(1300.0),
            42,
            5.32,
            60.39,
        )
        .unwrap();

        let dto = PacketDto::from_packet(&packet);
        let json = serde_json::to_string(&dto).unwrap();
        let back: PacketDto = serde_json::from_str(&json).unwrap();

        assert_eq!(back.into_packet().unwrap(), packet);
    }

    #[test]
    fn test_dto_rejects_invalid_packet() {
        let dto = PacketDto {
            storage_id: 1,
            start: 0,
            received: 0,
            frequency: -52.0,
            lon: 0.0,
            lat: 0.0,
            z: vec![0.0; 8],
        };
        assert!(dto.into_packet().is_err());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let hub = HttpHub::new(HubConfig {
            server: "https://hub.example.org/".into(),
            ..HubConfig::default()
        })
        .unwrap();

        assert_eq!(
            hub.url("buoys/bug-32/packets"),
            "https://hub.example.org/buoys/bug-32/packets"
        );
    }
}
