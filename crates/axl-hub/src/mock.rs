//! In-memory hub for tests and offline use.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use axl_core::{AxlPacket, Error, Result, Timestamp};

use crate::client::Hub;

/// A hub backed by a map of preloaded packets.
///
/// Range queries go by reception time, like the real backend, and return
/// packets in insertion order — deliberately not sorted by data time, so
/// consumers exercise their own ordering.
#[derive(Default)]
pub struct MockHub {
    packets: Mutex<HashMap<String, Vec<AxlPacket>>>,
}

impl MockHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, device: &str, packet: AxlPacket) {
        self.packets
            .lock()
            .unwrap()
            .entry(device.to_string())
            .or_default()
            .push(packet);
    }
}

#[async_trait]
impl Hub for MockHub {
    async fn fetch_range(
        &self,
        device: &str,
        tx_start: Option<Timestamp>,
        tx_end: Option<Timestamp>,
    ) -> Result<Vec<AxlPacket>> {
        let packets = self.packets.lock().unwrap();
        let Some(device_packets) = packets.get(device) else {
            return Ok(Vec::new());
        };

        Ok(device_packets
            .iter()
            .filter(|p| tx_start.map_or(true, |t| p.received() >= t))
            .filter(|p| tx_end.map_or(true, |t| p.received() <= t))
            .cloned()
            .collect())
    }

    async fn fetch_one(&self, device: &str, storage_id: u64) -> Result<AxlPacket> {
        self.packets
            .lock()
            .unwrap()
            .get(device)
            .and_then(|pcks| pcks.iter().find(|p| p.storage_id() == storage_id))
            .cloned()
            .ok_or_else(|| Error::PacketNotFound {
                device: device.to_string(),
                storage_id,
            })
    }
}
