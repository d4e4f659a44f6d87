//! Gap-free segments of a collection.

use crate::packet::AxlPacket;
use crate::types::Timestamp;

/// A maximal run of consecutive packets with no internal gap above the
/// threshold it was derived with.
///
/// Segments borrow their packets from the source [`AxlCollection`]; they are
/// snapshots, and the borrow checker prevents the collection from being
/// clipped or filtered while any segment of it is still alive.
///
/// [`AxlCollection`]: crate::collection::AxlCollection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxlSegment<'a> {
    pcks: &'a [AxlPacket],
}

impl<'a> AxlSegment<'a> {
    /// Construct from a non-empty run of sorted packets.
    pub(crate) fn new(pcks: &'a [AxlPacket]) -> Self {
        debug_assert!(!pcks.is_empty());
        Self { pcks }
    }

    pub fn packets(&self) -> &'a [AxlPacket] {
        self.pcks
    }

    /// Number of packets in this segment.
    pub fn len(&self) -> usize {
        self.pcks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcks.is_empty()
    }

    pub fn start(&self) -> Timestamp {
        self.pcks[0].start()
    }

    pub fn end(&self) -> Timestamp {
        self.pcks[self.pcks.len() - 1].end()
    }

    /// Span of the segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end().seconds_since(self.start())
    }

    /// Largest gap between consecutive packets, in seconds. Zero for a
    /// single-packet segment.
    pub fn max_gap(&self) -> f64 {
        self.pcks
            .windows(2)
            .map(|w| w[1].start().seconds_since(w[0].end()))
            .fold(0.0, f64::max)
    }

    pub fn first_storage_id(&self) -> u64 {
        self.pcks[0].storage_id()
    }

    pub fn last_storage_id(&self) -> u64 {
        self.pcks[self.pcks.len() - 1].storage_id()
    }

    /// Concatenated acceleration samples across the segment's packets.
    pub fn z(&self) -> Vec<f64> {
        self.pcks.iter().flat_map(|p| p.z().iter().copied()).collect()
    }

    /// Concatenated per-sample timestamps.
    pub fn time(&self) -> Vec<Timestamp> {
        self.pcks.iter().flat_map(|p| p.time()).collect()
    }

    /// Sampling rate of the segment, taken from its first packet.
    pub fn frequency(&self) -> f64 {
        self.pcks[0].frequency()
    }

    pub fn dt(&self) -> f64 {
        1.0 / self.frequency()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    fn packet(start_secs: f64, storage_id: u64) -> AxlPacket {
        AxlPacket::new(
            Timestamp::from_secs_f64(start_secs),
            20.0,
            vec![0.0; 1024],
            Timestamp::from_secs_f64(start_secs + 60.0),
            storage_id,
            5.0,
            60.0,
        )
        .unwrap()
    }

    #[test]
    fn test_single_packet_segment_has_zero_max_gap() {
        let pcks = vec![packet(0.0, 7)];
        let seg = AxlSegment::new(&pcks);
        assert_eq!(seg.max_gap(), 0.0);
        assert_eq!(seg.first_storage_id(), 7);
        assert_eq!(seg.last_storage_id(), 7);
    }

    #[test]
    fn test_segment_span_and_samples() {
        // Two back-to-back 51.2 s packets.
        let pcks = vec![packet(0.0, 1), packet(51.2, 2)];
        let seg = AxlSegment::new(&pcks);
        assert_eq!(seg.len(), 2);
        assert!((seg.duration() - 102.4).abs() < 1e-6);
        assert!(seg.max_gap().abs() < 1e-6);
        assert_eq!(seg.z().len(), 2048);
        assert_eq!(seg.time().len(), 2048);
    }
}
