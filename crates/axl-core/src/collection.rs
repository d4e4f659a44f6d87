//! Ordered collections of accelerometer packets.
//!
//! A collection is built once from a batch of retrieved packets and is the
//! canonical ordered view of a buoy's data stream over a time range. It owns
//! its packets exclusively; the only mutations are destructive narrowing
//! (clipping, frequency filtering). Packet contents are never rewritten.

use tracing::warn;

use crate::packet::AxlPacket;
use crate::segment::AxlSegment;
use crate::types::Timestamp;

/// Ordered sequence of packets for one device, sorted by data start time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxlCollection {
    pcks: Vec<AxlPacket>,
}

impl AxlCollection {
    /// Default maximum gap (seconds) between consecutive packets before a
    /// collection is split into a new segment.
    pub const GAP_LIMIT: f64 = 10.0;

    /// Build a collection from a retrieval result.
    ///
    /// Retrieval order is not guaranteed, so the packets are sorted by
    /// `start`. Duplicates are kept; overlapping packets are a data-quality
    /// condition surfaced through [`gaps`](Self::gaps) and logged here, not
    /// an error.
    pub fn new(mut pcks: Vec<AxlPacket>) -> Self {
        pcks.sort_by_key(|p| p.start());

        let collection = Self { pcks };

        let overlaps = collection.overlaps();
        if !overlaps.is_empty() {
            warn!(
                count = overlaps.len(),
                "collection contains overlapping packets"
            );
        }

        collection
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of packets.
    pub fn len(&self) -> usize {
        self.pcks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcks.is_empty()
    }

    pub fn packets(&self) -> &[AxlPacket] {
        &self.pcks
    }

    /// Start of the first packet, if any.
    pub fn start(&self) -> Option<Timestamp> {
        self.pcks.first().map(|p| p.start())
    }

    /// End of the last packet, if any.
    pub fn end(&self) -> Option<Timestamp> {
        self.pcks.last().map(|p| p.end())
    }

    /// Span from first to last packet in seconds, including any gaps.
    pub fn duration(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => end.seconds_since(start),
            _ => 0.0,
        }
    }

    /// Sampling rate of the first packet. Meaningful after frequency
    /// filtering; mixed-rate collections report their first packet's rate.
    pub fn frequency(&self) -> Option<f64> {
        self.pcks.first().map(|p| p.frequency())
    }

    /// Sample spacing of the first packet in seconds.
    pub fn dt(&self) -> Option<f64> {
        self.frequency().map(|f| 1.0 / f)
    }

    /// Signed gap in seconds between each pair of consecutive packets:
    /// `next.start - previous.end`. Negative values mean the packets
    /// overlap.
    pub fn gaps(&self) -> Vec<f64> {
        self.pcks
            .windows(2)
            .map(|w| w[1].start().seconds_since(w[0].end()))
            .collect()
    }

    /// Pairs of overlapping packets: the index of the earlier packet and
    /// the (negative) gap to its successor.
    pub fn overlaps(&self) -> Vec<(usize, f64)> {
        self.gaps()
            .into_iter()
            .enumerate()
            .filter(|(_, gap)| *gap < 0.0)
            .collect()
    }

    /// Drop packets whose sampling rate differs from `target` by more than
    /// `tolerance` Hz.
    ///
    /// A device may switch output rates between bursts; analysis across
    /// mixed rates is undefined, so non-matching packets are excluded
    /// before processing. Removing every packet leaves a valid empty
    /// collection.
    pub fn filter_by_frequency(&mut self, target: f64, tolerance: f64) {
        let before = self.pcks.len();
        self.pcks
            .retain(|p| (p.frequency() - target).abs() <= tolerance);

        if self.pcks.len() != before {
            warn!(
                removed = before - self.pcks.len(),
                target, "removed packets with non-matching frequency"
            );
        }
    }

    /// Narrow the collection to the data within `[a, b]`.
    ///
    /// Packets fully outside the window are dropped; packets straddling a
    /// boundary have their sample arrays trimmed to the nearest in-window
    /// sample, so that afterwards `start == max(a, old start)` and
    /// `end == min(b, old end)` hold within one sample period. A window
    /// disjoint from the data yields an empty collection. Idempotent:
    /// re-clipping to the same or a wider window changes nothing.
    pub fn clip(&mut self, a: Timestamp, b: Timestamp) {
        self.pcks = self
            .pcks
            .iter()
            .filter_map(|p| p.clipped(a, b))
            .collect();
    }

    /// Split into maximal runs of packets where no gap between consecutive
    /// packets exceeds `eps_gap` seconds.
    ///
    /// The decomposition is computed eagerly into a snapshot; the returned
    /// segments borrow this collection, so it cannot be mutated while they
    /// are alive. Every packet lands in exactly one segment.
    pub fn segments(&self, eps_gap: f64) -> Vec<AxlSegment<'_>> {
        let mut segments = Vec::new();

        if self.pcks.is_empty() {
            return segments;
        }

        let mut run_start = 0;
        for i in 1..self.pcks.len() {
            let gap = self.pcks[i].start().seconds_since(self.pcks[i - 1].end());
            if gap > eps_gap {
                segments.push(AxlSegment::new(&self.pcks[run_start..i]));
                run_start = i;
            }
        }
        segments.push(AxlSegment::new(&self.pcks[run_start..]));

        segments
    }

    /// Concatenated acceleration samples across all packets, in order.
    pub fn z(&self) -> Vec<f64> {
        self.pcks.iter().flat_map(|p| p.z().iter().copied()).collect()
    }

    /// Concatenated per-sample timestamps across all packets.
    pub fn time(&self) -> Vec<Timestamp> {
        self.pcks.iter().flat_map(|p| p.time()).collect()
    }
}
