//! Live buoy monitoring loop.
//!
//! Polls the hub at a fixed interval and derives the latest displacement
//! window for display. Every iteration rebuilds its collection from
//! scratch; no state is carried across iterations, so a missed or slow
//! fetch only makes the display lag. Cancellation is an explicit stop
//! signal, not process termination.

use tokio::sync::watch;
use tracing::{debug, warn};

use axl_core::{AxlCollection, Result, Timestamp};
use axl_signal::{displacement, IntegrationMethod};

use crate::client::Hub;
use crate::clock::Clock;

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Length of the displayed window (seconds).
    pub window_secs: f64,

    /// Pause between updates (seconds).
    pub sleep_secs: f64,

    /// Shift the window into the past to replay old data (seconds).
    pub delay_secs: f64,

    /// How far before the window to start the reception-time query.
    /// Packets covering the window may have been received well before it
    /// ends, so the fetch reaches back by the expected transmission
    /// latency.
    pub lookback_secs: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_secs: 60.0,
            sleep_secs: 5.0,
            delay_secs: 0.0,
            lookback_secs: 20.0 * 60.0,
        }
    }
}

/// One derived display frame.
#[derive(Debug, Clone)]
pub struct MonitorFrame {
    pub start: Timestamp,
    pub end: Timestamp,
    pub frequency: f64,
    pub packets: usize,
    /// Per-sample capture timestamps, trimmed to the displacement length.
    pub time: Vec<Timestamp>,
    /// Vertical displacement (m).
    pub displacement: Vec<f64>,
}

/// Fixed-interval monitor over an injected hub and clock.
pub struct Monitor<H, C> {
    hub: H,
    clock: C,
    device: String,
    config: MonitorConfig,
}

impl<H: Hub, C: Clock> Monitor<H, C> {
    pub fn new(hub: H, clock: C, device: impl Into<String>, config: MonitorConfig) -> Self {
        Self {
            hub,
            clock,
            device: device.into(),
            config,
        }
    }

    /// Run one iteration: fetch the window, rebuild a collection, derive
    /// displacement. `None` when no data overlaps the window.
    pub async fn tick(&self) -> Result<Option<MonitorFrame>> {
        let end = self.clock.now().offset_secs(-self.config.delay_secs);
        let start = end.offset_secs(-self.config.window_secs);
        let tx_start = start.offset_secs(-self.config.lookback_secs);

        let pcks = self
            .hub
            .fetch_range(&self.device, Some(tx_start), None)
            .await?;

        if pcks.is_empty() {
            return Ok(None);
        }

        let mut collection = AxlCollection::new(pcks);
        collection.clip(start, end);

        let (Some(data_start), Some(data_end), Some(dt), Some(frequency)) = (
            collection.start(),
            collection.end(),
            collection.dt(),
            collection.frequency(),
        ) else {
            return Ok(None);
        };

        // The DFT method holds up over a long rolling window where the
        // trapezoid would drift.
        let derived = displacement(&collection.z(), dt, data_start, IntegrationMethod::Dft)?;

        // The window may contain gaps between packets, so the uniform axis
        // from the derivation would stamp every post-gap sample too early.
        // Use the collection's real capture times instead.
        let mut time = collection.time();
        time.truncate(derived.values.len());

        Ok(Some(MonitorFrame {
            start: data_start,
            end: data_end,
            frequency,
            packets: collection.len(),
            time,
            displacement: derived.values,
        }))
    }

    /// Poll until `stop` is flipped to true (or its sender is dropped),
    /// passing each derived frame to `render`.
    pub async fn run<F>(&self, mut stop: watch::Receiver<bool>, mut render: F) -> Result<()>
    where
        F: FnMut(MonitorFrame) + Send,
    {
        loop {
            match self.tick().await {
                Ok(Some(frame)) => render(frame),
                Ok(None) => debug!(device = %self.device, "no data in window"),
                Err(e) => warn!(device = %self.device, error = %e, "monitor iteration failed"),
            }

            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(std::time::Duration::from_secs_f64(
                    self.config.sleep_secs,
                )) => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::mock::MockHub;
    use axl_core::{AxlPacket, NOMINAL_BURST_LEN};
    use std::sync::Arc;

    fn packet(start_secs: f64, received_secs: f64, storage_id: u64) -> AxlPacket {
        AxlPacket::new(
            Timestamp::from_secs_f64(start_secs),
            20.0,
            (0..NOMINAL_BURST_LEN)
                .map(|i| (i as f64 * 0.2).sin())
                .collect(),
            Timestamp::from_secs_f64(received_secs),
            storage_id,
            5.0,
            60.0,
        )
        .unwrap()
    }

    fn monitor_at(now_secs: f64) -> Monitor<MockHub, Arc<ManualClock>> {
        let hub = MockHub::new();
        // Two bursts covering [1000, 1102.4), received shortly after capture.
        hub.push("bug-32", packet(1000.0, 1030.0, 1));
        hub.push("bug-32", packet(1051.2, 1080.0, 2));

        let clock = Arc::new(ManualClock::new(Timestamp::from_secs_f64(now_secs)));
        Monitor::new(hub, clock, "bug-32", MonitorConfig::default())
    }

    #[tokio::test]
    async fn test_tick_derives_window() {
        let monitor = monitor_at(1100.0);

        let frame = monitor.tick().await.unwrap().expect("data in window");

        // Window is [1040, 1100]; both packets overlap it.
        assert_eq!(frame.packets, 2);
        assert!(frame.start.as_secs_f64() >= 1040.0 - 0.05);
        assert!(frame.end.as_secs_f64() <= 1100.0 + 0.05);
        assert_eq!(frame.time.len(), frame.displacement.len());
        assert!((frame.frequency - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_tick_time_axis_follows_capture_times_across_gap() {
        // Two 12.8 s bursts at t=1000 and t=1020: a 7.2 s gap inside the
        // window. Post-gap samples must carry their real capture times,
        // not a uniform axis continued across the gap.
        let short = |start_secs: f64, storage_id: u64| {
            AxlPacket::new(
                Timestamp::from_secs_f64(start_secs),
                20.0,
                (0..256).map(|i| (i as f64 * 0.2).sin()).collect(),
                Timestamp::from_secs_f64(start_secs + 5.0),
                storage_id,
                5.0,
                60.0,
            )
            .unwrap()
        };

        let hub = MockHub::new();
        hub.push("bug-32", short(1000.0, 1));
        hub.push("bug-32", short(1020.0, 2));

        let clock = Arc::new(ManualClock::new(Timestamp::from_secs_f64(1040.0)));
        let monitor = Monitor::new(hub, clock, "bug-32", MonitorConfig::default());

        let frame = monitor.tick().await.unwrap().expect("data in window");

        assert_eq!(frame.packets, 2);
        assert_eq!(frame.time.len(), frame.displacement.len());
        assert_eq!(frame.time.len(), 512);

        // Last sample of the first burst: 1000 + 255 / 20 Hz.
        assert!((frame.time[255].as_secs_f64() - 1012.75).abs() < 1e-9);
        // First sample of the second burst is at its start, after the gap.
        assert_eq!(frame.time[256], Timestamp::from_secs_f64(1020.0));
    }

    #[tokio::test]
    async fn test_tick_with_no_data_in_window() {
        // Far in the future: fetch window starts after everything was
        // received.
        let monitor = monitor_at(1_000_000.0);
        let frame = monitor.tick().await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_signal() {
        let monitor = monitor_at(1100.0);
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut frames = 0usize;
            monitor.run(stop_rx, |_| frames += 1).await.unwrap();
            frames
        });

        // Let a few iterations happen on the paused clock, then stop.
        tokio::time::sleep(std::time::Duration::from_secs(12)).await;
        stop_tx.send(true).unwrap();

        let frames = handle.await.unwrap();
        assert!(frames >= 1, "expected at least one rendered frame");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_sender_dropped() {
        let monitor = monitor_at(1100.0);
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { monitor.run(stop_rx, |_| {}).await });

        drop(stop_tx);
        handle.await.unwrap().unwrap();
    }
}
