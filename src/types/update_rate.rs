//! Consumer-side pacing for snapshot subscriptions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How often a subscriber wants to observe new snapshots.
///
/// The store publishes at the acquisition fast-class rate. A display loop
/// that renders slower asks for `Max(fps)` and receives the latest snapshot
/// at that cadence; intermediate snapshots are skipped, never queued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every published snapshot, at whatever rate the link produces them.
    Native,

    /// At most this many snapshots per second. A request at or above the
    /// source rate collapses into `Native`; zero is treated as one.
    Max(u32),
}

impl UpdateRate {
    /// Normalize against the rate the source actually publishes at.
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Max(1).normalize(source_hz),
            UpdateRate::Max(hz) if f64::from(hz) >= source_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// The pacing interval for this rate, or `None` when the subscriber
    /// should see every snapshot as it lands.
    pub fn pace_interval(self, source_hz: f64) -> Option<Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs_f64(1.0 / f64::from(hz))),
        }
    }
}
