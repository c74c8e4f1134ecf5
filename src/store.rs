//! Latest-value telemetry state, split into writer and reader halves.
//!
//! The store is a `tokio::sync::watch` channel carrying a
//! [`TelemetrySnapshot`]. The acquisition task owns the single
//! [`TelemetryWriter`]; every rendering surface holds its own cloned
//! [`TelemetryReader`] and either grabs snapshots at its frame rate or
//! subscribes to a paced stream of them. There is no history and no
//! backpressure: a value nobody read in time is simply superseded.

use std::time::Instant;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::stream::PaceExt;
use crate::types::{TelemetrySnapshot, TelemetryUpdate, UpdateRate};

/// Factory for the store's two halves.
pub struct TelemetryStore;

impl TelemetryStore {
    /// Create an empty store. `source_hz` is the rate the writer will
    /// publish at (the fast polling class), used to normalize subscriber
    /// rate requests.
    pub fn channel(source_hz: f64) -> (TelemetryWriter, TelemetryReader) {
        let (tx, rx) = watch::channel(TelemetrySnapshot::default());
        (TelemetryWriter { tx, source_hz }, TelemetryReader { rx, source_hz })
    }
}

/// The single producing handle, owned by the acquisition task.
///
/// Not `Clone`: one link, one writer.
#[derive(Debug)]
pub struct TelemetryWriter {
    tx: watch::Sender<TelemetrySnapshot>,
    source_hz: f64,
}

impl TelemetryWriter {
    /// Merge one decoded update into the shared snapshot and publish it.
    ///
    /// The merge runs inside the watch channel's write lock, so a reader
    /// either sees the snapshot from before the whole update or after it,
    /// never a partially applied multi-field message. Publishing succeeds
    /// even while no reader exists.
    pub fn apply(&self, update: TelemetryUpdate, now: Instant) {
        self.tx.send_modify(|snapshot| snapshot.apply(update, now));
    }

    /// Mint an additional reader handle.
    pub fn reader(&self) -> TelemetryReader {
        TelemetryReader { rx: self.tx.subscribe(), source_hz: self.source_hz }
    }
}

/// A consuming handle; clone one per rendering surface.
#[derive(Debug, Clone)]
pub struct TelemetryReader {
    rx: watch::Receiver<TelemetrySnapshot>,
    source_hz: f64,
}

impl TelemetryReader {
    /// The current snapshot, cloned out of the channel.
    ///
    /// Constant-time and wait-free with respect to other readers; display
    /// loops call this once per rendered frame.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.rx.borrow().clone()
    }

    /// Every published snapshot as a stream, starting with the current
    /// value. Changes that land while the consumer is busy are coalesced
    /// into the latest one by the watch channel itself.
    pub fn updates(&self) -> WatchStream<TelemetrySnapshot> {
        WatchStream::new(self.rx.clone())
    }

    /// Snapshots paced to the requested rate, latest-wins.
    ///
    /// `Native` (or any rate at or above the source rate) yields every
    /// published snapshot. `Max(hz)` emits at most one snapshot per pacing
    /// interval and skips the ones in between. A quiet link leaves the
    /// stream pending; it never terminates the subscription.
    pub fn subscribe(
        &self,
        rate: UpdateRate,
    ) -> impl Stream<Item = TelemetrySnapshot> + Send + 'static {
        let updates = self.updates();
        match rate.pace_interval(self.source_hz) {
            None => updates.boxed(),
            Some(interval) => updates.paced(interval).boxed(),
        }
    }

    /// The rate the writer publishes at.
    pub fn source_hz(&self) -> f64 {
        self.source_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalogUpdate, AttitudeUpdate, GpsFix, GpsUpdate};

    use std::time::Duration;

    use futures::StreamExt;
    use tokio::time::timeout;

    fn attitude(roll: f64) -> TelemetryUpdate {
        TelemetryUpdate::Attitude(AttitudeUpdate { roll_deg: roll, pitch_deg: 0.0, yaw_deg: 0.0 })
    }

    #[test]
    fn snapshot_is_stable_without_updates() {
        let (writer, reader) = TelemetryStore::channel(30.0);
        writer.apply(attitude(12.5), Instant::now());

        let first = reader.snapshot();
        let second = reader.snapshot();
        assert_eq!(first, second);
        assert_eq!(first.roll_deg, Some(12.5));
    }

    #[test]
    fn multi_field_update_lands_as_one_batch() {
        let (writer, reader) = TelemetryStore::channel(30.0);
        writer.apply(
            TelemetryUpdate::Gps(GpsUpdate {
                fix: GpsFix::Fix3d,
                satellites: 9,
                latitude_deg: Some(52.0),
                longitude_deg: Some(21.0),
                ground_speed_ms: Some(4.0),
                course: Some(1800),
            }),
            Instant::now(),
        );

        let snapshot = reader.snapshot();
        assert_eq!(snapshot.fix, GpsFix::Fix3d);
        assert_eq!(snapshot.satellites, Some(9));
        assert_eq!(snapshot.latitude_deg, Some(52.0));
        assert_eq!(snapshot.longitude_deg, Some(21.0));
        assert_eq!(snapshot.ground_speed_ms, Some(4.0));
        assert_eq!(snapshot.course, Some(1800));
    }

    #[test]
    fn readers_are_independent() {
        let (writer, reader) = TelemetryStore::channel(30.0);
        let second = reader.clone();
        let third = writer.reader();

        writer.apply(
            TelemetryUpdate::Analog(AnalogUpdate { battery_v: 16.2, current_a: 12.5, rssi: None }),
            Instant::now(),
        );

        for r in [&reader, &second, &third] {
            assert_eq!(r.snapshot().battery_v, Some(16.2));
        }
    }

    #[test]
    fn writer_outlives_all_readers() {
        let (writer, reader) = TelemetryStore::channel(30.0);
        drop(reader);
        // Publishing into the void must not fail; a reader can be minted
        // again later.
        writer.apply(attitude(1.0), Instant::now());
        assert_eq!(writer.reader().snapshot().roll_deg, Some(1.0));
    }

    #[tokio::test]
    async fn native_subscription_sees_each_publish() {
        let (writer, reader) = TelemetryStore::channel(30.0);
        let mut stream = reader.subscribe(UpdateRate::Native);

        // The current (empty) snapshot arrives first.
        let initial = stream.next().await.unwrap();
        assert_eq!(initial.roll_deg, None);

        writer.apply(attitude(5.0), Instant::now());
        assert_eq!(stream.next().await.unwrap().roll_deg, Some(5.0));

        writer.apply(attitude(6.0), Instant::now());
        assert_eq!(stream.next().await.unwrap().roll_deg, Some(6.0));
    }

    #[tokio::test(start_paused = true)]
    async fn paced_subscription_emits_latest_at_interval() {
        let (writer, reader) = TelemetryStore::channel(30.0);
        let mut stream = reader.subscribe(UpdateRate::Max(10));

        writer.apply(attitude(1.0), Instant::now());
        writer.apply(attitude(2.0), Instant::now());
        writer.apply(attitude(3.0), Instant::now());

        // Intermediate values are skipped; only the latest survives.
        let first = stream.next().await.unwrap();
        assert_eq!(first.roll_deg, Some(3.0));

        let before = tokio::time::Instant::now();
        writer.apply(attitude(4.0), Instant::now());
        let second = stream.next().await.unwrap();
        assert_eq!(second.roll_deg, Some(4.0));
        assert!(tokio::time::Instant::now() - before >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn paced_subscription_stays_pending_on_a_quiet_link() {
        let (writer, reader) = TelemetryStore::channel(30.0);
        let mut stream = reader.subscribe(UpdateRate::Max(10));

        // Drain the initial snapshot.
        stream.next().await.unwrap();

        // No publishes: the stream must wait, not terminate.
        assert!(timeout(Duration::from_secs(1), stream.next()).await.is_err());

        writer.apply(attitude(7.0), Instant::now());
        let resumed = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
        assert_eq!(resumed.unwrap().roll_deg, Some(7.0));
    }
}
