//! The consumer-facing telemetry link.

use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::Result;
use crate::acquisition::Acquisition;
use crate::config::LinkConfig;
use crate::store::TelemetryReader;
use crate::transport::{MspTransport, SerialTransport};
use crate::types::{TelemetrySnapshot, UpdateRate};

/// A running telemetry link.
///
/// Owns the acquisition task and cancels it on drop. Each rendering
/// surface takes its own [`TelemetryReader`] via [`reader`](Self::reader);
/// the link also exposes the snapshot and subscription surface directly
/// for single-consumer use.
#[derive(Debug)]
pub struct TelemetryLink {
    reader: TelemetryReader,
    config: LinkConfig,
    cancel: CancellationToken,
}

impl TelemetryLink {
    /// Open the configured serial device and start acquiring.
    ///
    /// Fails fast when the configuration is invalid or the device cannot
    /// be opened; once this returns, transport trouble degrades to stale
    /// data instead of surfacing as errors.
    pub async fn connect(config: LinkConfig) -> Result<Self> {
        config.validate()?;
        info!("connecting to flight controller on {} at {} baud", config.port, config.baud_rate);
        let transport = SerialTransport::open(&config)?;
        Ok(Self::start(transport, config))
    }

    /// Start acquiring over a caller-supplied transport.
    ///
    /// This is the seam for tests, benchmarks and alternative byte links
    /// such as a TCP serial bridge.
    pub fn attach<T: MspTransport>(transport: T, config: LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::start(transport, config))
    }

    fn start<T: MspTransport>(transport: T, config: LinkConfig) -> Self {
        let channels = Acquisition::spawn(transport, config.clone());
        info!("telemetry link up (fast {} Hz, slow {} Hz)", config.fast_hz, config.slow_hz);
        Self { reader: channels.reader, config, cancel: channels.cancel }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.reader.snapshot()
    }

    /// Snapshots paced to the requested rate, latest-wins.
    pub fn subscribe(
        &self,
        rate: UpdateRate,
    ) -> impl Stream<Item = TelemetrySnapshot> + Send + 'static {
        self.reader.subscribe(rate)
    }

    /// A reader handle to move into a rendering task.
    pub fn reader(&self) -> TelemetryReader {
        self.reader.clone()
    }

    /// The rate snapshots are published at.
    pub fn source_hz(&self) -> f64 {
        self.reader.source_hz()
    }

    /// The configuration this link runs with.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

impl Drop for TelemetryLink {
    fn drop(&mut self) {
        debug!("dropping telemetry link");
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TelemetryError;
    use crate::test_utils::{ScriptedWire, attitude_payload};

    use std::time::Duration;

    #[tokio::test]
    async fn attach_rejects_invalid_config() {
        let _ = tracing_subscriber::fmt::try_init();
        let wire = ScriptedWire::new();
        let config = LinkConfig { fast_hz: 5, slow_hz: 15, ..LinkConfig::default() };
        let err = TelemetryLink::attach(wire.transport(), config).unwrap_err();
        assert!(matches!(err, TelemetryError::Config { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_link_stops_acquisition() {
        let _ = tracing_subscriber::fmt::try_init();
        let wire = ScriptedWire::new();
        let link = TelemetryLink::attach(wire.transport(), LinkConfig::default()).unwrap();
        let reader = link.reader();

        wire.push_response(108, &attitude_payload(100, 0, 0));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(reader.snapshot().roll_deg, Some(10.0));

        drop(link);
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The task is gone; late responses change nothing.
        wire.push_response(108, &attitude_payload(200, 0, 0));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(reader.snapshot().roll_deg, Some(10.0));
    }
}
