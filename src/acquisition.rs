//! The acquisition task: polls the controller and feeds the store.
//!
//! One spawned task owns the transport, the frame decoder, the poll
//! scheduler and the store's writer half. Each iteration sends the requests
//! that are due, drains inbound bytes for a bounded slice, applies every
//! cleanly decoded message and then yields. Frame corruption and transport
//! hiccups are counted, logged and retried; the task only stops when its
//! cancellation token fires. Connecting is the caller's job, so a dead
//! device fails fast while a dying one degrades to stale data.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::LinkConfig;
use crate::msp::{FrameDecoder, ResponseFrame, decode_message, encode_request};
use crate::scheduler::PollScheduler;
use crate::store::{TelemetryReader, TelemetryStore, TelemetryWriter};
use crate::transport::MspTransport;
use crate::Result;

/// Consecutive transport failures before escalating the log level. The
/// loop keeps retrying regardless.
const ERROR_ESCALATION_THRESHOLD: u32 = 10;

/// Result of spawning the acquisition task.
pub struct AcquisitionChannels {
    /// Reader half of the freshly created store.
    pub reader: TelemetryReader,
    /// Cancellation token for graceful shutdown.
    pub cancel: CancellationToken,
}

/// Spawns and manages the acquisition task.
pub struct Acquisition;

impl Acquisition {
    /// Create the store, spawn the acquisition task over `transport` and
    /// return the consumer-facing handles.
    pub fn spawn<T>(transport: T, config: LinkConfig) -> AcquisitionChannels
    where
        T: MspTransport,
    {
        let (writer, reader) = TelemetryStore::channel(config.source_hz());
        let scheduler = PollScheduler::new(config.request_classes());
        let cancel = CancellationToken::new();

        let task = AcquisitionTask {
            transport,
            writer,
            scheduler,
            decoder: FrameDecoder::new(),
            config,
            counters: Counters::default(),
        };

        let cancel_task = cancel.clone();
        tokio::spawn(async move {
            task.run(cancel_task).await;
        });

        AcquisitionChannels { reader, cancel }
    }
}

#[derive(Debug, Default)]
struct Counters {
    updates: u64,
    framing_errors: u64,
    decode_errors: u64,
    transport_errors: u64,
}

struct AcquisitionTask<T> {
    transport: T,
    writer: TelemetryWriter,
    scheduler: PollScheduler,
    decoder: FrameDecoder,
    config: LinkConfig,
    counters: Counters,
}

impl<T: MspTransport> AcquisitionTask<T> {
    async fn run(mut self, cancel: CancellationToken) {
        info!("acquisition task started on {}", self.config.port);
        let mut consecutive_errors = 0u32;

        loop {
            if cancel.is_cancelled() {
                info!("acquisition task cancelled");
                break;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("acquisition task cancelled mid-iteration");
                    break;
                }
                result = self.run_iteration() => result,
            };

            match result {
                Ok(()) => {
                    consecutive_errors = 0;
                }
                Err(e) => {
                    self.counters.transport_errors += 1;
                    consecutive_errors += 1;
                    warn!("transport error ({consecutive_errors} consecutive): {e}");
                    if consecutive_errors == ERROR_ESCALATION_THRESHOLD {
                        error!(
                            "link persistently failing after {consecutive_errors} attempts, \
                             still retrying"
                        );
                    }

                    // Byte continuity across a failed read is gone; start
                    // the next scan from a clean buffer.
                    self.decoder.clear();

                    // Exponential backoff: 100ms, 200ms, ... capped at 1.6s.
                    let backoff =
                        std::time::Duration::from_millis(50 * (1 << consecutive_errors.min(5)));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        info!(
            "acquisition task ended ({} updates, {} framing errors, {} decode errors, \
             {} transport errors)",
            self.counters.updates,
            self.counters.framing_errors,
            self.counters.decode_errors,
            self.counters.transport_errors
        );
    }

    /// One poll-drain-sleep cycle. Returns `Err` only for transport
    /// failures; corrupt frames are consumed internally.
    async fn run_iteration(&mut self) -> Result<()> {
        let now = tokio::time::Instant::now().into_std();
        for id in self.scheduler.poll_due(now) {
            self.transport.write_frame(&encode_request(id)).await?;
            trace!("requested message {id}");
        }

        self.drain_inbound().await?;

        tokio::time::sleep(self.config.idle_delay()).await;
        Ok(())
    }

    /// Pull inbound bytes through the decoder until the line goes quiet or
    /// the drain budget is spent. The budget keeps one chatty burst from
    /// starving the request schedule.
    async fn drain_inbound(&mut self) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.config.drain_budget();
        let mut buf = [0u8; 512];

        loop {
            let n = self.transport.read_some(&mut buf, self.config.read_timeout()).await?;
            if n == 0 {
                return Ok(());
            }
            self.decoder.extend(&buf[..n]);
            self.decode_buffered();

            if tokio::time::Instant::now() >= deadline {
                return Ok(());
            }
        }
    }

    /// Decode every complete frame sitting in the accumulation buffer.
    fn decode_buffered(&mut self) {
        loop {
            match self.decoder.try_decode() {
                Ok(Some(frame)) => self.handle_frame(frame),
                Ok(None) => return,
                Err(e) => {
                    // Recoverable: the decoder has already resynchronized.
                    self.counters.framing_errors += 1;
                    debug!("framing error: {e}");
                }
            }
        }
    }

    fn handle_frame(&mut self, frame: ResponseFrame) {
        let Some(kind) = self.config.messages.kind_of(frame.message_id) else {
            trace!("ignoring unrequested message id {}", frame.message_id);
            return;
        };

        match decode_message(kind, &frame.payload) {
            Ok(update) => {
                self.counters.updates += 1;
                self.writer.apply(update, self.now());
                trace!("applied {} update", update.name());
            }
            Err(e) => {
                // Prior values stay published; this response is dropped.
                self.counters.decode_errors += 1;
                debug!("decode error: {e}");
            }
        }
    }

    /// Scheduler and snapshot timestamps come off the tokio clock so tests
    /// under `start_paused` drive acquisition deterministically.
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}
