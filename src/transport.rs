//! Byte-level transport abstraction and the live serial implementation.
//!
//! MSP is strictly request/response over one half-duplex wire, so the seam
//! sits at the byte level: write one encoded frame, read whatever bytes
//! have arrived. The acquisition loop is written against [`MspTransport`];
//! production uses [`SerialTransport`], tests and benches substitute
//! scripted implementations.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use crate::config::LinkConfig;
use crate::{Result, TelemetryError};

/// One half-duplex byte link to a flight controller.
#[async_trait]
pub trait MspTransport: Send + 'static {
    /// Write one encoded request frame to the wire.
    async fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Read available bytes into `buf`, waiting at most `timeout`.
    ///
    /// Returns the number of bytes read; `Ok(0)` means the line was quiet
    /// for the whole timeout, which is normal between responses and never
    /// an error.
    async fn read_some(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;
}

/// Live transport over an async serial port.
pub struct SerialTransport {
    stream: SerialStream,
}

impl SerialTransport {
    /// Open the configured serial device. Failure here is fatal: there is
    /// no link to degrade to.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let stream = tokio_serial::new(&config.port, config.baud_rate)
            .open_native_async()
            .map_err(|err| TelemetryError::transport_open(&config.port, Box::new(err)))?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl MspTransport for SerialTransport {
    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.stream
            .write_all(frame)
            .await
            .map_err(|err| TelemetryError::transport("write", err))?;
        self.stream.flush().await.map_err(|err| TelemetryError::transport("flush", err))
    }

    async fn read_some(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        match tokio::time::timeout(timeout, self.stream.read(buf)).await {
            // A quiet line is not an error; the caller just polls again
            // on its next iteration.
            Err(_elapsed) => Ok(0),
            Ok(Ok(n)) => Ok(n),
            Ok(Err(err)) => Err(TelemetryError::transport("read", err)),
        }
    }
}
