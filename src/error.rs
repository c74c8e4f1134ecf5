//! Error types for telemetry acquisition.
//!
//! All failures the link can produce fall into a small taxonomy:
//!
//! - **Framing**: a candidate response frame failed its checksum. The codec
//!   drops the frame and resynchronizes; one sample is lost.
//! - **Decode**: a response payload was shorter than the message layout
//!   requires. Previously stored field values are retained.
//! - **Transport**: a read or write on an open serial link failed. The
//!   acquisition loop logs it and retries on the next iteration.
//! - **TransportOpen**: the serial port could not be opened at startup.
//!   Fatal, since there is no useful degraded mode without a telemetry
//!   source.
//! - **Config**: the supplied [`LinkConfig`](crate::LinkConfig) is invalid.
//!
//! Per-frame errors never propagate to consumers: a rendering surface only
//! ever observes a field as absent or possibly stale, never as an error.
//!
//! ```rust
//! use glasslink::TelemetryError;
//!
//! let err = TelemetryError::checksum_mismatch(108, 0x6a, 0x6b);
//! assert!(err.is_retryable());
//! assert!(!err.is_fatal());
//! ```

use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for telemetry acquisition.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error(
        "checksum mismatch on message {message_id}: expected {expected:#04x}, found {found:#04x}"
    )]
    Framing { message_id: u8, expected: u8, found: u8 },

    #[error("short payload for {message}: need {expected} bytes, got {actual}")]
    Decode { message: &'static str, expected: usize, actual: usize },

    #[error("transport {operation} failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open telemetry port {port}")]
    TransportOpen {
        port: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

impl TelemetryError {
    /// Returns whether the acquisition loop may continue after this error.
    ///
    /// Framing, decode and transport errors cost at most one sample and are
    /// absorbed by the loop. Open and configuration failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Framing { .. } => true,
            TelemetryError::Decode { .. } => true,
            TelemetryError::Transport { .. } => true,
            TelemetryError::TransportOpen { .. } => false,
            TelemetryError::Config { .. } => false,
        }
    }

    /// Returns whether this error aborts link construction.
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }

    /// Helper constructor for codec checksum failures.
    pub fn checksum_mismatch(message_id: u8, expected: u8, found: u8) -> Self {
        TelemetryError::Framing { message_id, expected, found }
    }

    /// Helper constructor for short-payload decode failures.
    pub fn short_payload(message: &'static str, expected: usize, actual: usize) -> Self {
        TelemetryError::Decode { message, expected, actual }
    }

    /// Helper constructor for read/write failures on an open transport.
    pub fn transport(operation: &'static str, source: std::io::Error) -> Self {
        TelemetryError::Transport { operation, source }
    }

    /// Helper constructor for port open failures.
    pub fn transport_open(
        port: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::TransportOpen { port: port.into(), source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        TelemetryError::Config { reason: reason.into() }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::Transport { operation: "io", source: err }
    }
}
