//! Flight-controller telemetry acquisition for glass-cockpit displays.
//!
//! Glasslink polls an INAV/Betaflight-family flight controller over a
//! serial MSP link and republishes the latest telemetry as consistent
//! snapshots that any number of display loops consume at their own frame
//! rates.
//!
//! # Features
//!
//! - **Multi-rate polling**: attitude at 30 Hz for the artificial horizon,
//!   navigation and electrical data at 15 Hz, over one half-duplex wire
//! - **Resilient framing**: XOR checksum verification with automatic
//!   resynchronization; corruption costs one frame, never the link
//! - **Latest-value store**: wait-free snapshots per rendering surface,
//!   plus rate-paced subscription streams
//! - **Deterministic testing**: the transport is a trait and all
//!   scheduling runs off an injected clock
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use glasslink::{Glasslink, LinkConfig, UpdateRate};
//!
//! #[tokio::main]
//! async fn main() -> glasslink::Result<()> {
//!     let link = Glasslink::connect(LinkConfig::default()).await?;
//!
//!     let mut horizon = link.subscribe(UpdateRate::Max(30));
//!     while let Some(snapshot) = horizon.next().await {
//!         if let (Some(roll), Some(pitch)) = (snapshot.roll_deg, snapshot.pitch_deg) {
//!             println!("roll {roll:+6.1}  pitch {pitch:+6.1}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Wire protocol
pub mod msp;

// Acquisition architecture
pub mod acquisition;
pub mod link;
pub mod scheduler;
pub mod store;
pub mod stream;
pub mod transport;

// Core exports
pub use config::LinkConfig;
pub use error::*;
pub use types::*;

// Protocol exports
pub use msp::{MessageKind, MessageTable};

// Main API exports
pub use link::TelemetryLink;
pub use store::{TelemetryReader, TelemetryStore, TelemetryWriter};
pub use transport::{MspTransport, SerialTransport};

/// Unified entry point for telemetry links.
///
/// # Examples
///
/// ## Live serial link
/// ```rust,no_run
/// use glasslink::{Glasslink, LinkConfig};
///
/// #[tokio::main]
/// async fn main() -> glasslink::Result<()> {
///     let link = Glasslink::connect(LinkConfig::default()).await?;
///     println!("satellites: {:?}", link.snapshot().satellites);
///     Ok(())
/// }
/// ```
///
/// ## Caller-supplied transport
/// ```rust,no_run
/// use glasslink::{Glasslink, LinkConfig, SerialTransport};
///
/// #[tokio::main]
/// async fn main() -> glasslink::Result<()> {
///     let config = LinkConfig::from_yaml_str("port: /dev/ttyUSB0\nbaud_rate: 57600\n")?;
///     let transport = SerialTransport::open(&config)?;
///     let link = Glasslink::attach(transport, config)?;
///     println!("battery: {:?}", link.snapshot().battery_v);
///     Ok(())
/// }
/// ```
pub struct Glasslink;

impl Glasslink {
    /// Open the configured serial device and start acquiring telemetry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the serial
    /// device cannot be opened. Once the link is up, transport trouble is
    /// retried inside the acquisition task and never surfaces here.
    pub async fn connect(config: LinkConfig) -> Result<TelemetryLink> {
        TelemetryLink::connect(config).await
    }

    /// Start acquiring over a caller-supplied transport.
    ///
    /// Behaves exactly like [`connect`](Self::connect) except that the
    /// byte link is provided by the caller: a scripted transport in
    /// tests, or an alternative carrier such as a TCP serial bridge.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn attach<T: MspTransport>(transport: T, config: LinkConfig) -> Result<TelemetryLink> {
        TelemetryLink::attach(transport, config)
    }
}
