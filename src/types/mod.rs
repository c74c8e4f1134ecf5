//! Core types for telemetry data representation.
//!
//! Everything a consumer sees flows through two layers:
//!
//! - [`TelemetryUpdate`] and its per-message records are the typed output of
//!   the payload decoders, one record per MSP message.
//! - [`TelemetrySnapshot`] is the merged latest-value view the store
//!   publishes; every quantity is independently optional so "never seen" and
//!   "zero" stay distinguishable.
//! - [`UpdateRate`] lets each rendering surface pick its own cadence when
//!   subscribing to snapshot changes.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::time::Instant;
//! use glasslink::types::{
//!     AltitudeUpdate, GpsFix, GpsUpdate, TelemetrySnapshot, TelemetryUpdate,
//! };
//!
//! let mut snapshot = TelemetrySnapshot::default();
//! snapshot.apply(
//!     TelemetryUpdate::Gps(GpsUpdate {
//!         fix: GpsFix::Fix3d,
//!         satellites: 11,
//!         latitude_deg: Some(52.229_7),
//!         longitude_deg: Some(21.012_2),
//!         ground_speed_ms: Some(3.0),
//!         course: Some(900),
//!     }),
//!     Instant::now(),
//! );
//! snapshot.apply(
//!     TelemetryUpdate::Altitude(AltitudeUpdate {
//!         altitude_m: 120.5,
//!         vertical_speed_ms: 4.0,
//!     }),
//!     Instant::now(),
//! );
//!
//! assert_eq!(snapshot.satellites, Some(11));
//! assert_eq!(snapshot.speed_3d(), Some(5.0)); // hypot(3, 4)
//! ```

mod snapshot;
mod update;
mod update_rate;

pub use snapshot::TelemetrySnapshot;
pub use update::{
    AltitudeUpdate, AnalogUpdate, AttitudeUpdate, GpsFix, GpsUpdate, HomeVectorUpdate,
    TelemetryUpdate,
};
pub use update_rate::UpdateRate;
