//! The shared point-in-time view of every telemetry quantity.

use std::time::{Duration, Instant};

use crate::types::update::{GpsFix, TelemetryUpdate};

/// Latest known value of every quantity the link acquires.
///
/// Every field is independently optional: `None` means the value has never
/// been decoded, or is undefined at the current GPS fix tier. A cockpit
/// renders that differently from a legitimate zero, so absence is never
/// collapsed into a default value.
///
/// Snapshots are cheap to clone and internally consistent: a multi-field
/// message is applied as one batch, so readers never observe, say, a new
/// latitude paired with the previous longitude.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetrySnapshot {
    /// Roll angle in degrees, right wing down positive.
    pub roll_deg: Option<f64>,
    /// Pitch angle in degrees, nose up positive.
    pub pitch_deg: Option<f64>,
    /// Heading in degrees.
    pub yaw_deg: Option<f64>,

    /// Barometric altitude in meters.
    pub altitude_m: Option<f64>,
    /// Climb rate in meters per second, up positive.
    pub vertical_speed_ms: Option<f64>,

    /// Current GPS solution tier.
    pub fix: GpsFix,
    /// Satellites in the solution; defined at every fix tier.
    pub satellites: Option<u8>,
    /// Latitude in degrees; defined only with a 3D fix.
    pub latitude_deg: Option<f64>,
    /// Longitude in degrees; defined only with a 3D fix.
    pub longitude_deg: Option<f64>,
    /// Speed over ground in meters per second; defined only with a 3D fix.
    pub ground_speed_ms: Option<f64>,
    /// Course over ground in firmware units; defined from a 2D fix.
    pub course: Option<u16>,

    /// Battery voltage in volts.
    pub battery_v: Option<f64>,
    /// Current draw in amperes.
    pub current_a: Option<f64>,
    /// Receiver signal strength, 0–1023, when the firmware reports it.
    pub rssi: Option<u16>,

    /// Distance to the arming point in meters.
    pub home_distance_m: Option<u16>,
    /// Bearing to the arming point in degrees.
    pub home_direction_deg: Option<i16>,

    /// When the most recent update batch was applied.
    pub last_update: Option<Instant>,
}

impl TelemetrySnapshot {
    /// Merge one decoded message into this snapshot.
    ///
    /// Only the fields the message carries change; everything else keeps
    /// its previous value (last-write-wins per field). A GPS update below
    /// the 3D tier carries absent position fields and therefore clears
    /// them: a fix loss must not leave a confidently wrong position on a
    /// moving map.
    pub fn apply(&mut self, update: TelemetryUpdate, now: Instant) {
        match update {
            TelemetryUpdate::Attitude(att) => {
                self.roll_deg = Some(att.roll_deg);
                self.pitch_deg = Some(att.pitch_deg);
                self.yaw_deg = Some(att.yaw_deg);
            }
            TelemetryUpdate::Altitude(alt) => {
                self.altitude_m = Some(alt.altitude_m);
                self.vertical_speed_ms = Some(alt.vertical_speed_ms);
            }
            TelemetryUpdate::Gps(gps) => {
                self.fix = gps.fix;
                self.satellites = Some(gps.satellites);
                self.latitude_deg = gps.latitude_deg;
                self.longitude_deg = gps.longitude_deg;
                self.ground_speed_ms = gps.ground_speed_ms;
                self.course = gps.course;
            }
            TelemetryUpdate::Analog(analog) => {
                self.battery_v = Some(analog.battery_v);
                self.current_a = Some(analog.current_a);
                self.rssi = analog.rssi;
            }
            TelemetryUpdate::HomeVector(home) => {
                self.home_distance_m = Some(home.distance_m);
                self.home_direction_deg = Some(home.direction_deg);
            }
        }
        self.last_update = Some(now);
    }

    /// Total speed: the magnitude of GPS ground speed and barometric climb
    /// rate combined. Defined only when both inputs are.
    pub fn speed_3d(&self) -> Option<f64> {
        let ground = self.ground_speed_ms?;
        let vertical = self.vertical_speed_ms?;
        Some(ground.hypot(vertical))
    }

    /// Time elapsed since the last applied update, or `None` before the
    /// first one. Consumers use this to grey out a dead link.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.last_update.map(|at| now.saturating_duration_since(at))
    }
}
