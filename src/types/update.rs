//! Typed update records produced by the payload decoders.
//!
//! One record per telemetry message; the acquisition task applies each
//! record to the store as a unit, so a multi-field message like GPS never
//! becomes visible half-written.

/// GPS solution tier carried in the `RAW_GPS` fix byte.
///
/// Position and ground speed are only trustworthy with a three-dimensional
/// fix; course is usable from the first fix tier and the satellite count is
/// meaningful at every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpsFix {
    /// No solution.
    #[default]
    None,
    /// Two-dimensional solution; position is not reliable.
    Fix2d,
    /// Full three-dimensional solution.
    Fix3d,
}

impl GpsFix {
    /// Map the wire byte: 0 is no fix, 1 two-dimensional, 2 and above
    /// three-dimensional.
    pub fn from_wire(byte: u8) -> Self {
        match byte {
            0 => GpsFix::None,
            1 => GpsFix::Fix2d,
            _ => GpsFix::Fix3d,
        }
    }

    /// Whether position and ground speed are defined at this tier.
    pub fn is_3d(self) -> bool {
        matches!(self, GpsFix::Fix3d)
    }

    /// Whether any solution exists. Course is defined from the first tier.
    pub fn has_fix(self) -> bool {
        !matches!(self, GpsFix::None)
    }
}

/// Vehicle attitude. Roll and pitch arrive in tenths of a degree, yaw in
/// whole degrees; all three are normalized to degrees here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeUpdate {
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
}

/// Barometric altitude and climb rate, normalized from centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeUpdate {
    pub altitude_m: f64,
    pub vertical_speed_ms: f64,
}

/// GPS solution. Position and speed are `None` below a 3D fix, course is
/// `None` only without a fix; the satellite count is reported at every
/// tier. Course is passed through in firmware units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsUpdate {
    pub fix: GpsFix,
    pub satellites: u8,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub ground_speed_ms: Option<f64>,
    pub course: Option<u16>,
}

/// Electrical state. RSSI is only present when the firmware appends it to
/// the analog payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalogUpdate {
    pub battery_v: f64,
    pub current_a: f64,
    pub rssi: Option<u16>,
}

/// Distance and bearing back to the arming point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeVectorUpdate {
    pub distance_m: u16,
    pub direction_deg: i16,
}

/// One decoded telemetry message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryUpdate {
    Attitude(AttitudeUpdate),
    Altitude(AltitudeUpdate),
    Gps(GpsUpdate),
    Analog(AnalogUpdate),
    HomeVector(HomeVectorUpdate),
}

impl TelemetryUpdate {
    /// Short lowercase name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryUpdate::Attitude(_) => "attitude",
            TelemetryUpdate::Altitude(_) => "altitude",
            TelemetryUpdate::Gps(_) => "gps",
            TelemetryUpdate::Analog(_) => "analog",
            TelemetryUpdate::HomeVector(_) => "home_vector",
        }
    }
}
