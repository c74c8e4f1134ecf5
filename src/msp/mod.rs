//! MSP wire protocol: framing, message identity and payload decoding.
//!
//! MSP (MultiWii Serial Protocol) is the request/response protocol spoken by
//! INAV/Betaflight-family flight controllers over a half-duplex serial link.
//! Every frame shares one shape:
//!
//! ```text
//! ┌─────┬─────┬─────┬────────┬────────┬─────────────┬──────────┐
//! │ '$' │ 'M' │ dir │ LENGTH │ MSG ID │ PAYLOAD     │ CHECKSUM │
//! │ 1B  │ 1B  │ 1B  │ 1B     │ 1B     │ 0–255B      │ 1B       │
//! └─────┴─────┴─────┴────────┴────────┴─────────────┴──────────┘
//! ```
//!
//! `dir` is `'<'` for requests (host → FC) and `'>'` for responses
//! (FC → host). The checksum is the XOR of LENGTH, MSG ID and every payload
//! byte. Telemetry requests always carry an empty payload, so a request is a
//! fixed six bytes.
//!
//! Message id values vary across firmware protocol revisions, so they are
//! carried in a [`MessageTable`] supplied through configuration rather than
//! baked into the codec. [`MessageTable::default`] matches current INAV.

mod codec;
mod decode;

pub use codec::{
    DIR_REQUEST, DIR_RESPONSE, FRAME_OVERHEAD, FRAME_START, FrameDecoder, REQUEST_FRAME_LEN,
    ResponseFrame, encode_request, xor_checksum,
};
pub use decode::decode_message;

use serde::{Deserialize, Serialize};

use crate::{Result, TelemetryError};

/// The telemetry message categories this link consumes.
///
/// Variants are named after the MSP messages they correspond to; the typed
/// update records in [`crate::types`] carry the semantic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Roll, pitch and yaw (`MSP_ATTITUDE`).
    Attitude,
    /// Barometric altitude and vertical speed (`MSP_ALTITUDE`).
    Altitude,
    /// GPS fix, position, speed and course (`MSP_RAW_GPS`).
    RawGps,
    /// Battery voltage, current draw and RSSI (`MSP_ANALOG`).
    Analog,
    /// Distance and direction to the home point (`MSP_COMP_GPS`).
    CompGps,
}

impl MessageKind {
    /// Short lowercase name used in log fields and decode errors.
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Attitude => "attitude",
            MessageKind::Altitude => "altitude",
            MessageKind::RawGps => "raw_gps",
            MessageKind::Analog => "analog",
            MessageKind::CompGps => "comp_gps",
        }
    }
}

/// Maps the configurable wire message ids onto [`MessageKind`]s.
///
/// The numeric ids belong to the flight-controller firmware's protocol
/// revision and are configuration, not protocol constants. Defaults match
/// the INAV MSPv1 telemetry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTable {
    pub attitude: u8,
    pub altitude: u8,
    pub raw_gps: u8,
    pub analog: u8,
    pub comp_gps: u8,
}

impl Default for MessageTable {
    fn default() -> Self {
        Self { attitude: 108, altitude: 109, raw_gps: 106, analog: 110, comp_gps: 107 }
    }
}

impl MessageTable {
    /// Classify a wire message id. Unknown ids return `None` and are ignored
    /// by the acquisition loop.
    pub fn kind_of(&self, message_id: u8) -> Option<MessageKind> {
        if message_id == self.attitude {
            Some(MessageKind::Attitude)
        } else if message_id == self.altitude {
            Some(MessageKind::Altitude)
        } else if message_id == self.raw_gps {
            Some(MessageKind::RawGps)
        } else if message_id == self.analog {
            Some(MessageKind::Analog)
        } else if message_id == self.comp_gps {
            Some(MessageKind::CompGps)
        } else {
            None
        }
    }

    /// The wire id for a message kind.
    pub fn id_of(&self, kind: MessageKind) -> u8 {
        match kind {
            MessageKind::Attitude => self.attitude,
            MessageKind::Altitude => self.altitude,
            MessageKind::RawGps => self.raw_gps,
            MessageKind::Analog => self.analog,
            MessageKind::CompGps => self.comp_gps,
        }
    }

    /// Reject tables that assign one id to two message kinds.
    pub fn validate(&self) -> Result<()> {
        let ids = [self.attitude, self.altitude, self.raw_gps, self.analog, self.comp_gps];
        for (i, id) in ids.iter().enumerate() {
            if ids[i + 1..].contains(id) {
                return Err(TelemetryError::config(format!(
                    "message table assigns id {} to more than one message",
                    id
                )));
            }
        }
        Ok(())
    }
}
