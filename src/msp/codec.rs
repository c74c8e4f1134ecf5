//! Request encoding and the incremental response-frame decoder.
//!
//! The decoder is resilient by construction: bytes are only consumed from the
//! accumulation buffer once a complete frame has been verified, a corrupt
//! frame costs exactly its header, and everything else is skipped one byte at
//! a time until the next plausible start marker.

use crate::{Result, TelemetryError};

/// First byte of every MSP frame.
pub const FRAME_START: u8 = b'$';
/// Second byte of every MSP frame.
const FRAME_MARK: u8 = b'M';
/// Direction marker for host-to-controller requests.
pub const DIR_REQUEST: u8 = b'<';
/// Direction marker for controller-to-host responses.
pub const DIR_RESPONSE: u8 = b'>';
/// Bytes in a frame besides the payload: start, mark, direction, length,
/// message id, checksum.
pub const FRAME_OVERHEAD: usize = 6;
/// Telemetry requests carry no payload, so every request is this long.
pub const REQUEST_FRAME_LEN: usize = 6;

/// XOR of the length byte, the message id and every payload byte.
pub fn xor_checksum(length: u8, message_id: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(length ^ message_id, |acc, byte| acc ^ byte)
}

/// Build the canonical zero-payload request frame for a message id.
pub fn encode_request(message_id: u8) -> [u8; REQUEST_FRAME_LEN] {
    [
        FRAME_START,
        FRAME_MARK,
        DIR_REQUEST,
        0,
        message_id,
        xor_checksum(0, message_id, &[]),
    ]
}

/// A verified controller-to-host frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub message_id: u8,
    pub payload: Vec<u8>,
}

/// Incremental decoder over an unreliable byte stream.
///
/// Feed raw serial reads in with [`extend`](Self::extend), then call
/// [`try_decode`](Self::try_decode) until it reports `Ok(None)`. The decoder
/// never blocks and never discards the prefix of a frame that has merely not
/// finished arriving.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly received bytes to the accumulation buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of bytes currently held, including any partial frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Discard all buffered bytes. Used when the underlying transport is
    /// reopened and continuity with the previous byte stream is lost.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Attempt to extract the next complete response frame.
    ///
    /// Returns `Ok(Some(frame))` for a verified frame, `Ok(None)` when the
    /// buffer holds no complete frame yet, and `Err` when a frame failed its
    /// checksum. After a checksum error the bad frame's header has been
    /// dropped and the next call resynchronizes on the following start
    /// marker, so callers should keep calling after an error.
    pub fn try_decode(&mut self) -> Result<Option<ResponseFrame>> {
        loop {
            // Drop everything up to the next start marker.
            let Some(start) = self.buf.iter().position(|&b| b == FRAME_START) else {
                self.buf.clear();
                return Ok(None);
            };
            if start > 0 {
                self.buf.drain(..start);
            }

            // Validate the header byte by byte, keeping partial headers.
            if self.buf.len() < 2 {
                return Ok(None);
            }
            if self.buf[1] != FRAME_MARK {
                self.buf.drain(..1);
                continue;
            }
            if self.buf.len() < 3 {
                return Ok(None);
            }
            match self.buf[2] {
                DIR_RESPONSE => {}
                DIR_REQUEST => {
                    // Our own request echoed back on a half-duplex wire.
                    // Not a response; drop the header and rescan.
                    self.buf.drain(..3);
                    continue;
                }
                _ => {
                    self.buf.drain(..1);
                    continue;
                }
            }

            // Consume nothing until the whole frame has arrived.
            if self.buf.len() < 4 {
                return Ok(None);
            }
            let length = usize::from(self.buf[3]);
            let total = FRAME_OVERHEAD + length;
            if self.buf.len() < total {
                return Ok(None);
            }

            let message_id = self.buf[4];
            let payload = &self.buf[5..5 + length];
            let expected = xor_checksum(self.buf[3], message_id, payload);
            let found = self.buf[5 + length];
            if expected != found {
                // Drop only the header so the next call rescans the rest;
                // the real next frame's start marker survives.
                self.buf.drain(..3);
                return Err(TelemetryError::checksum_mismatch(message_id, expected, found));
            }

            let payload = payload.to_vec();
            self.buf.drain(..total);
            return Ok(Some(ResponseFrame { message_id, payload }));
        }
    }
}
