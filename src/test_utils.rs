//! Test utilities: wire payload builders and a scripted transport.
//!
//! Shared by unit tests, the integration test and the benchmarks, so the
//! exact byte layouts live in one place.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::msp::{DIR_RESPONSE, FRAME_START, xor_checksum};
use crate::transport::MspTransport;
use crate::{Result, TelemetryError};

/// Build a complete controller-to-host frame around a payload.
pub fn encode_response(message_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(6 + payload.len());
    frame.push(FRAME_START);
    frame.push(b'M');
    frame.push(DIR_RESPONSE);
    frame.push(payload.len() as u8);
    frame.push(message_id);
    frame.extend_from_slice(payload);
    frame.push(xor_checksum(payload.len() as u8, message_id, payload));
    frame
}

/// Attitude payload: roll and pitch in tenths of a degree, yaw in degrees.
pub fn attitude_payload(roll_raw: i16, pitch_raw: i16, yaw_raw: i16) -> Vec<u8> {
    let mut payload = Vec::with_capacity(6);
    payload.extend_from_slice(&roll_raw.to_le_bytes());
    payload.extend_from_slice(&pitch_raw.to_le_bytes());
    payload.extend_from_slice(&yaw_raw.to_le_bytes());
    payload
}

/// Altitude payload: centimeters and centimeters per second.
pub fn altitude_payload(altitude_cm: i32, vspeed_cms: i16) -> Vec<u8> {
    let mut payload = Vec::with_capacity(6);
    payload.extend_from_slice(&altitude_cm.to_le_bytes());
    payload.extend_from_slice(&vspeed_cms.to_le_bytes());
    payload
}

/// Raw GPS payload: fix byte, satellites, position in degrees times ten
/// million, GPS altitude in centimeters, speed in centimeters per second,
/// course in firmware units.
pub fn gps_payload(
    fix: u8,
    satellites: u8,
    lat_e7: i32,
    lon_e7: i32,
    gps_alt_cm: i32,
    speed_cms: u16,
    course: u16,
) -> Vec<u8> {
    let mut payload = Vec::with_capacity(18);
    payload.push(fix);
    payload.push(satellites);
    payload.extend_from_slice(&lat_e7.to_le_bytes());
    payload.extend_from_slice(&lon_e7.to_le_bytes());
    payload.extend_from_slice(&gps_alt_cm.to_le_bytes());
    payload.extend_from_slice(&speed_cms.to_le_bytes());
    payload.extend_from_slice(&course.to_le_bytes());
    payload
}

/// Analog payload without trailing RSSI: tenths of a volt, hundredths of
/// an ampere.
pub fn analog_payload(vbat_dv: u8, current_ca: u16) -> Vec<u8> {
    let mut payload = Vec::with_capacity(3);
    payload.push(vbat_dv);
    payload.extend_from_slice(&current_ca.to_le_bytes());
    payload
}

/// Analog payload with the RSSI word newer firmware appends.
pub fn analog_payload_with_rssi(vbat_dv: u8, current_ca: u16, rssi: u16) -> Vec<u8> {
    let mut payload = analog_payload(vbat_dv, current_ca);
    payload.extend_from_slice(&rssi.to_le_bytes());
    payload
}

/// Home vector payload: meters and whole degrees.
pub fn home_payload(distance_m: u16, direction_deg: i16) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4);
    payload.extend_from_slice(&distance_m.to_le_bytes());
    payload.extend_from_slice(&direction_deg.to_le_bytes());
    payload
}

/// One scripted inbound event.
#[derive(Debug, Clone)]
enum ScriptedRead {
    Bytes(Vec<u8>),
    Error,
}

/// Test-side handle to a scripted wire.
///
/// The transport half moves into the acquisition task; this handle keeps
/// feeding it inbound bytes and inspecting what it wrote.
#[derive(Debug, Clone, Default)]
pub struct ScriptedWire {
    reads: Arc<Mutex<VecDeque<ScriptedRead>>>,
    written: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedWire {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transport half to hand to the acquisition task.
    pub fn transport(&self) -> ScriptedTransport {
        ScriptedTransport { reads: Arc::clone(&self.reads), written: Arc::clone(&self.written) }
    }

    /// Queue raw inbound bytes, delivered by one future read call.
    pub fn push_bytes(&self, bytes: impl Into<Vec<u8>>) {
        self.reads.lock().unwrap().push_back(ScriptedRead::Bytes(bytes.into()));
    }

    /// Queue a complete well-formed response frame.
    pub fn push_response(&self, message_id: u8, payload: &[u8]) {
        self.push_bytes(encode_response(message_id, payload));
    }

    /// Queue one read failure.
    pub fn push_error(&self) {
        self.reads.lock().unwrap().push_back(ScriptedRead::Error);
    }

    /// Everything the acquisition task has written so far.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().unwrap().clone()
    }
}

/// Scripted [`MspTransport`]: reads come from the queue, writes are
/// recorded. An empty queue reads as a quiet line.
#[derive(Debug)]
pub struct ScriptedTransport {
    reads: Arc<Mutex<VecDeque<ScriptedRead>>>,
    written: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait]
impl MspTransport for ScriptedTransport {
    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.written.lock().unwrap().push(frame.to_vec());
        Ok(())
    }

    async fn read_some(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        let next = self.reads.lock().unwrap().pop_front();
        match next {
            None => Ok(0),
            Some(ScriptedRead::Error) => Err(TelemetryError::transport(
                "read",
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "scripted read failure"),
            )),
            Some(ScriptedRead::Bytes(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    // Hand the tail back so nothing scripted is lost.
                    self.reads
                        .lock()
                        .unwrap()
                        .push_front(ScriptedRead::Bytes(bytes[n..].to_vec()));
                }
                Ok(n)
            }
        }
    }
}
