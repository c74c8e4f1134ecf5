//! Pure payload decoders, one per telemetry message.
//!
//! Each decoder turns a verified response payload into a typed update
//! record. They hold no state and never touch the store; a payload shorter
//! than the message's fixed layout is a recoverable decode error and leaves
//! previously published values untouched. Longer payloads from newer
//! firmware are tolerated, the known prefix is decoded and the rest
//! ignored.

use crate::msp::MessageKind;
use crate::types::{
    AltitudeUpdate, AnalogUpdate, AttitudeUpdate, GpsFix, GpsUpdate, HomeVectorUpdate,
    TelemetryUpdate,
};
use crate::{Result, TelemetryError};

/// Decode one message payload into its typed update record.
pub fn decode_message(kind: MessageKind, payload: &[u8]) -> Result<TelemetryUpdate> {
    match kind {
        MessageKind::Attitude => decode_attitude(payload).map(TelemetryUpdate::Attitude),
        MessageKind::Altitude => decode_altitude(payload).map(TelemetryUpdate::Altitude),
        MessageKind::RawGps => decode_raw_gps(payload).map(TelemetryUpdate::Gps),
        MessageKind::Analog => decode_analog(payload).map(TelemetryUpdate::Analog),
        MessageKind::CompGps => decode_comp_gps(payload).map(TelemetryUpdate::HomeVector),
    }
}

fn i16_le(payload: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([payload[offset], payload[offset + 1]])
}

fn u16_le(payload: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([payload[offset], payload[offset + 1]])
}

fn i32_le(payload: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ])
}

/// Roll and pitch in tenths of a degree, yaw in whole degrees.
fn decode_attitude(payload: &[u8]) -> Result<AttitudeUpdate> {
    if payload.len() < 6 {
        return Err(TelemetryError::short_payload("attitude", 6, payload.len()));
    }
    Ok(AttitudeUpdate {
        roll_deg: f64::from(i16_le(payload, 0)) / 10.0,
        pitch_deg: f64::from(i16_le(payload, 2)) / 10.0,
        yaw_deg: f64::from(i16_le(payload, 4)),
    })
}

/// Altitude in centimeters, climb rate in centimeters per second.
fn decode_altitude(payload: &[u8]) -> Result<AltitudeUpdate> {
    if payload.len() < 6 {
        return Err(TelemetryError::short_payload("altitude", 6, payload.len()));
    }
    Ok(AltitudeUpdate {
        altitude_m: f64::from(i32_le(payload, 0)) / 100.0,
        vertical_speed_ms: f64::from(i16_le(payload, 4)) / 100.0,
    })
}

/// Fix byte, satellite count, position in degrees times ten million,
/// ground speed in centimeters per second, course in firmware units.
/// Bytes 10..14 carry GPS altitude; the barometric source is used instead.
/// Position and speed need a 3D fix; course only needs a fix at all.
fn decode_raw_gps(payload: &[u8]) -> Result<GpsUpdate> {
    if payload.len() < 18 {
        return Err(TelemetryError::short_payload("raw_gps", 18, payload.len()));
    }
    let fix = GpsFix::from_wire(payload[0]);
    Ok(GpsUpdate {
        fix,
        satellites: payload[1],
        latitude_deg: fix.is_3d().then(|| f64::from(i32_le(payload, 2)) * 1e-7),
        longitude_deg: fix.is_3d().then(|| f64::from(i32_le(payload, 6)) * 1e-7),
        ground_speed_ms: fix.is_3d().then(|| f64::from(u16_le(payload, 14)) / 100.0),
        course: fix.has_fix().then(|| u16_le(payload, 16)),
    })
}

/// Battery voltage in tenths of a volt, current in hundredths of an
/// ampere. RSSI trails the fixed layout and is absent on older firmware.
fn decode_analog(payload: &[u8]) -> Result<AnalogUpdate> {
    if payload.len() < 3 {
        return Err(TelemetryError::short_payload("analog", 3, payload.len()));
    }
    Ok(AnalogUpdate {
        battery_v: f64::from(payload[0]) / 10.0,
        current_a: f64::from(u16_le(payload, 1)) / 100.0,
        rssi: (payload.len() >= 5).then(|| u16_le(payload, 3)),
    })
}

/// Distance to home in meters, direction in whole degrees.
fn decode_comp_gps(payload: &[u8]) -> Result<HomeVectorUpdate> {
    if payload.len() < 4 {
        return Err(TelemetryError::short_payload("comp_gps", 4, payload.len()));
    }
    Ok(HomeVectorUpdate { distance_m: u16_le(payload, 0), direction_deg: i16_le(payload, 2) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        altitude_payload, analog_payload, analog_payload_with_rssi, attitude_payload, gps_payload,
        home_payload,
    };

    #[test]
    fn attitude_scales_tenths_of_a_degree() {
        let update = decode_message(MessageKind::Attitude, &attitude_payload(450, -300, 180));
        let TelemetryUpdate::Attitude(att) = update.unwrap() else {
            panic!("wrong update kind");
        };
        assert_eq!(att.roll_deg, 45.0);
        assert_eq!(att.pitch_deg, -30.0);
        assert_eq!(att.yaw_deg, 180.0);
    }

    #[test]
    fn attitude_short_payload_is_a_decode_error() {
        let err = decode_message(MessageKind::Attitude, &[0; 5]).unwrap_err();
        assert!(err.is_retryable());
        match err {
            TelemetryError::Decode { message, expected, actual } => {
                assert_eq!(message, "attitude");
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn altitude_scales_centimeters() {
        let update = decode_message(MessageKind::Altitude, &altitude_payload(12_345, -150));
        let TelemetryUpdate::Altitude(alt) = update.unwrap() else {
            panic!("wrong update kind");
        };
        assert_eq!(alt.altitude_m, 123.45);
        assert_eq!(alt.vertical_speed_ms, -1.5);
    }

    #[test]
    fn altitude_tolerates_longer_firmware_payloads() {
        let mut payload = altitude_payload(500, 10);
        payload.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        let update = decode_message(MessageKind::Altitude, &payload).unwrap();
        let TelemetryUpdate::Altitude(alt) = update else {
            panic!("wrong update kind");
        };
        assert_eq!(alt.altitude_m, 5.0);
    }

    #[test]
    fn gps_with_3d_fix_reports_position() {
        let payload = gps_payload(2, 11, 522_297_000, 210_122_000, 12_000, 300, 900);
        let update = decode_message(MessageKind::RawGps, &payload).unwrap();
        let TelemetryUpdate::Gps(gps) = update else {
            panic!("wrong update kind");
        };
        assert_eq!(gps.fix, GpsFix::Fix3d);
        assert_eq!(gps.satellites, 11);
        assert!((gps.latitude_deg.unwrap() - 52.2297).abs() < 1e-9);
        assert!((gps.longitude_deg.unwrap() - 21.0122).abs() < 1e-9);
        assert_eq!(gps.ground_speed_ms, Some(3.0));
        assert_eq!(gps.course, Some(900));
    }

    #[test]
    fn gps_without_fix_reports_only_satellites() {
        let payload = gps_payload(0, 4, 522_297_000, 210_122_000, 0, 300, 900);
        let update = decode_message(MessageKind::RawGps, &payload).unwrap();
        let TelemetryUpdate::Gps(gps) = update else {
            panic!("wrong update kind");
        };
        assert_eq!(gps.fix, GpsFix::None);
        assert_eq!(gps.satellites, 4);
        assert_eq!(gps.latitude_deg, None);
        assert_eq!(gps.longitude_deg, None);
        assert_eq!(gps.ground_speed_ms, None);
        assert_eq!(gps.course, None);
    }

    #[test]
    fn gps_with_2d_fix_reports_course_but_not_position() {
        let payload = gps_payload(1, 4, 522_297_000, 210_122_000, 0, 300, 900);
        let update = decode_message(MessageKind::RawGps, &payload).unwrap();
        let TelemetryUpdate::Gps(gps) = update else {
            panic!("wrong update kind");
        };
        assert_eq!(gps.fix, GpsFix::Fix2d);
        assert_eq!(gps.satellites, 4);
        assert_eq!(gps.latitude_deg, None);
        assert_eq!(gps.longitude_deg, None);
        assert_eq!(gps.ground_speed_ms, None);
        assert_eq!(gps.course, Some(900));
    }

    #[test]
    fn analog_scales_and_rssi_is_optional() {
        let update = decode_message(MessageKind::Analog, &analog_payload(162, 1250)).unwrap();
        let TelemetryUpdate::Analog(analog) = update else {
            panic!("wrong update kind");
        };
        assert_eq!(analog.battery_v, 16.2);
        assert_eq!(analog.current_a, 12.5);
        assert_eq!(analog.rssi, None);

        let with_rssi = analog_payload_with_rssi(162, 1250, 812);
        let update = decode_message(MessageKind::Analog, &with_rssi).unwrap();
        let TelemetryUpdate::Analog(analog) = update else {
            panic!("wrong update kind");
        };
        assert_eq!(analog.rssi, Some(812));
    }

    #[test]
    fn home_vector_decodes_distance_and_direction() {
        let update = decode_message(MessageKind::CompGps, &home_payload(1_200, -45)).unwrap();
        let TelemetryUpdate::HomeVector(home) = update else {
            panic!("wrong update kind");
        };
        assert_eq!(home.distance_m, 1_200);
        assert_eq!(home.direction_deg, -45);
    }

    #[test]
    fn every_message_rejects_short_payloads() {
        for (kind, min) in [
            (MessageKind::Attitude, 6),
            (MessageKind::Altitude, 6),
            (MessageKind::RawGps, 18),
            (MessageKind::Analog, 3),
            (MessageKind::CompGps, 4),
        ] {
            for len in 0..min {
                let err = decode_message(kind, &vec![0u8; len]).unwrap_err();
                assert!(
                    matches!(err, TelemetryError::Decode { .. }),
                    "{} at len {len}",
                    kind.name()
                );
            }
            assert!(decode_message(kind, &vec![0u8; min]).is_ok(), "{}", kind.name());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        /// Rebuild the wire payload from a decoded record. Inverse of the
        /// decoder for full-information payloads.
        fn reencode(update: &TelemetryUpdate) -> Vec<u8> {
            match update {
                TelemetryUpdate::Attitude(att) => attitude_payload(
                    (att.roll_deg * 10.0).round() as i16,
                    (att.pitch_deg * 10.0).round() as i16,
                    att.yaw_deg.round() as i16,
                ),
                TelemetryUpdate::Altitude(alt) => altitude_payload(
                    (alt.altitude_m * 100.0).round() as i32,
                    (alt.vertical_speed_ms * 100.0).round() as i16,
                ),
                TelemetryUpdate::Gps(gps) => gps_payload(
                    match gps.fix {
                        GpsFix::None => 0,
                        GpsFix::Fix2d => 1,
                        GpsFix::Fix3d => 2,
                    },
                    gps.satellites,
                    (gps.latitude_deg.unwrap() * 1e7).round() as i32,
                    (gps.longitude_deg.unwrap() * 1e7).round() as i32,
                    0,
                    (gps.ground_speed_ms.unwrap() * 100.0).round() as u16,
                    gps.course.unwrap(),
                ),
                TelemetryUpdate::Analog(analog) => {
                    let vbat = (analog.battery_v * 10.0).round() as u8;
                    let current = (analog.current_a * 100.0).round() as u16;
                    match analog.rssi {
                        Some(rssi) => analog_payload_with_rssi(vbat, current, rssi),
                        None => analog_payload(vbat, current),
                    }
                }
                TelemetryUpdate::HomeVector(home) => {
                    home_payload(home.distance_m, home.direction_deg)
                }
            }
        }

        proptest! {
            #[test]
            fn prop_attitude_roundtrips(
                roll in any::<i16>(),
                pitch in any::<i16>(),
                yaw in any::<i16>(),
            ) {
                let payload = attitude_payload(roll, pitch, yaw);
                let update = decode_message(MessageKind::Attitude, &payload).unwrap();
                prop_assert_eq!(reencode(&update), payload);
            }

            #[test]
            fn prop_altitude_roundtrips(alt in any::<i32>(), vspeed in any::<i16>()) {
                let payload = altitude_payload(alt, vspeed);
                let update = decode_message(MessageKind::Altitude, &payload).unwrap();
                prop_assert_eq!(reencode(&update), payload);
            }

            #[test]
            fn prop_gps_with_3d_fix_roundtrips(
                fix_byte in 2u8..=2,
                satellites in any::<u8>(),
                lat in -900_000_000i32..=900_000_000,
                lon in -1_800_000_000i32..=1_800_000_000,
                speed in any::<u16>(),
                course in any::<u16>(),
            ) {
                // GPS altitude is decoded away, so it is pinned to zero.
                let payload = gps_payload(fix_byte, satellites, lat, lon, 0, speed, course);
                let update = decode_message(MessageKind::RawGps, &payload).unwrap();
                prop_assert_eq!(reencode(&update), payload);
            }

            #[test]
            fn prop_analog_roundtrips(
                vbat in any::<u8>(),
                current in any::<u16>(),
                rssi in proptest::option::of(any::<u16>()),
            ) {
                let payload = match rssi {
                    Some(rssi) => analog_payload_with_rssi(vbat, current, rssi),
                    None => analog_payload(vbat, current),
                };
                let update = decode_message(MessageKind::Analog, &payload).unwrap();
                prop_assert_eq!(reencode(&update), payload);
            }

            #[test]
            fn prop_home_vector_roundtrips(distance in any::<u16>(), direction in any::<i16>()) {
                let payload = home_payload(distance, direction);
                let update = decode_message(MessageKind::CompGps, &payload).unwrap();
                prop_assert_eq!(reencode(&update), payload);
            }

            #[test]
            fn prop_gps_fix_gating(fix_byte in any::<u8>()) {
                let payload = gps_payload(fix_byte, 7, 1, 2, 3, 4, 5);
                let update = decode_message(MessageKind::RawGps, &payload).unwrap();
                let TelemetryUpdate::Gps(gps) = update else {
                    panic!("wrong update kind");
                };
                prop_assert_eq!(gps.satellites, 7);
                prop_assert_eq!(gps.latitude_deg.is_some(), fix_byte >= 2);
                prop_assert_eq!(gps.ground_speed_ms.is_some(), fix_byte >= 2);
                prop_assert_eq!(gps.course.is_some(), fix_byte != 0);
            }
        }
    }
}
