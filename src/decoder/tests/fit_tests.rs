//! Tests for the FIT frame fold

use crate::decoder::fit::{decode_frames, Frame, FrameKind};
use crate::models::FileFormat;
use chrono::{TimeZone, Utc};

fn record(lat: i32, lon: i32) -> Frame {
    Frame::new(FrameKind::Record)
        .with_number("position_lat", f64::from(lat))
        .with_number("position_long", f64::from(lon))
}

fn lap(distance: f64) -> Frame {
    Frame::new(FrameKind::Lap).with_number("total_distance", distance)
}

#[test]
fn test_points_take_the_ordinal_of_the_closing_lap() {
    let frames = vec![
        record(1, 1),
        record(2, 2),
        lap(100.0),
        record(3, 3),
        lap(200.0),
        record(4, 4),
        record(5, 5),
        lap(300.0),
    ];

    let activity = decode_frames(frames);

    assert_eq!(activity.format, FileFormat::Fit);
    let lap_numbers: Vec<_> = activity.points.iter().map(|p| p.lap_number).collect();
    assert_eq!(
        lap_numbers,
        vec![Some(1), Some(1), Some(2), Some(3), Some(3)]
    );

    let numbers: Vec<_> = activity.laps.iter().map(|l| l.number).collect();
    assert_eq!(numbers, vec![Some(1), Some(2), Some(3)]);
    assert_eq!(activity.laps[1].total_distance, Some(200.0));
}

#[test]
fn test_records_after_last_lap_get_next_number() {
    let activity = decode_frames(vec![record(1, 1), lap(10.0), record(2, 2)]);

    assert_eq!(activity.laps.len(), 1);
    assert_eq!(activity.points[1].lap_number, Some(2));
}

#[test]
fn test_record_without_full_position_is_dropped() {
    let frames = vec![
        record(900_000_000, 0),
        Frame::new(FrameKind::Record).with_number("position_lat", 900_000_000.0),
        Frame::new(FrameKind::Record).with_number("heart_rate", 150.0),
    ];

    let activity = decode_frames(frames);

    assert_eq!(activity.points.len(), 1);
    assert_eq!(activity.dropped_points, 2);
    assert!((activity.points[0].latitude - 75.4371).abs() < 1e-3);
    assert_eq!(activity.points[0].longitude, 0.0);
}

#[test]
fn test_point_fields_and_enhanced_fallback() {
    let ts = Utc.with_ymd_and_hms(2021, 5, 1, 10, 0, 0).unwrap();
    let frame = record(0, 0)
        .with_time("timestamp", ts)
        .with_number("heart_rate", 140.0)
        .with_number("cadence", 85.0)
        .with_number("enhanced_altitude", 120.5)
        .with_number("speed", 3.0)
        .with_number("enhanced_speed", 9.9);

    let point = &decode_frames(vec![frame]).points[0];

    assert_eq!(point.timestamp, Some(ts));
    assert_eq!(point.heart_rate, Some(140.0));
    assert_eq!(point.cadence, Some(85.0));
    assert_eq!(point.altitude, Some(120.5));
    // Primary field wins over the enhanced one
    assert_eq!(point.speed, Some(3.0));
}

#[test]
fn test_lap_fields_are_independently_optional() {
    let start = Utc.with_ymd_and_hms(2021, 5, 1, 10, 0, 0).unwrap();
    let frame = Frame::new(FrameKind::Lap)
        .with_time("start_time", start)
        .with_number("total_elapsed_time", 600.0)
        .with_number("enhanced_max_speed", 5.5)
        .with_number("avg_heart_rate", 132.0);

    let lap = &decode_frames(vec![frame]).laps[0];

    assert_eq!(lap.number, Some(1));
    assert_eq!(lap.start_time, Some(start));
    assert_eq!(lap.total_distance, None);
    assert_eq!(lap.total_elapsed_time, Some(600.0));
    assert_eq!(lap.max_speed, Some(5.5));
    assert_eq!(lap.max_heart_rate, None);
    assert_eq!(lap.avg_heart_rate, Some(132.0));
}

#[test]
fn test_other_frames_are_ignored() {
    let frames = vec![
        Frame::new(FrameKind::Other).with_number("position_lat", 1.0),
        record(1, 1),
        Frame::new(FrameKind::Other),
    ];

    let activity = decode_frames(frames);
    assert_eq!(activity.points.len(), 1);
    assert_eq!(activity.dropped_points, 0);
    assert!(activity.laps.is_empty());
}

#[test]
fn test_empty_stream() {
    let activity = decode_frames(Vec::<Frame>::new());
    assert!(activity.laps.is_empty());
    assert!(activity.points.is_empty());
}

#[test]
fn test_time_field_is_not_a_number() {
    let ts = Utc.with_ymd_and_hms(2021, 5, 1, 10, 0, 0).unwrap();
    let frame = Frame::new(FrameKind::Lap).with_time("start_time", ts);

    assert_eq!(frame.number("start_time"), None);
    assert_eq!(frame.time("start_time"), Some(ts));
}
