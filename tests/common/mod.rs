//! Shared fixtures for the integration tests.
//!
//! Tracks are laid out along the equator so that one degree of longitude is
//! a fixed ~111.195 km and expected distances are easy to derive.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use trajectory_engine::TrackingPoint;

/// Longitude step covering ~1 km at the equator.
pub const ONE_KM_DEG: f64 = 0.008993;

/// Longitude step covered in 10 s at 60 km/h.
pub const TEN_SECONDS_AT_60_DEG: f64 = 0.0015;

/// Route logs on for `cargo test -- --nocapture` with `RUST_LOG=debug`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
}

pub fn sample(lon: f64, seconds: i64, speed: f64) -> TrackingPoint {
    TrackingPoint::new(0.0, lon, at(seconds)).with_speed(speed)
}

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// A delivery trip: drive, park at a drop-off, drive on.
///
/// - indices 0..=9: driving east at 60 km/h, one fix every 10 s (t = 0..90)
/// - indices 10..=14: parked at the last driving position, one fix a minute
///   (t = 150..390)
/// - indices 15..=24: driving east again (t = 400..490)
///
/// Totals: 19 legs of 0.0015 deg, 300 s stopped, 190 s moving.
pub fn delivery_trip() -> Vec<TrackingPoint> {
    let mut points: Vec<TrackingPoint> = (0..10)
        .map(|i| sample(i as f64 * TEN_SECONDS_AT_60_DEG, i * 10, 60.0))
        .collect();

    let parked_lon = 9.0 * TEN_SECONDS_AT_60_DEG;
    points.extend((0..5).map(|i| sample(parked_lon, 150 + i * 60, 0.0)));

    points.extend((0..10).map(|i| {
        sample(
            parked_lon + (i + 1) as f64 * TEN_SECONDS_AT_60_DEG,
            400 + i * 10,
            60.0,
        )
    }));

    points
}

/// The same trip in a scrambled but deterministic order.
pub fn shuffled_delivery_trip() -> Vec<TrackingPoint> {
    let trip = delivery_trip();
    let n = trip.len();
    // 7 is coprime with 25, so this visits every index once.
    (0..n).map(|i| trip[(i * 7) % n].clone()).collect()
}

pub fn load_fixture(name: &str) -> Vec<TrackingPoint> {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let content = std::fs::read_to_string(&path).expect("Failed to load fixture");
    serde_json::from_str(&content).expect("Failed to parse fixture")
}
