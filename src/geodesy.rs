//! # Geodesy
//!
//! Great-circle math over WGS84 latitude/longitude pairs.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance_km`] | Haversine distance, rounded to 2 decimals |
//! | [`haversine_km`] | Haversine distance, unrounded (for accumulation) |
//! | [`bearing_degrees`] | Initial bearing in `[0, 360)` |
//! | [`midpoint`] | Great-circle midpoint |
//! | [`within_radius`] | Geofence containment test |
//! | [`average_speed_kmh`] | Speed from distance and elapsed seconds |
//! | [`polyline_length_km`] | Length of a track |
//! | [`compute_bounds`] | Bounding box of a track |
//!
//! ## Algorithm Notes
//!
//! The Earth is treated as a sphere of radius 6371 km. Over the distances a
//! delivery vehicle covers between two fixes the error against the WGS84
//! ellipsoid is far below GPS noise.
//!
//! Public results are rounded for presentation. Anything that sums many
//! segments must use [`haversine_km`] and round once at the end.
//!
//! ```rust
//! use trajectory_engine::{geodesy, Coordinate};
//!
//! let a = Coordinate::new(0.0, 0.0);
//! let b = Coordinate::new(0.0, 0.008993);
//! assert_eq!(geodesy::distance_km(a, b), 1.0);
//! assert_eq!(geodesy::bearing_degrees(a, b), 90.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::{Bounds, Coordinate};

/// Mean Earth radius used by every computation in this crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance and initial bearing between two points, computed together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceAndBearing {
    pub distance_km: f64,
    pub bearing_degrees: f64,
}

/// Round half away from zero to `decimals` places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Great-circle distance in kilometres, unrounded.
#[inline]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp: rounding can push h a hair above 1 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Great-circle distance in kilometres, rounded to 2 decimals.
///
/// Symmetric, and zero for identical points.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    round_to(haversine_km(a, b), 2)
}

/// Initial compass bearing from `a` to `b` in degrees, rounded to 2 decimals.
///
/// Always in `[0, 360)`. A bearing that rounds up to 360.00 is reported as 0.
/// Identical points give 0.
pub fn bearing_degrees(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let theta = y.atan2(x).to_degrees();

    let rounded = round_to((theta + 360.0) % 360.0, 2);
    if rounded >= 360.0 {
        0.0
    } else {
        rounded
    }
}

/// Midpoint of the great-circle arc between `a` and `b`.
///
/// This is not the arithmetic mean of the coordinates: on long east-west
/// legs the midpoint bulges towards the pole.
pub fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let bx = lat2.cos() * d_lon.cos();
    let by = lat2.cos() * d_lon.sin();

    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by.powi(2)).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);

    // Normalize longitude back into [-180, 180].
    let lon_deg = (lon.to_degrees() + 540.0) % 360.0 - 180.0;
    Coordinate::new(lat.to_degrees(), lon_deg)
}

/// Whether `point` lies within `radius_km` of `center` (inclusive).
///
/// Uses the rounded [`distance_km`], so a point 10.004 km away is inside a
/// 10 km fence.
pub fn within_radius(point: Coordinate, center: Coordinate, radius_km: f64) -> bool {
    distance_km(point, center) <= radius_km
}

/// Average speed in km/h over `distance_km` covered in `seconds`.
///
/// Zero or negative durations give 0 instead of infinity.
pub fn average_speed_kmh(distance_km: f64, seconds: f64) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }
    round_to((distance_km / seconds) * 3600.0, 2)
}

/// Distance and bearing from `a` to `b`.
pub fn distance_and_bearing(a: Coordinate, b: Coordinate) -> DistanceAndBearing {
    DistanceAndBearing {
        distance_km: distance_km(a, b),
        bearing_degrees: bearing_degrees(a, b),
    }
}

/// Total length of a track in kilometres, unrounded.
///
/// Empty and single-point tracks have length 0.
pub fn polyline_length_km(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_km(w[0], w[1]))
        .sum()
}

/// Bounding box of a track, `None` when empty.
pub fn compute_bounds(points: &[Coordinate]) -> Option<Bounds> {
    let first = points.first()?;
    let init = Bounds {
        min_lat: first.latitude,
        max_lat: first.latitude,
        min_lng: first.longitude,
        max_lng: first.longitude,
    };

    Some(points.iter().skip(1).fold(init, |b, p| Bounds {
        min_lat: b.min_lat.min(p.latitude),
        max_lat: b.max_lat.max(p.latitude),
        min_lng: b.min_lng.min(p.longitude),
        max_lng: b.max_lng.max(p.longitude),
    }))
}

/// Convert kilometres to approximate degrees of latitude.
///
/// Used to hand a metric tolerance to planar algorithms working in degrees.
pub fn km_to_degrees(km: f64) -> f64 {
    km / (EARTH_RADIUS_KM.to_radians())
}
