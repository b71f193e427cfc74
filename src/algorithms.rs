//! # Algorithm Toolbox
//!
//! Direct access to the standalone trajectory algorithms, for callers who
//! want one piece without the [`TrackingAnalyzer`](crate::TrackingAnalyzer)
//! facade and its batch handling.
//!
//! ## Core Algorithms
//!
//! - **Point Validation**: coordinate, speed and accuracy checks
//! - **Stop Detection**: two-state machine over time-ordered points
//! - **Route Statistics**: single-pass aggregation
//! - **Simplification**: neighbor-gap filter and Douglas-Peucker
//!
//! ## Geographic Utilities
//!
//! - **Haversine Distance**: great-circle distance in km
//! - **Bearing / Midpoint**: initial bearing and spherical midpoint
//! - **Polyline Length**: total distance along a path
//! - **Bounds Computation**: bounding box for a track
//!
//! # Example
//!
//! ```rust
//! use trajectory_engine::algorithms::{bearing_degrees, distance_km, Coordinate};
//!
//! let sao_paulo = Coordinate::new(-23.5505, -46.6333);
//! let rio = Coordinate::new(-22.9068, -43.1729);
//! let km = distance_km(sao_paulo, rio);
//! assert!((km - 360.75).abs() < 1.0);
//! assert!(bearing_degrees(sao_paulo, rio) < 90.0);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Bounds, Coordinate, TrackingPoint};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geodesy::{
    average_speed_kmh, bearing_degrees, compute_bounds, distance_and_bearing, distance_km,
    haversine_km, km_to_degrees, midpoint, polyline_length_km, within_radius, DistanceAndBearing,
};

// =============================================================================
// Trajectory Algorithms
// =============================================================================

/// Per-point quality verdict against a set of thresholds.
pub use crate::validation::{partition_points, validate_point, ValidationResult};

/// Stop-segment detection.
///
/// A run of points with known speed below the stop threshold becomes a
/// segment when it lasts at least the configured minimum.
pub use crate::stops::{detect_stops, StopSegment};

/// Single-pass route statistics.
pub use crate::statistics::{compute_route_statistics, RouteStatistics};

/// Point-count reduction.
pub use crate::simplify::{simplify_douglas_peucker, simplify_route, simplify_with};

// =============================================================================
// Track Helpers
// =============================================================================

/// Bounding box of a track, `None` when it is empty.
///
/// # Example
/// ```rust
/// use chrono::Utc;
/// use trajectory_engine::algorithms::{track_bounds, TrackingPoint};
///
/// let now = Utc::now();
/// let track = vec![
///     TrackingPoint::new(-23.55, -46.63, now),
///     TrackingPoint::new(-23.50, -46.70, now),
/// ];
/// let bounds = track_bounds(&track).unwrap();
/// assert_eq!(bounds.min_lng, -46.70);
/// ```
pub fn track_bounds(points: &[TrackingPoint]) -> Option<Bounds> {
    let coords: Vec<Coordinate> = points.iter().map(Coordinate::from).collect();
    compute_bounds(&coords)
}

/// Length of a track in km, in the order given, rounded to 2 decimals.
///
/// Unlike [`compute_route_statistics`], the points are not reordered.
pub fn track_length_km(points: &[TrackingPoint]) -> f64 {
    let coords: Vec<Coordinate> = points.iter().map(Coordinate::from).collect();
    crate::geodesy::round_to(polyline_length_km(&coords), 2)
}
