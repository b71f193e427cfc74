//! # Trajectory Engine
//!
//! Trajectory analysis for fleet-delivery GPS telemetry.
//!
//! This library provides:
//! - Point-quality validation (coordinate bounds, speed plausibility, accuracy)
//! - Great-circle distance, bearing and midpoint computation
//! - Stop-segment detection over time-ordered tracks
//! - Aggregate route statistics (distance, moving/idle time, speeds, stops)
//! - Point-count simplification for storage
//!
//! Everything is a pure, synchronous function of an in-memory point batch.
//! Persistence, HTTP and authorization belong to the calling application.
//!
//! ## Features
//!
//! - **`parallel`** - Analyze independent trips in parallel with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use trajectory_engine::{TrackingAnalyzer, TrackingPoint};
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
//! let points = vec![
//!     TrackingPoint::new(0.0, 0.0, start).with_speed(40.0),
//!     TrackingPoint::new(0.0, 0.008993, start + chrono::Duration::seconds(60)).with_speed(40.0),
//! ];
//!
//! let analyzer = TrackingAnalyzer::default();
//! let stats = analyzer.route_statistics(&points).unwrap();
//! assert_eq!(stats.total_distance_km, 1.0);
//! assert_eq!(stats.average_speed_kmh, 60.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrajectoryError};

// Thresholds and defaults
pub mod config;
pub use config::{
    AnalysisConfig, SimplificationConfig, SimplificationMethod, StopDetectionConfig,
    ValidationThresholds,
};

// Geographic utilities (distance, bearing, midpoint, bounds)
pub mod geodesy;
pub use geodesy::DistanceAndBearing;

// Per-point quality checks
pub mod validation;
pub use validation::{validate_point, RejectedPoint, ValidationResult};

// Stop-segment detection
pub mod stops;
pub use stops::{detect_stops, StopSegment};

// Aggregate route statistics
pub mod statistics;
pub use statistics::{compute_route_statistics, RouteStatistics};

// Point-count reduction
pub mod simplify;
pub use simplify::{simplify_douglas_peucker, simplify_route};

// Orchestration surface consumed by the service layer
pub mod analysis;
pub use analysis::{
    IngestedBatch, ProcessedPoint, TrackingAnalysis, TrackingAnalyzer, TripAnalysis,
};

// Algorithm toolbox - flat access to the standalone algorithms
pub mod algorithms;

// ============================================================================
// Core Types
// ============================================================================

/// A WGS84 coordinate in degrees.
///
/// # Example
/// ```
/// use trajectory_engine::Coordinate;
/// let depot = Coordinate::new(-23.5505, -46.6333); // São Paulo
/// assert!(depot.is_in_range());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    /// NaN fails every comparison, so non-finite coordinates are out of range.
    pub fn is_in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

// n.b. x=lon, y=lat for everything handed to the geo crate.
impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.longitude, c.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(p: geo::Point<f64>) -> Self {
        Coordinate::new(p.y(), p.x())
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

/// A single timestamped vehicle-position sample.
///
/// Points are plain values supplied by the caller. They become usable by the
/// stop detector and the statistics aggregator only after passing
/// [`validate_point`]. Whether a point is a "stop" is always derived from its
/// speed, see [`TrackingPoint::is_stop_instant`].
///
/// # Example
/// ```
/// use chrono::Utc;
/// use trajectory_engine::TrackingPoint;
///
/// let point = TrackingPoint::new(-23.5505, -46.6333, Utc::now())
///     .with_speed(32.5)
///     .with_accuracy(8.0);
/// assert_eq!(point.speed_kmh, Some(32.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
    /// Instantaneous speed reported by the device, km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    /// Horizontal accuracy reported by the device, metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
}

impl TrackingPoint {
    /// Create a point without speed or accuracy.
    pub fn new(latitude: f64, longitude: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            recorded_at,
            speed_kmh: None,
            accuracy_meters: None,
        }
    }

    /// Attach a reported speed in km/h.
    pub fn with_speed(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = Some(speed_kmh);
        self
    }

    /// Attach a reported horizontal accuracy in metres.
    pub fn with_accuracy(mut self, accuracy_meters: f64) -> Self {
        self.accuracy_meters = Some(accuracy_meters);
        self
    }

    /// The position of this sample.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// True when the speed is known and below `stop_speed_kmh`.
    /// Points without a speed are never stop instants.
    pub fn is_stop_instant(&self, stop_speed_kmh: f64) -> bool {
        self.speed_kmh.is_some_and(|speed| speed < stop_speed_kmh)
    }

    /// Seconds elapsed from `earlier` to this point (negative if `earlier` is later).
    pub fn seconds_since(&self, earlier: &TrackingPoint) -> f64 {
        (self.recorded_at - earlier.recorded_at).num_milliseconds() as f64 / 1000.0
    }
}

impl From<&TrackingPoint> for Coordinate {
    fn from(p: &TrackingPoint) -> Self {
        p.coordinate()
    }
}

/// Bounding box of a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Stable ascending sort by `recorded_at`, borrowing when already ordered.
pub(crate) fn sorted_by_time(
    points: &[TrackingPoint],
) -> std::borrow::Cow<'_, [TrackingPoint]> {
    if points
        .windows(2)
        .all(|w| w[0].recorded_at <= w[1].recorded_at)
    {
        std::borrow::Cow::Borrowed(points)
    } else {
        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| p.recorded_at);
        std::borrow::Cow::Owned(sorted)
    }
}

/// Fail on the first point with a NaN or infinite coordinate.
pub(crate) fn ensure_finite_coordinates(points: &[TrackingPoint]) -> Result<()> {
    match points
        .iter()
        .enumerate()
        .find(|(_, p)| !p.coordinate().is_finite())
    {
        Some((index, p)) => Err(TrajectoryError::NonFiniteCoordinate {
            index,
            latitude: p.latitude,
            longitude: p.longitude,
        }),
        None => Ok(()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn test_coordinate_range() {
        assert!(Coordinate::new(90.0, 180.0).is_in_range());
        assert!(Coordinate::new(-90.0, -180.0).is_in_range());
        assert!(!Coordinate::new(90.0001, 0.0).is_in_range());
        assert!(!Coordinate::new(0.0, 180.5).is_in_range());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_in_range());
    }

    #[test]
    fn test_geo_point_axis_order() {
        let c = Coordinate::new(-23.55, -46.63);
        let p: geo::Point<f64> = c.into();
        assert_eq!(p.x(), -46.63);
        assert_eq!(p.y(), -23.55);
        assert_eq!(Coordinate::from(p), c);
    }

    #[test]
    fn test_is_stop_instant() {
        let p = TrackingPoint::new(0.0, 0.0, at(0));
        assert!(!p.is_stop_instant(5.0));
        assert!(p.clone().with_speed(4.9).is_stop_instant(5.0));
        assert!(!p.with_speed(5.0).is_stop_instant(5.0));
    }

    #[test]
    fn test_seconds_since() {
        let a = TrackingPoint::new(0.0, 0.0, at(0));
        let b = TrackingPoint::new(0.0, 0.0, at(90));
        assert_eq!(b.seconds_since(&a), 90.0);
        assert_eq!(a.seconds_since(&b), -90.0);
    }

    #[test]
    fn test_sorted_by_time_borrows_when_ordered() {
        let ordered = vec![
            TrackingPoint::new(0.0, 0.0, at(0)),
            TrackingPoint::new(0.0, 0.0, at(10)),
        ];
        assert!(matches!(sorted_by_time(&ordered), std::borrow::Cow::Borrowed(_)));

        let shuffled = vec![ordered[1].clone(), ordered[0].clone()];
        let sorted = sorted_by_time(&shuffled);
        assert_eq!(sorted[0].recorded_at, at(0));
        assert_eq!(sorted[1].recorded_at, at(10));
    }

    #[test]
    fn test_ensure_finite_coordinates() {
        let points = vec![
            TrackingPoint::new(0.0, 0.0, at(0)),
            TrackingPoint::new(0.0, f64::INFINITY, at(1)),
        ];
        assert!(matches!(
            ensure_finite_coordinates(&points),
            Err(TrajectoryError::NonFiniteCoordinate { index: 1, .. })
        ));
        assert!(ensure_finite_coordinates(&points[..1]).is_ok());
    }

    #[test]
    fn test_bounds_center() {
        let b = Bounds {
            min_lat: 10.0,
            max_lat: 20.0,
            min_lng: -5.0,
            max_lng: 5.0,
        };
        assert_eq!(b.center(), Coordinate::new(15.0, 0.0));
    }
}
