//! Stop-segment detection.
//!
//! The detector walks a time-ordered track as a two-state machine. A point
//! with a known speed below the stop threshold puts the vehicle in a stop;
//! any other point (fast, or with no speed at all) puts it back in motion and
//! closes the current run. A closed run becomes a [`StopSegment`] only if it
//! lasted at least the minimum duration, otherwise it was a traffic light or
//! a queue and is dropped.

use core::fmt;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{StopDetectionConfig, ValidationThresholds};
use crate::error::{ensure_positive, Result};
use crate::validation::retain_valid;
use crate::{ensure_finite_coordinates, sorted_by_time, Coordinate, TrackingPoint};

/// A contiguous low-speed run lasting at least the minimum stop duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSegment {
    /// Index of the first point of the run in the time-sorted sequence
    pub start_index: usize,
    /// Index of the last point of the run (inclusive)
    pub end_index: usize,
    /// Time between the first and last point of the run
    pub duration_seconds: f64,
    /// Arithmetic mean of the run's coordinates (not a geodesic centroid)
    pub centroid: Coordinate,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl StopSegment {
    /// Number of points in the run.
    pub fn point_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }
}

/// Detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MotionState {
    Moving,
    /// A stop run opened at this index of the sorted sequence.
    InStop { start: usize },
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionState::Moving => write!(f, "Moving"),
            MotionState::InStop { start } => write!(f, "InStop(from {})", start),
        }
    }
}

/// Detect stop segments in a track.
///
/// Points that fail [`validate_point`](crate::validate_point) under the
/// default [`ValidationThresholds`] are dropped first; a negative or
/// implausible speed never opens a stop. The remaining points are sorted by
/// `recorded_at` (a stable sort on a copy, skipped when already ordered) and
/// the indices in the returned segments refer to that filtered, sorted
/// order. Fewer than 2 usable points yield no segments.
///
/// # Errors
/// `InvalidParameter` when `min_duration_seconds` or `stop_speed_kmh` is not
/// a positive finite number, `NonFiniteCoordinate` for NaN/infinite points.
pub fn detect_stops(
    points: &[TrackingPoint],
    config: &StopDetectionConfig,
) -> Result<Vec<StopSegment>> {
    ensure_positive("min_duration_seconds", config.min_duration_seconds)?;
    ensure_positive("stop_speed_kmh", config.stop_speed_kmh)?;
    ensure_finite_coordinates(points)?;
    let valid = retain_valid(points, &ValidationThresholds::default());
    detect_stops_validated(&valid, config)
}

/// The state machine itself. `points` must already have passed the
/// validator; the analyzer calls this with its own thresholds applied.
pub(crate) fn detect_stops_validated(
    points: &[TrackingPoint],
    config: &StopDetectionConfig,
) -> Result<Vec<StopSegment>> {
    let min_duration = ensure_positive("min_duration_seconds", config.min_duration_seconds)?;
    let stop_speed = ensure_positive("stop_speed_kmh", config.stop_speed_kmh)?;

    if points.len() < 2 {
        return Ok(Vec::new());
    }

    let points = sorted_by_time(points);
    let mut stops = Vec::new();
    let mut state = MotionState::Moving;

    for (idx, point) in points.iter().enumerate() {
        state = match (state, point.is_stop_instant(stop_speed)) {
            (MotionState::Moving, true) => MotionState::InStop { start: idx },
            (MotionState::InStop { start }, true) => MotionState::InStop { start },
            (MotionState::InStop { start }, false) => {
                stops.extend(close_run(&points, start, idx - 1, min_duration));
                MotionState::Moving
            }
            (MotionState::Moving, false) => MotionState::Moving,
        };
    }

    // The track may end mid-stop; that run is judged the same way.
    if let MotionState::InStop { start } = state {
        stops.extend(close_run(&points, start, points.len() - 1, min_duration));
    }

    debug!(
        "[StopDetector] {} points ended {}, {} stops",
        points.len(),
        state,
        stops.len()
    );

    Ok(stops)
}

/// Turn the run `points[start..=end]` into a segment if it lasted long enough.
fn close_run(
    points: &[TrackingPoint],
    start: usize,
    end: usize,
    min_duration: f64,
) -> Option<StopSegment> {
    let run = &points[start..=end];
    let duration_seconds = run[run.len() - 1].seconds_since(&run[0]);

    if duration_seconds < min_duration {
        debug!(
            "[StopDetector] Discarded run {}..={} lasting {:.0}s (minimum {:.0}s)",
            start, end, duration_seconds, min_duration
        );
        return None;
    }

    Some(StopSegment {
        start_index: start,
        end_index: end,
        duration_seconds,
        centroid: mean_coordinate(run),
        started_at: run[0].recorded_at,
        ended_at: run[run.len() - 1].recorded_at,
    })
}

/// Arithmetic mean of latitude and longitude. `run` is never empty.
fn mean_coordinate(run: &[TrackingPoint]) -> Coordinate {
    let (lat_sum, lon_sum) = run
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
    let n = run.len() as f64;
    Coordinate::new(lat_sum / n, lon_sum / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TrajectoryError;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn sample(lat: f64, lon: f64, seconds: i64, speed: Option<f64>) -> TrackingPoint {
        let p = TrackingPoint::new(lat, lon, at(seconds));
        match speed {
            Some(s) => p.with_speed(s),
            None => p,
        }
    }

    #[test]
    fn test_single_stop_with_centroid() {
        let points = vec![
            sample(-23.5500, -46.6300, 0, Some(0.0)),
            sample(-23.5502, -46.6302, 45, Some(0.0)),
            sample(-23.5504, -46.6304, 90, Some(0.0)),
            sample(-23.5506, -46.6306, 135, Some(0.0)),
            sample(-23.5508, -46.6308, 180, Some(0.0)),
            sample(-23.5600, -46.6400, 240, Some(30.0)),
        ];

        let stops = detect_stops(&points, &StopDetectionConfig::default()).unwrap();
        assert_eq!(stops.len(), 1);
        let stop = &stops[0];
        assert_eq!(stop.start_index, 0);
        assert_eq!(stop.end_index, 4);
        assert_eq!(stop.point_count(), 5);
        assert_eq!(stop.duration_seconds, 180.0);
        assert!((stop.centroid.latitude - -23.5504).abs() < 1e-9);
        assert!((stop.centroid.longitude - -46.6304).abs() < 1e-9);
        assert_eq!(stop.started_at, at(0));
        assert_eq!(stop.ended_at, at(180));
    }

    #[test]
    fn test_short_run_is_discarded() {
        let points = vec![
            sample(0.0, 0.0, 0, Some(40.0)),
            sample(0.0, 0.0, 30, Some(1.0)),
            sample(0.0, 0.0, 119, Some(2.0)),
            sample(0.0, 0.001, 150, Some(40.0)),
        ];
        assert!(detect_stops(&points, &StopDetectionConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_exact_minimum_duration_counts() {
        let points = vec![
            sample(0.0, 0.0, 0, Some(1.0)),
            sample(0.0, 0.0, 120, Some(1.0)),
        ];
        let stops = detect_stops(&points, &StopDetectionConfig::default()).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].duration_seconds, 120.0);
    }

    #[test]
    fn test_trailing_run_is_evaluated() {
        let points = vec![
            sample(0.0, 0.0, 0, Some(50.0)),
            sample(0.0, 0.001, 60, Some(3.0)),
            sample(0.0, 0.001, 200, Some(0.0)),
        ];
        let stops = detect_stops(&points, &StopDetectionConfig::default()).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!((stops[0].start_index, stops[0].end_index), (1, 2));
        assert_eq!(stops[0].duration_seconds, 140.0);
    }

    #[test]
    fn test_missing_speed_breaks_a_run() {
        let points = vec![
            sample(0.0, 0.0, 0, Some(0.0)),
            sample(0.0, 0.0, 100, Some(0.0)),
            sample(0.0, 0.0, 150, None),
            sample(0.0, 0.0, 200, Some(0.0)),
            sample(0.0, 0.0, 260, Some(0.0)),
        ];
        // 0..100 is too short, the unknown speed splits it from 200..260.
        assert!(detect_stops(&points, &StopDetectionConfig::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_multiple_stops() {
        let mut points = Vec::new();
        for i in 0..4 {
            points.push(sample(1.0, 1.0, i * 60, Some(0.0)));
        }
        points.push(sample(1.01, 1.01, 300, Some(45.0)));
        for i in 0..4 {
            points.push(sample(1.02, 1.02, 400 + i * 60, Some(2.0)));
        }
        let stops = detect_stops(&points, &StopDetectionConfig::default()).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!((stops[0].start_index, stops[0].end_index), (0, 3));
        assert_eq!((stops[1].start_index, stops[1].end_index), (5, 8));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let points = vec![
            sample(0.0, 0.0, 180, Some(0.0)),
            sample(0.0, 0.0, 0, Some(0.0)),
            sample(0.0, 0.01, 240, Some(40.0)),
            sample(0.0, 0.0, 90, Some(0.0)),
        ];
        let stops = detect_stops(&points, &StopDetectionConfig::default()).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!((stops[0].start_index, stops[0].end_index), (0, 2));
        assert_eq!(stops[0].duration_seconds, 180.0);
    }

    #[test]
    fn test_fewer_than_two_points() {
        let config = StopDetectionConfig::default();
        assert!(detect_stops(&[], &config).unwrap().is_empty());
        assert!(detect_stops(&[sample(0.0, 0.0, 0, Some(0.0))], &config)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let config = StopDetectionConfig {
            min_duration_seconds: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            detect_stops(&[], &config),
            Err(TrajectoryError::InvalidParameter {
                name: "min_duration_seconds",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let points = vec![
            sample(0.0, 0.0, 0, Some(0.0)),
            sample(f64::NAN, 0.0, 10, Some(0.0)),
        ];
        assert!(matches!(
            detect_stops(&points, &StopDetectionConfig::default()),
            Err(TrajectoryError::NonFiniteCoordinate { index: 1, .. })
        ));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(MotionState::Moving.to_string(), "Moving");
        assert_eq!(MotionState::InStop { start: 3 }.to_string(), "InStop(from 3)");
    }

    #[test]
    fn test_points_failing_validation_never_open_a_stop() {
        let points = vec![
            sample(95.0, 0.0, 0, Some(900.0)),
            sample(0.0, 0.0, 100, Some(-40.0)),
            sample(0.0, 0.0, 300, Some(-10.0)),
        ];
        assert!(detect_stops(&points, &StopDetectionConfig::default())
            .unwrap()
            .is_empty());

        // Indices skip the dropped point.
        let points = vec![
            sample(0.0, 0.0, 0, Some(40.0)),
            sample(0.0, 0.0, 10, Some(-5.0)),
            sample(0.0, 0.0, 20, Some(0.0)),
            sample(0.0, 0.0, 200, Some(0.0)),
            sample(0.0, 0.01, 260, Some(40.0)),
        ];
        let stops = detect_stops(&points, &StopDetectionConfig::default()).unwrap();
        assert_eq!(stops.len(), 1);
        assert_eq!((stops[0].start_index, stops[0].end_index), (1, 2));
        assert_eq!(stops[0].duration_seconds, 180.0);
    }
}
