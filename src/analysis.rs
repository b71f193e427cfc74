//! # Tracking Analysis
//!
//! [`TrackingAnalyzer`] is the single surface the service layer calls. It
//! owns an [`AnalysisConfig`] and composes the standalone algorithms:
//!
//! 1. Enforce the batch ceiling and reject non-finite coordinates
//! 2. Validate every point, setting rejected ones aside
//! 3. Sort the accepted points by `recorded_at` (stable)
//! 4. Run statistics, stop detection and simplification on that sequence
//!
//! The three analyses are independent functions of the same sorted sequence.
//! The analyzer holds no state between calls.

use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{AnalysisConfig, SimplificationConfig, StopDetectionConfig};
use crate::error::{ensure_non_negative, ensure_positive, Result, TrajectoryError};
use crate::geodesy::{self, DistanceAndBearing};
use crate::simplify::simplify_with;
use crate::stops::{detect_stops_validated, StopSegment};
use crate::statistics::{aggregate_validated, RouteStatistics};
use crate::validation::{partition_points, validate_point, RejectedPoint, ValidationResult};
use crate::{ensure_finite_coordinates, Bounds, Coordinate, TrackingPoint};

/// A validated point with its derived stop flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedPoint {
    pub point: TrackingPoint,
    /// Position in the caller's batch
    pub source_index: usize,
    /// Derived from the speed, never supplied by the client
    pub is_stop: bool,
    pub warnings: Vec<String>,
}

/// Result of validating and ordering a batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IngestedBatch {
    /// Accepted points, ascending by `recorded_at`
    pub points: Vec<ProcessedPoint>,
    /// Refused points, in batch order
    pub rejected: Vec<RejectedPoint>,
}

impl IngestedBatch {
    /// The accepted points as plain tracking points, in time order.
    pub fn tracking_points(&self) -> Vec<TrackingPoint> {
        self.points.iter().map(|p| p.point.clone()).collect()
    }

    /// Total number of warnings across accepted points.
    pub fn warning_count(&self) -> usize {
        self.points.iter().map(|p| p.warnings.len()).sum()
    }
}

/// Everything the engine derives from one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingAnalysis {
    pub statistics: RouteStatistics,
    /// Indices refer to the accepted, time-sorted points
    pub stops: Vec<StopSegment>,
    /// `None` when simplification is disabled in the config
    pub simplified: Option<Vec<TrackingPoint>>,
    /// `None` when no point was accepted
    pub bounds: Option<Bounds>,
    pub accepted_points: usize,
    pub rejected: Vec<RejectedPoint>,
    pub warning_count: usize,
}

/// Analysis outcome for one trip of a multi-trip call.
///
/// Serializes `result` as `{"Ok": ...}` or `{"Err": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct TripAnalysis {
    pub trip_id: String,
    pub result: Result<TrackingAnalysis>,
}

/// Facade over validation, statistics, stop detection and simplification.
#[derive(Debug, Clone, Default)]
pub struct TrackingAnalyzer {
    config: AnalysisConfig,
}

impl TrackingAnalyzer {
    /// Create an analyzer after checking the configuration.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Quality verdict for a single point. Never fails.
    pub fn validate_point(&self, point: &TrackingPoint) -> ValidationResult {
        validate_point(point, &self.config.validation)
    }

    /// Validate, set aside rejected points, and order the rest by time.
    ///
    /// # Errors
    /// `BatchTooLarge` above `max_batch_size`, `NonFiniteCoordinate` when
    /// any point carries NaN or infinity.
    pub fn ingest(&self, points: &[TrackingPoint]) -> Result<IngestedBatch> {
        if points.len() > self.config.max_batch_size {
            return Err(TrajectoryError::BatchTooLarge {
                point_count: points.len(),
                maximum: self.config.max_batch_size,
            });
        }
        ensure_finite_coordinates(points)?;

        let (mut accepted, rejected) = partition_points(points, &self.config.validation);
        accepted.sort_by_key(|(_, p, _)| p.recorded_at);

        let stop_speed = self.config.stops.stop_speed_kmh;
        let points = accepted
            .into_iter()
            .map(|(source_index, point, result)| ProcessedPoint {
                is_stop: point.is_stop_instant(stop_speed),
                point,
                source_index,
                warnings: result.warnings,
            })
            .collect::<Vec<_>>();

        if !rejected.is_empty() {
            debug!(
                "[TrackingAnalyzer] Ingested {} points, rejected {}",
                points.len(),
                rejected.len()
            );
        }

        Ok(IngestedBatch { points, rejected })
    }

    /// Aggregate statistics over the valid points of a batch.
    pub fn route_statistics(&self, points: &[TrackingPoint]) -> Result<RouteStatistics> {
        let batch = self.ingest(points)?;
        aggregate_validated(&batch.tracking_points(), self.config.stops.stop_speed_kmh)
    }

    /// Stop segments over the valid points of a batch.
    ///
    /// `min_duration_seconds` overrides the configured minimum for this call.
    pub fn detect_stops(
        &self,
        points: &[TrackingPoint],
        min_duration_seconds: Option<f64>,
    ) -> Result<Vec<StopSegment>> {
        let config = self.stop_config(min_duration_seconds)?;
        let batch = self.ingest(points)?;
        detect_stops_validated(&batch.tracking_points(), &config)
    }

    /// Simplified trajectory over the valid points of a batch.
    ///
    /// `tolerance_km` overrides the configured tolerance for this call; the
    /// configured method is kept.
    pub fn simplify_route(
        &self,
        points: &[TrackingPoint],
        tolerance_km: Option<f64>,
    ) -> Result<Vec<TrackingPoint>> {
        let config = self.simplification_config(tolerance_km)?;
        let batch = self.ingest(points)?;
        simplify_with(&batch.tracking_points(), &config)
    }

    /// Distance (km) and initial bearing (degrees) from `a` to `b`.
    pub fn distance_and_bearing(
        &self,
        a: impl Into<Coordinate>,
        b: impl Into<Coordinate>,
    ) -> DistanceAndBearing {
        geodesy::distance_and_bearing(a.into(), b.into())
    }

    /// Whether `point` lies within `radius_km` of `center`.
    ///
    /// # Errors
    /// `InvalidParameter` for a negative or non-finite radius.
    pub fn within_geofence(
        &self,
        point: impl Into<Coordinate>,
        center: impl Into<Coordinate>,
        radius_km: f64,
    ) -> Result<bool> {
        let radius_km = ensure_non_negative("radius_km", radius_km)?;
        Ok(geodesy::within_radius(point.into(), center.into(), radius_km))
    }

    /// Full report for one batch: statistics, stops, simplified track and bounds.
    pub fn analyze(&self, points: &[TrackingPoint]) -> Result<TrackingAnalysis> {
        let batch = self.ingest(points)?;
        let sorted = batch.tracking_points();

        let statistics = aggregate_validated(&sorted, self.config.stops.stop_speed_kmh)?;
        let stops = detect_stops_validated(&sorted, &self.config.stops)?;
        let simplified = if self.config.simplify {
            Some(simplify_with(&sorted, &self.config.simplification)?)
        } else {
            None
        };
        let coords: Vec<Coordinate> = sorted.iter().map(Coordinate::from).collect();

        info!(
            "[TrackingAnalyzer] Analyzed {} points ({} rejected): {} km, {} stops",
            sorted.len(),
            batch.rejected.len(),
            statistics.total_distance_km,
            stops.len()
        );

        Ok(TrackingAnalysis {
            statistics,
            stops,
            simplified,
            bounds: geodesy::compute_bounds(&coords),
            accepted_points: sorted.len(),
            warning_count: batch.warning_count(),
            rejected: batch.rejected,
        })
    }

    /// Analyze several independent trips, one result per trip, in input order.
    ///
    /// A failing trip does not affect the others.
    pub fn analyze_trips(&self, trips: &[(String, Vec<TrackingPoint>)]) -> Vec<TripAnalysis> {
        trips
            .iter()
            .map(|(trip_id, points)| self.analyze_trip(trip_id, points))
            .collect()
    }

    /// Parallel version of [`analyze_trips`](Self::analyze_trips).
    ///
    /// Each trip is still analyzed on a single thread; rayon fans the trips
    /// out across the pool. Output order matches input order.
    #[cfg(feature = "parallel")]
    pub fn analyze_trips_parallel(
        &self,
        trips: &[(String, Vec<TrackingPoint>)],
    ) -> Vec<TripAnalysis> {
        info!(
            "[TrackingAnalyzer] Analyzing {} trips in parallel",
            trips.len()
        );
        trips
            .par_iter()
            .map(|(trip_id, points)| self.analyze_trip(trip_id, points))
            .collect()
    }

    fn analyze_trip(&self, trip_id: &str, points: &[TrackingPoint]) -> TripAnalysis {
        let result = self.analyze(points);
        if let Err(e) = &result {
            debug!("[TrackingAnalyzer] Trip '{}' failed: {}", trip_id, e);
        }
        TripAnalysis {
            trip_id: trip_id.to_string(),
            result,
        }
    }

    fn stop_config(&self, min_duration_seconds: Option<f64>) -> Result<StopDetectionConfig> {
        let mut config = self.config.stops.clone();
        if let Some(min) = min_duration_seconds {
            config.min_duration_seconds = ensure_positive("min_duration_seconds", min)?;
        }
        Ok(config)
    }

    fn simplification_config(&self, tolerance_km: Option<f64>) -> Result<SimplificationConfig> {
        let mut config = self.config.simplification.clone();
        if let Some(tolerance) = tolerance_km {
            config.tolerance_km = ensure_non_negative("tolerance_km", tolerance)?;
        }
        Ok(config)
    }
}
