//! Aggregate route statistics.
//!
//! One left-to-right pass over the time-sorted track. Every consecutive pair
//! contributes its distance, and its time gap is booked as stopped or moving
//! depending on the speed of the later point. Values are accumulated at full
//! precision and rounded once, when the [`RouteStatistics`] is built.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ValidationThresholds;
use crate::error::{ensure_positive, Result};
use crate::geodesy::{haversine_km, round_to};
use crate::validation::retain_valid;
use crate::{ensure_finite_coordinates, sorted_by_time, TrackingPoint};

/// Aggregate distance, time, speed and stop metrics for one track.
///
/// Distances and speeds carry 2 decimals, durations are whole seconds.
/// The [`Default`] value (all zeros) is what tracks with fewer than two points
/// produce.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteStatistics {
    pub total_distance_km: f64,
    /// Time between the first and the last point
    pub total_time_seconds: f64,
    /// Distance over moving time, in km/h
    pub average_speed_kmh: f64,
    /// Highest reported speed, in km/h
    pub max_speed_kmh: f64,
    /// Number of transitions into a stop
    pub total_stops: u32,
    pub total_stop_time_seconds: f64,
    pub moving_time_seconds: f64,
    pub idle_time_seconds: f64,
}

/// Running totals, kept unrounded until the end of the pass.
#[derive(Debug, Default)]
struct Accumulator {
    distance_km: f64,
    max_speed_kmh: f64,
    stops: u32,
    stop_seconds: f64,
    moving_seconds: f64,
}

/// Compute route statistics for a track.
///
/// Points that fail [`validate_point`](crate::validate_point) under the
/// default [`ValidationThresholds`] are dropped first, so out-of-range
/// coordinates and impossible speeds never reach the totals. The rest are
/// ordered by `recorded_at` before the pass, so the caller's order does not
/// matter. A pair whose later point has a known speed below
/// `stop_speed_kmh` counts as stopped time; a stop is counted once when the
/// track enters it, not once per stopped point.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use trajectory_engine::{compute_route_statistics, TrackingPoint};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
/// let track = vec![
///     TrackingPoint::new(0.0, 0.0, t0).with_speed(30.0),
///     TrackingPoint::new(0.0, 0.0, t0 + Duration::seconds(150)).with_speed(0.0),
///     TrackingPoint::new(0.0, 0.008993, t0 + Duration::seconds(210)).with_speed(60.0),
/// ];
///
/// let stats = compute_route_statistics(&track, 5.0).unwrap();
/// assert_eq!(stats.total_stops, 1);
/// assert_eq!(stats.total_stop_time_seconds, 150.0);
/// assert_eq!(stats.moving_time_seconds, 60.0);
/// ```
///
/// # Errors
/// `InvalidParameter` for a non-positive `stop_speed_kmh`,
/// `NonFiniteCoordinate` for NaN/infinite points.
pub fn compute_route_statistics(
    points: &[TrackingPoint],
    stop_speed_kmh: f64,
) -> Result<RouteStatistics> {
    ensure_positive("stop_speed_kmh", stop_speed_kmh)?;
    ensure_finite_coordinates(points)?;
    let valid = retain_valid(points, &ValidationThresholds::default());
    aggregate_validated(&valid, stop_speed_kmh)
}

/// The aggregation pass itself. `points` must already have passed the
/// validator; the analyzer calls this with its own thresholds applied.
pub(crate) fn aggregate_validated(
    points: &[TrackingPoint],
    stop_speed_kmh: f64,
) -> Result<RouteStatistics> {
    let stop_speed_kmh = ensure_positive("stop_speed_kmh", stop_speed_kmh)?;

    if points.len() < 2 {
        return Ok(RouteStatistics::default());
    }

    let points = sorted_by_time(points);
    let mut acc = Accumulator {
        max_speed_kmh: points[0].speed_kmh.unwrap_or(0.0).max(0.0),
        ..Default::default()
    };
    // The first point is never classified, so a track that starts stopped
    // still registers its first stop.
    let mut previous_was_stop = false;

    for pair in points.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        acc.distance_km += haversine_km(prev.coordinate(), curr.coordinate());
        let dt = curr.seconds_since(prev);

        if let Some(speed) = curr.speed_kmh {
            acc.max_speed_kmh = acc.max_speed_kmh.max(speed);
        }

        let is_stop = curr.is_stop_instant(stop_speed_kmh);
        if is_stop {
            acc.stop_seconds += dt;
            if !previous_was_stop {
                acc.stops += 1;
            }
        } else {
            acc.moving_seconds += dt;
        }
        previous_was_stop = is_stop;
    }

    let total_seconds = points[points.len() - 1].seconds_since(&points[0]);
    let average_speed_kmh = if acc.moving_seconds > 0.0 {
        (acc.distance_km / acc.moving_seconds) * 3600.0
    } else {
        0.0
    };

    debug!(
        "[RouteStatistics] {} points, {:.3} km, {} stops",
        points.len(),
        acc.distance_km,
        acc.stops
    );

    Ok(RouteStatistics {
        total_distance_km: round_to(acc.distance_km, 2),
        total_time_seconds: total_seconds.round(),
        average_speed_kmh: round_to(average_speed_kmh, 2),
        max_speed_kmh: round_to(acc.max_speed_kmh, 2),
        total_stops: acc.stops,
        total_stop_time_seconds: acc.stop_seconds.round(),
        moving_time_seconds: acc.moving_seconds.round(),
        idle_time_seconds: acc.stop_seconds.round(),
    })
}
