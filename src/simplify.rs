//! Point-count reduction for storage.
//!
//! [`simplify_route`] is a local redundancy filter: an interior point is
//! dropped when its two neighbors are within the tolerance of each other,
//! i.e. the vehicle barely moved across the three-point window. It does not
//! look at how far the point itself deviates from the path, so it is not a
//! shape-preserving simplification. Callers who need one select
//! [`simplify_douglas_peucker`] explicitly.

use std::collections::HashSet;

use geo::{LineString, SimplifyIdx};

use crate::config::{SimplificationConfig, SimplificationMethod};
use crate::error::{ensure_non_negative, Result};
use crate::geodesy::{distance_km, km_to_degrees};
use crate::{ensure_finite_coordinates, TrackingPoint};

/// Default neighbor-gap tolerance, in kilometres.
pub const DEFAULT_TOLERANCE_KM: f64 = 0.0001;

/// Drop interior points whose neighbors are no more than `tolerance_km` apart.
///
/// The first and last points are always kept; tracks of two points or fewer
/// are returned unchanged. Each decision uses the point's original
/// neighbors, not the previously kept point. Neighbor gaps are measured with
/// the rounded [`distance_km`](crate::geodesy::distance_km), so gaps under
/// 5 m read as zero.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use trajectory_engine::{simplify_route, TrackingPoint};
///
/// let now = Utc::now();
/// let parked = vec![
///     TrackingPoint::new(-23.55, -46.63, now),
///     TrackingPoint::new(-23.55, -46.63, now),
///     TrackingPoint::new(-23.55, -46.63, now),
/// ];
/// assert_eq!(simplify_route(&parked, 0.0001).unwrap().len(), 2);
/// ```
///
/// # Errors
/// `InvalidParameter` for a negative or non-finite tolerance,
/// `NonFiniteCoordinate` for NaN/infinite points.
pub fn simplify_route(points: &[TrackingPoint], tolerance_km: f64) -> Result<Vec<TrackingPoint>> {
    let tolerance_km = ensure_non_negative("tolerance_km", tolerance_km)?;
    ensure_finite_coordinates(points)?;

    if points.len() <= 2 {
        return Ok(points.to_vec());
    }

    let mut kept = Vec::with_capacity(points.len());
    kept.push(points[0].clone());
    kept.extend(
        points
            .windows(3)
            .filter(|w| distance_km(w[0].coordinate(), w[2].coordinate()) > tolerance_km)
            .map(|w| w[1].clone()),
    );
    kept.push(points[points.len() - 1].clone());

    Ok(kept)
}

/// Ramer-Douglas-Peucker simplification via the geo crate.
///
/// The tolerance is converted from kilometres to degrees of arc and applied
/// in lat/lon space, which is adequate at city scale but stretches east-west
/// tolerances towards the poles.
pub fn simplify_douglas_peucker(
    points: &[TrackingPoint],
    tolerance_km: f64,
) -> Result<Vec<TrackingPoint>> {
    let tolerance_km = ensure_non_negative("tolerance_km", tolerance_km)?;
    ensure_finite_coordinates(points)?;

    if points.len() <= 2 {
        return Ok(points.to_vec());
    }

    let line: LineString<f64> = points
        .iter()
        .map(|p| geo::Coord::from(p.coordinate()))
        .collect();
    let epsilon = km_to_degrees(tolerance_km);
    let indices_to_keep: HashSet<usize> = line.simplify_idx(&epsilon).into_iter().collect();

    Ok(points
        .iter()
        .enumerate()
        .filter(|(idx, _)| indices_to_keep.contains(idx))
        .map(|(_, p)| p.clone())
        .collect())
}

/// Run the simplification method selected in `config`.
pub fn simplify_with(
    points: &[TrackingPoint],
    config: &SimplificationConfig,
) -> Result<Vec<TrackingPoint>> {
    match config.method {
        SimplificationMethod::NeighborGap => simplify_route(points, config.tolerance_km),
        SimplificationMethod::DouglasPeucker => {
            simplify_douglas_peucker(points, config.tolerance_km)
        }
    }
}
