//! Per-point quality checks.
//!
//! Validation never fails: every point gets a [`ValidationResult`]. Issues
//! make a point unusable; warnings are informational and never affect
//! validity.

use std::borrow::Cow;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ValidationThresholds;
use crate::TrackingPoint;

pub const ISSUE_COORDINATES_OUT_OF_RANGE: &str = "coordinates out of range";
pub const ISSUE_UNREALISTIC_SPEED: &str = "unrealistic speed";
pub const ISSUE_ACCURACY_BEYOND_THRESHOLD: &str = "accuracy beyond acceptable threshold";
pub const ISSUE_INVALID_ACCURACY: &str = "invalid accuracy";
pub const WARNING_SPEED_ABOVE_REALISTIC: &str = "speed above realistic ceiling";
pub const WARNING_ACCURACY_BELOW_GOOD: &str = "accuracy below good precision";

/// Verdict for a single point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Hard failures
    pub issues: Vec<String>,
    /// Soft flags
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_findings(issues: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
            warnings,
        }
    }
}

/// A point the validator refused, with its position in the caller's batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedPoint {
    pub index: usize,
    pub point: TrackingPoint,
    pub issues: Vec<String>,
}

/// Check one point against the thresholds.
pub fn validate_point(
    point: &TrackingPoint,
    thresholds: &ValidationThresholds,
) -> ValidationResult {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if !point.coordinate().is_in_range() {
        issues.push(ISSUE_COORDINATES_OUT_OF_RANGE.to_string());
    }

    if let Some(speed) = point.speed_kmh {
        if !(0.0..=thresholds.max_speed_kmh).contains(&speed) {
            issues.push(ISSUE_UNREALISTIC_SPEED.to_string());
        } else if speed > thresholds.realistic_speed_kmh {
            warnings.push(WARNING_SPEED_ABOVE_REALISTIC.to_string());
        }
    }

    if let Some(accuracy) = point.accuracy_meters {
        if !accuracy.is_finite() || accuracy < 0.0 {
            issues.push(ISSUE_INVALID_ACCURACY.to_string());
        } else if accuracy > thresholds.acceptable_accuracy_meters {
            issues.push(ISSUE_ACCURACY_BEYOND_THRESHOLD.to_string());
        } else if accuracy > thresholds.good_accuracy_meters {
            warnings.push(WARNING_ACCURACY_BELOW_GOOD.to_string());
        }
    }

    ValidationResult::from_findings(issues, warnings)
}

/// Split a batch into accepted points (with their verdicts and original
/// indices) and rejected points. Input order is preserved in both halves.
pub fn partition_points(
    points: &[TrackingPoint],
    thresholds: &ValidationThresholds,
) -> (Vec<(usize, TrackingPoint, ValidationResult)>, Vec<RejectedPoint>) {
    let mut accepted = Vec::with_capacity(points.len());
    let mut rejected = Vec::new();

    for (index, point) in points.iter().enumerate() {
        let result = validate_point(point, thresholds);
        if result.is_valid {
            accepted.push((index, point.clone(), result));
        } else {
            debug!(
                "[PointValidator] Rejected point {} at {}: {}",
                index,
                point.recorded_at,
                result.issues.join(", ")
            );
            rejected.push(RejectedPoint {
                index,
                point: point.clone(),
                issues: result.issues,
            });
        }
    }

    (accepted, rejected)
}

/// Keep only the points that pass [`validate_point`], in input order.
///
/// Borrows the input when nothing is dropped.
pub(crate) fn retain_valid<'a>(
    points: &'a [TrackingPoint],
    thresholds: &ValidationThresholds,
) -> Cow<'a, [TrackingPoint]> {
    if points.iter().all(|p| validate_point(p, thresholds).is_valid) {
        return Cow::Borrowed(points);
    }

    let kept: Vec<TrackingPoint> = points
        .iter()
        .filter(|p| validate_point(p, thresholds).is_valid)
        .cloned()
        .collect();
    debug!(
        "[PointValidator] Dropped {} of {} points failing validation",
        points.len() - kept.len(),
        points.len()
    );
    Cow::Owned(kept)
}
