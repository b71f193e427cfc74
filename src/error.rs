//! Unified error handling for the trajectory engine.
//!
//! Data-quality problems (points out of range, empty batches) are never errors:
//! they surface as invalid [`ValidationResult`](crate::ValidationResult)s, zeroed
//! statistics or empty lists. This type is reserved for callers breaking the
//! contract of an operation.

use serde::Serialize;
use thiserror::Error;

/// Unified error type for trajectory-engine operations.
///
/// Serializable so multi-trip results can be rendered with their failures.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum TrajectoryError {
    /// A point carried a NaN or infinite coordinate
    #[error("Point {index} has a non-finite coordinate ({latitude}, {longitude})")]
    NonFiniteCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    /// An operation parameter is outside its domain
    #[error("Invalid value {value} for '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// The batch exceeds the configured ceiling
    #[error("Batch has {point_count} points, maximum {maximum} allowed")]
    BatchTooLarge { point_count: usize, maximum: usize },
    /// Configuration could not be parsed or is inconsistent
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Result type alias for trajectory-engine operations.
pub type Result<T> = std::result::Result<T, TrajectoryError>;

/// Reject a parameter that must be a finite number strictly greater than zero.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TrajectoryError::InvalidParameter {
            name,
            value,
            reason: "must be a finite number greater than zero",
        })
    }
}

/// Reject a parameter that must be a finite number greater than or equal to zero.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TrajectoryError::InvalidParameter {
            name,
            value,
            reason: "must be a finite number of zero or more",
        })
    }
}
