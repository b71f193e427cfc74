//! Thresholds and defaults for every analysis stage.
//!
//! All structs deserialize with `#[serde(default)]`, so a JSON document only
//! needs to name the values it overrides:
//!
//! ```rust
//! use trajectory_engine::AnalysisConfig;
//!
//! let json = r#"{ "stops": { "min_duration_seconds": 300 } }"#;
//! let config = AnalysisConfig::from_json_str(json).unwrap();
//! assert_eq!(config.stops.min_duration_seconds, 300.0);
//! assert_eq!(config.stops.stop_speed_kmh, 5.0);
//! assert_eq!(config.max_batch_size, 500);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, Result, TrajectoryError};

/// Limits applied by the point validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    /// Speeds above this are physically implausible and rejected.
    /// Default: 300 km/h
    pub max_speed_kmh: f64,

    /// Speeds above this are plausible but unusual for commercial vehicles.
    /// Produces a warning only. Default: 150 km/h
    pub realistic_speed_kmh: f64,

    /// Accuracy worse than this makes the fix unusable.
    /// Default: 50 m
    pub acceptable_accuracy_meters: f64,

    /// Accuracy worse than this (but still acceptable) produces a warning.
    /// Default: 20 m
    pub good_accuracy_meters: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            max_speed_kmh: 300.0,
            realistic_speed_kmh: 150.0,
            acceptable_accuracy_meters: 50.0,
            good_accuracy_meters: 20.0,
        }
    }
}

/// Parameters for the stop detector and the stop counting in route statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopDetectionConfig {
    /// A point with a known speed below this is a stop instant.
    /// Default: 5 km/h
    pub stop_speed_kmh: f64,

    /// Shorter low-speed runs are noise (traffic lights, queues) and are discarded.
    /// Default: 120 seconds (2 minutes)
    pub min_duration_seconds: f64,
}

impl Default for StopDetectionConfig {
    fn default() -> Self {
        Self {
            stop_speed_kmh: 5.0,
            min_duration_seconds: 120.0,
        }
    }
}

/// Which simplification algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplificationMethod {
    /// Drop interior points whose neighbors are closer than the tolerance.
    #[default]
    NeighborGap,
    /// Ramer-Douglas-Peucker over the lat/lon polyline.
    DouglasPeucker,
}

/// Parameters for route simplification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplificationConfig {
    /// Tolerance in kilometres. Default: 0.0001 km
    pub tolerance_km: f64,
    pub method: SimplificationMethod,
}

impl Default for SimplificationConfig {
    fn default() -> Self {
        Self {
            tolerance_km: 0.0001,
            method: SimplificationMethod::NeighborGap,
        }
    }
}

/// Top-level configuration for [`TrackingAnalyzer`](crate::TrackingAnalyzer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub validation: ValidationThresholds,
    pub stops: StopDetectionConfig,
    pub simplification: SimplificationConfig,

    /// Largest batch a single call accepts. Mirrors the page size of the
    /// point-ingestion endpoint. Default: 500
    pub max_batch_size: usize,

    /// Whether [`TrackingAnalyzer::analyze`](crate::TrackingAnalyzer::analyze)
    /// also produces a simplified trajectory. Default: true
    pub simplify: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            validation: ValidationThresholds::default(),
            stops: StopDetectionConfig::default(),
            simplification: SimplificationConfig::default(),
            max_batch_size: 500,
            simplify: true,
        }
    }
}

impl AnalysisConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalysisConfig =
            serde_json::from_str(json).map_err(|e| TrajectoryError::ConfigError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every threshold is usable and the pairs are ordered.
    pub fn validate(&self) -> Result<()> {
        let v = &self.validation;
        ensure_positive("max_speed_kmh", v.max_speed_kmh)?;
        ensure_positive("realistic_speed_kmh", v.realistic_speed_kmh)?;
        ensure_positive("acceptable_accuracy_meters", v.acceptable_accuracy_meters)?;
        ensure_positive("good_accuracy_meters", v.good_accuracy_meters)?;
        if v.realistic_speed_kmh > v.max_speed_kmh {
            return Err(TrajectoryError::ConfigError {
                message: format!(
                    "realistic_speed_kmh ({}) exceeds max_speed_kmh ({})",
                    v.realistic_speed_kmh, v.max_speed_kmh
                ),
            });
        }
        if v.good_accuracy_meters > v.acceptable_accuracy_meters {
            return Err(TrajectoryError::ConfigError {
                message: format!(
                    "good_accuracy_meters ({}) exceeds acceptable_accuracy_meters ({})",
                    v.good_accuracy_meters, v.acceptable_accuracy_meters
                ),
            });
        }

        ensure_positive("stop_speed_kmh", self.stops.stop_speed_kmh)?;
        ensure_positive("min_duration_seconds", self.stops.min_duration_seconds)?;
        ensure_non_negative("tolerance_km", self.simplification.tolerance_km)?;

        if self.max_batch_size == 0 {
            return Err(TrajectoryError::ConfigError {
                message: "max_batch_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
