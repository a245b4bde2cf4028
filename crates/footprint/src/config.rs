use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PolygonizeError, Result};

/// Tuning knobs for extraction and merging.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct PolygonizeConfig {
    /// Size in pixels of the structuring element used for the morphological
    /// opening. 0 and 1 leave the mask untouched.
    #[schemars(range(min = 0, max = 255))]
    pub kernel_opening: u32,

    /// Douglas-Peucker tolerance as a fraction of each contour's perimeter.
    #[schemars(range(min = 0.0, max = 1.0))]
    pub simplify_threshold: f64,

    /// Gap in meters bridged when fusing polygons across tile edges.
    pub distance_threshold: f64,

    /// Final simplification tolerance in degrees applied to merged polygons.
    pub output_tolerance: f64,
}

impl Default for PolygonizeConfig {
    fn default() -> Self {
        Self {
            kernel_opening: 1,
            simplify_threshold: 0.01,
            distance_threshold: 0.6,
            output_tolerance: 1e-6,
        }
    }
}

impl PolygonizeConfig {
    /// Reject out-of-range values before any tile is touched.
    pub fn validate(&self) -> Result<()> {
        if self.kernel_opening > u32::from(u8::MAX) {
            return Err(PolygonizeError::InvalidConfiguration(format!(
                "kernel_opening must be at most {}, got {}",
                u8::MAX,
                self.kernel_opening
            )));
        }
        if !(0.0..=1.0).contains(&self.simplify_threshold) {
            return Err(PolygonizeError::InvalidConfiguration(format!(
                "simplify_threshold must lie in [0, 1], got {}",
                self.simplify_threshold
            )));
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(PolygonizeError::InvalidConfiguration(format!(
                "distance_threshold must be a positive distance, got {}",
                self.distance_threshold
            )));
        }
        if !self.output_tolerance.is_finite() || self.output_tolerance < 0.0 {
            return Err(PolygonizeError::InvalidConfiguration(format!(
                "output_tolerance must be non-negative, got {}",
                self.output_tolerance
            )));
        }
        Ok(())
    }

    /// Get the JSON schema for the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(PolygonizeConfig)
    }
}
