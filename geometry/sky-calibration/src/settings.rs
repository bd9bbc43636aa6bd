//! Validated output-grid settings for the calibrated projection service.

use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Settings controlling the calibrated output grid and the calibration
/// cutoff angle.
///
/// `Deserialize` alone only checks shape (field names, types); semantic
/// bounds are enforced by [`ProjectionSettings::new`], mirroring the split
/// between wire shape and domain validity used elsewhere in this stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionSettings {
    /// Output grid resolution in pixels per side, must be `>= 2`.
    pub resolution: u32,
    /// Physical extent of the output grid in meters, must be `> 0`.
    pub square_size: f64,
    /// Altitude of the projection plane above the observer in meters, must
    /// be `> 0`.
    pub cloud_height: f64,
    /// Calibration entries whose zenith exceeds this angle (degrees, must
    /// be in `(0, 90]`) are excluded from the interpolant.
    pub max_zenith_angle: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            resolution: 1024,
            square_size: 75_000.0,
            cloud_height: 10_000.0,
            max_zenith_angle: 80.0,
        }
    }
}

impl ProjectionSettings {
    pub fn new(
        resolution: u32,
        square_size: f64,
        cloud_height: f64,
        max_zenith_angle: f64,
    ) -> std::result::Result<Self, ConfigurationError> {
        if resolution < 2 {
            return Err(ConfigurationError::InvalidSetting {
                field: "resolution",
                value: resolution as f64,
            });
        }
        if !(square_size > 0.0) {
            return Err(ConfigurationError::InvalidSetting {
                field: "square_size",
                value: square_size,
            });
        }
        if !(cloud_height > 0.0) {
            return Err(ConfigurationError::InvalidSetting {
                field: "cloud_height",
                value: cloud_height,
            });
        }
        if !(max_zenith_angle > 0.0 && max_zenith_angle <= 90.0) {
            return Err(ConfigurationError::InvalidSetting {
                field: "max_zenith_angle",
                value: max_zenith_angle,
            });
        }
        Ok(Self {
            resolution,
            square_size,
            cloud_height,
            max_zenith_angle,
        })
    }

    pub fn half(&self) -> f64 {
        self.square_size / 2.0
    }

    pub fn step(&self) -> f64 {
        self.square_size / (self.resolution as f64 - 1.0)
    }
}
