//! Calibrated whole-sky image projection.
//!
//! Ties a physical camera's per-pixel azimuth/zenith calibration
//! ([`calibration::CalibrationData`]) together with output-grid settings
//! ([`settings::ProjectionSettings`]) into a lazily-built remapper
//! ([`service::ProjectionService`]) that turns a raw fisheye frame into a
//! regular ground-plane image. Reading calibration files and raw frames off
//! disk is a collaborator's job, not this crate's.

#![deny(rust_2018_idioms)]

pub mod calibration;
pub mod service;
pub mod settings;

pub use calibration::CalibrationData;
pub use service::{ProjectedImage, ProjectionService};
pub use settings::ProjectionSettings;

use thiserror::Error;

/// Settings were constructed with a value outside its documented range.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("{field} = {value} is outside its valid range")]
    InvalidSetting { field: &'static str, value: f64 },
}

/// `CalibrationData` was constructed with inconsistent array shapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("azimuth_map and zenith_map must have equal length: {azimuth} vs {zenith}")]
    MapShapeMismatch { azimuth: usize, zenith: usize },
    #[error("image_size ({rows}, {cols}) does not match map length {len} (expected {expected})")]
    ImageSizeMismatch {
        rows: usize,
        cols: usize,
        len: usize,
        expected: usize,
    },
}

/// Errors raised while building or running a [`service::ProjectionService`].
///
/// Cloneable so [`service::ProjectionService`] can cache a build failure in
/// its `OnceLock` and hand every caller its own copy rather than only the
/// first.
#[derive(Error, Debug, Clone)]
pub enum ProjectionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Calibration(#[from] CalibrationError),
    #[error(transparent)]
    Interp(#[from] sky_interp::InterpError),
    #[error("input image is {actual_rows}x{actual_cols}, calibration expects {expected_rows}x{expected_cols}")]
    ImageShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
