//! Irregular-to-regular interpolation (§C3) and regular-grid bilinear
//! sampling (§C4) for the sky projection pipeline.
//!
//! The two halves of this crate are used back to back by a projection
//! service: [`delaunay::AngularInterpolant`] turns a scattered set of
//! per-pixel calibration samples into a continuous function from angular
//! coordinates to fractional raw-pixel coordinates, and
//! [`bilinear::sample`] then reads the raw image at those fractional
//! coordinates.

#![deny(rust_2018_idioms)]

pub mod bilinear;
pub mod delaunay;

use thiserror::Error;

/// Errors raised while building or evaluating the irregular-to-regular
/// interpolant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    /// Fewer than three non-collinear sample points remained after masking;
    /// a triangulation cannot be built from them.
    #[error("fewer than three non-collinear points available for triangulation")]
    InsufficientPoints,
    /// The sample-point and sample-value slices passed to
    /// [`delaunay::AngularInterpolant::build`] had different lengths.
    #[error("mismatched point/value counts: {points} vs {values}")]
    ShapeMismatch { points: usize, values: usize },
}

pub type Result<T> = std::result::Result<T, InterpError>;
