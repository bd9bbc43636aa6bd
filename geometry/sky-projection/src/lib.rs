//! Angular/planar camera-plane transforms (§C2), the analytical
//! azimuth/zenith aircraft projector (§C6), and 3D geometry traversal (§C7).
//!
//! This crate composes [`sky_geodesy`]'s WGS84 inverse/direct solvers with a
//! fixed idealized fisheye model to project georeferenced points and
//! geometries into the same pixel grid a calibrated camera image is remapped
//! to (that remapping itself lives in `sky-calibration`, which depends on
//! this crate for the shared `angular` transforms).

#![deny(rust_2018_idioms)]

pub mod aircraft;
pub mod angular;
pub mod geometry;

pub use aircraft::{AircraftProjectionSettings, AircraftProjector};
pub use geometry::Geometry;

use thiserror::Error;

/// Errors raised by the analytical projector and geometry traversal.
#[derive(Error, Debug, PartialEq)]
pub enum ProjectionGeomError {
    /// Input batch arrays to [`aircraft::AircraftProjector`] did not all
    /// have the same shape.
    #[error("mismatched batch shapes: {a} vs {b}")]
    ShapeMismatch { a: usize, b: usize },
    /// A geometry passed to [`geometry::transform_geometry`] lacked the
    /// third (altitude) coordinate every vertex is required to carry.
    #[error("geometry vertices must carry an altitude (third) coordinate")]
    AltitudeMissing,
    /// [`aircraft::AircraftProjectionSettings::new`] was given a value
    /// outside its documented range.
    #[error("{field} = {value} is outside its valid range")]
    InvalidSetting { field: &'static str, value: f64 },
    #[error(transparent)]
    Geodesy(#[from] sky_geodesy::GeodesyError),
}

pub type Result<T> = std::result::Result<T, ProjectionGeomError>;
