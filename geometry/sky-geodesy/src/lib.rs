//! Batch WGS84 geodesic primitives.
//!
//! Wraps [`geographiclib_rs`]'s direct and inverse geodesic solvers with the
//! batch-oriented, NaN-tolerant contract the rest of the projection pipeline
//! expects: every row is solved independently, a NaN in either input of a row
//! produces NaN in both outputs of that row, and no row's failure poisons the
//! others.
//!
//! Accuracy matches `geographiclib-rs`'s WGS84 solver (sub-millimeter for
//! distances up to hemispheric scale). Near antipodal point pairs the inverse
//! problem is numerically degenerate; callers are expected to stay within a
//! few hundred kilometers of the observer, as documented by the projection
//! pipeline that uses this crate.

#![deny(rust_2018_idioms)]

use geographiclib_rs::{DirectGeodesic, Geodesic, InverseGeodesic};
use thiserror::Error;

/// Errors raised by the batch geodesic operations.
#[derive(Error, Debug, PartialEq)]
pub enum GeodesyError {
    /// The two (or more) input slices passed to a batch operation did not
    /// have the same length.
    #[error("mismatched batch lengths: {a} vs {b}")]
    ShapeMismatch { a: usize, b: usize },
}

type Result<T> = std::result::Result<T, GeodesyError>;

/// Wrap an azimuth in degrees to the `(-180, 180]` convention used
/// throughout this pipeline.
fn wrap_azimuth_deg(azimuth_deg: f64) -> f64 {
    if azimuth_deg.is_nan() {
        return f64::NAN;
    }
    let wrapped = ((azimuth_deg + 180.0).rem_euclid(360.0)) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Solve the WGS84 inverse geodesic problem for a batch of targets from a
/// single observer.
///
/// Returns `(azimuth1_deg[], s12_m[])`: the initial azimuth at
/// `(lat1, lon1)` toward each `(lat2[i], lon2[i])`, wrapped to
/// `(-180, 180]` degrees, and the geodesic ground distance in meters.
///
/// `lat2` and `lon2` must have equal length. A NaN in either coordinate of a
/// row produces `NaN` in both outputs of that row; other rows are
/// unaffected.
#[tracing::instrument(level = "trace", skip(lat2, lon2), fields(n = lat2.len()))]
pub fn inverse(lat1: f64, lon1: f64, lat2: &[f64], lon2: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if lat2.len() != lon2.len() {
        return Err(GeodesyError::ShapeMismatch {
            a: lat2.len(),
            b: lon2.len(),
        });
    }
    let geod = Geodesic::wgs84();
    let mut azimuth1 = Vec::with_capacity(lat2.len());
    let mut s12 = Vec::with_capacity(lat2.len());
    for (&lat, &lon) in lat2.iter().zip(lon2.iter()) {
        if lat1.is_nan() || lon1.is_nan() || lat.is_nan() || lon.is_nan() {
            azimuth1.push(f64::NAN);
            s12.push(f64::NAN);
            continue;
        }
        let (dist, azi1, _azi2): (f64, f64, f64) = geod.inverse(lat1, lon1, lat, lon);
        azimuth1.push(wrap_azimuth_deg(azi1));
        s12.push(dist);
    }
    Ok((azimuth1, s12))
}

/// Solve the WGS84 direct geodesic problem for a batch of azimuth/distance
/// pairs from a single observer.
///
/// Returns `(lat2[], lon2[])`, the destination coordinates reached by
/// travelling `distance[i]` meters along `azimuth[i]` degrees from
/// `(lat1, lon1)`.
///
/// `azimuth` and `distance` must have equal length. A NaN in either value of
/// a row produces `NaN` in both outputs of that row.
#[tracing::instrument(level = "trace", skip(azimuth, distance), fields(n = azimuth.len()))]
pub fn direct(
    lat1: f64,
    lon1: f64,
    azimuth: &[f64],
    distance: &[f64],
) -> Result<(Vec<f64>, Vec<f64>)> {
    if azimuth.len() != distance.len() {
        return Err(GeodesyError::ShapeMismatch {
            a: azimuth.len(),
            b: distance.len(),
        });
    }
    let geod = Geodesic::wgs84();
    let mut lat2 = Vec::with_capacity(azimuth.len());
    let mut lon2 = Vec::with_capacity(azimuth.len());
    for (&azi, &dist) in azimuth.iter().zip(distance.iter()) {
        if lat1.is_nan() || lon1.is_nan() || azi.is_nan() || dist.is_nan() {
            lat2.push(f64::NAN);
            lon2.push(f64::NAN);
            continue;
        }
        let (lat, lon, _azi2): (f64, f64, f64) = geod.direct(lat1, lon1, azi, dist);
        lat2.push(lat);
        lon2.push(lon);
    }
    Ok((lat2, lon2))
}
