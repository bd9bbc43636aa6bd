//! Angular (azimuth/zenith) to planar (x/y meters) to grid/pixel transforms
//! (§C2).
//!
//! These are the frozen wire-compatibility formulas from the specification:
//! the `(gx, gy)` orientation fixes azimuth-0 (geodesic north) to `+gy` and
//! azimuth +90° (east) to `+gx`. Do not "simplify" the sign conventions
//! below without checking against archived calibration outputs — that
//! mistake is exactly what the spec's open question on azimuth alignment
//! warns about (see `sky-calibration` for the related legacy-alignment
//! formula used when building an output-cell grid from calibration data).

/// Convert azimuth/zenith (radians) to planar (x, y) meters on the cloud
/// plane at height `cloud_height` (meters).
///
/// `r = cloud_height * tan(zenith)`; `x = r*cos(az)`, `y = r*sin(az)`. NaN
/// inputs propagate to NaN outputs; a zenith of exactly 90° yields an
/// infinite `r` and thus infinite `x`/`y` — callers are expected to filter
/// these (they correspond to the horizon, not a valid grid cell).
pub fn angular_to_planar(azimuth_rad: f64, zenith_rad: f64, cloud_height: f64) -> (f64, f64) {
    let r = cloud_height * zenith_rad.tan();
    (r * azimuth_rad.cos(), r * azimuth_rad.sin())
}

/// Convert planar (x, y) meters back to azimuth/zenith (radians).
pub fn planar_to_angular(x: f64, y: f64, cloud_height: f64) -> (f64, f64) {
    let r = (x * x + y * y).sqrt();
    let az = y.atan2(x);
    let zen = (r / cloud_height).atan();
    (az, zen)
}

/// Convert planar (x, y) meters, relative to the observer, to grid
/// coordinates (meters, still centered on the observer before the
/// pixel-step division).
///
/// `gx = y + half`, `gy = half - x`. This is the contractual orientation:
/// azimuth 0 (north) maps to `+gy`, azimuth 90° (east) maps to `+gx`.
pub fn planar_to_grid(x: f64, y: f64, half: f64) -> (f64, f64) {
    (y + half, half - x)
}

/// Invert [`planar_to_grid`]: `x = half - gy`, `y = gx - half`.
pub fn grid_to_planar(gx: f64, gy: f64, half: f64) -> (f64, f64) {
    (half - gy, gx - half)
}

/// Convert grid meters to pixel units by dividing by `step`.
pub fn grid_to_pixels(gx: f64, gy: f64, step: f64) -> (f64, f64) {
    (gx / step, gy / step)
}

/// Invert [`grid_to_pixels`]: multiply pixel coordinates by `step`.
pub fn pixels_to_grid(px: f64, py: f64, step: f64) -> (f64, f64) {
    (px * step, py * step)
}

/// Compose [`angular_to_planar`], [`planar_to_grid`], and
/// [`grid_to_pixels`] into the full angular-to-pixel transform.
pub fn angular_to_pixels(
    azimuth_rad: f64,
    zenith_rad: f64,
    cloud_height: f64,
    half: f64,
    step: f64,
) -> (f64, f64) {
    let (x, y) = angular_to_planar(azimuth_rad, zenith_rad, cloud_height);
    let (gx, gy) = planar_to_grid(x, y, half);
    grid_to_pixels(gx, gy, step)
}

/// Compose [`pixels_to_grid`], [`grid_to_planar`], and
/// [`planar_to_angular`] into the full pixel-to-angular transform.
pub fn pixels_to_angular(
    px: f64,
    py: f64,
    cloud_height: f64,
    half: f64,
    step: f64,
) -> (f64, f64) {
    let (gx, gy) = pixels_to_grid(px, py, step);
    let (x, y) = grid_to_planar(gx, gy, half);
    planar_to_angular(x, y, cloud_height)
}
