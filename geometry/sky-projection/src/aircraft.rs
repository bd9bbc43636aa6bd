//! Analytical WGS84 projection of aircraft positions and geometries (§C6).

use serde::{Deserialize, Serialize};

use crate::angular;
use crate::{ProjectionGeomError, Result};

/// Settings controlling the analytical aircraft/geometry projection grid.
///
/// Validated once at construction via [`AircraftProjectionSettings::new`];
/// `Deserialize` alone does not enforce these ranges (see `sky-calibration`
/// for the matching split between shape and semantic validity).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AircraftProjectionSettings {
    /// Output grid resolution in pixels, must be in `[64, 8192]`.
    pub resolution: u32,
    /// Physical extent of the output grid in meters, must be `>= 1000`.
    pub square_size: f64,
    /// Altitude of the projection plane above the observer in meters, must
    /// be `>= 100`.
    pub cloud_height: f64,
}

impl Default for AircraftProjectionSettings {
    fn default() -> Self {
        Self {
            resolution: 1024,
            square_size: 75_000.0,
            cloud_height: 10_000.0,
        }
    }
}

impl AircraftProjectionSettings {
    /// Validate and construct new settings.
    pub fn new(resolution: u32, square_size: f64, cloud_height: f64) -> Result<Self> {
        if !(64..=8192).contains(&resolution) {
            return Err(ProjectionGeomError::InvalidSetting {
                field: "resolution",
                value: resolution as f64,
            });
        }
        if !(square_size >= 1000.0) {
            return Err(ProjectionGeomError::InvalidSetting {
                field: "square_size",
                value: square_size,
            });
        }
        if !(cloud_height >= 100.0) {
            return Err(ProjectionGeomError::InvalidSetting {
                field: "cloud_height",
                value: cloud_height,
            });
        }
        Ok(Self {
            resolution,
            square_size,
            cloud_height,
        })
    }

    fn half(&self) -> f64 {
        self.square_size / 2.0
    }

    fn step(&self) -> f64 {
        self.square_size / (self.resolution as f64 - 1.0)
    }
}

/// Observer-anchored analytical projector between (lon, lat, alt) and pixel
/// coordinates, immutable after construction and safe to share across
/// threads without synchronization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AircraftProjector {
    pub camera_lat: f64,
    pub camera_lon: f64,
    pub camera_alt: f64,
    pub settings: AircraftProjectionSettings,
    half: f64,
    step: f64,
}

impl AircraftProjector {
    pub fn new(camera_lat: f64, camera_lon: f64, camera_alt: f64) -> Self {
        Self::with_settings(
            camera_lat,
            camera_lon,
            camera_alt,
            AircraftProjectionSettings::default(),
        )
    }

    pub fn with_settings(
        camera_lat: f64,
        camera_lon: f64,
        camera_alt: f64,
        settings: AircraftProjectionSettings,
    ) -> Self {
        Self {
            camera_lat,
            camera_lon,
            camera_alt,
            settings,
            half: settings.half(),
            step: settings.step(),
        }
    }

    /// Center pixel coordinate (`half / step`) in both axes — the pixel a
    /// point directly above the observer, at any altitude above
    /// `camera_alt`, projects to.
    pub fn center_pixel(&self) -> f64 {
        self.half / self.step
    }

    fn require_equal_shapes(a: usize, b: usize, c: usize) -> Result<()> {
        if a != b {
            return Err(ProjectionGeomError::ShapeMismatch { a, b });
        }
        if a != c {
            return Err(ProjectionGeomError::ShapeMismatch { a, b: c });
        }
        Ok(())
    }

    /// Convert a batch of geographic positions to pixel coordinates.
    ///
    /// `lon`, `lat`, and `alt_m` must have identical length (no
    /// broadcasting).
    #[tracing::instrument(level = "trace", skip_all, fields(n = lon.len()))]
    pub fn lonlat_to_pixels(
        &self,
        lon: &[f64],
        lat: &[f64],
        alt_m: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        Self::require_equal_shapes(lon.len(), lat.len(), alt_m.len())?;

        let (azimuth_deg, s12) = sky_geodesy::inverse(self.camera_lat, self.camera_lon, lat, lon)?;

        let mut px = Vec::with_capacity(lon.len());
        let mut py = Vec::with_capacity(lon.len());
        for i in 0..lon.len() {
            let dz = alt_m[i] - self.camera_alt;
            let straight = (s12[i] * s12[i] + dz * dz).sqrt();
            let elevation_deg = (dz / straight).asin().to_degrees();
            let zenith_deg = 90.0 - elevation_deg;

            let (x, y) = angular::angular_to_planar(
                azimuth_deg[i].to_radians(),
                zenith_deg.to_radians(),
                self.settings.cloud_height,
            );
            let (gx, gy) = angular::planar_to_grid(x, y, self.half);
            let (p_x, p_y) = angular::grid_to_pixels(gx, gy, self.step);
            px.push(p_x);
            py.push(p_y);
        }
        Ok((px, py))
    }

    /// Convert a batch of pixel coordinates back to geographic positions at
    /// the given target altitudes.
    ///
    /// `px`, `py`, and `alt_m` must have identical length (no broadcasting).
    #[tracing::instrument(level = "trace", skip_all, fields(n = px.len()))]
    pub fn pixels_to_lonlat(
        &self,
        px: &[f64],
        py: &[f64],
        alt_m: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        Self::require_equal_shapes(px.len(), py.len(), alt_m.len())?;

        let mut azimuth_deg = Vec::with_capacity(px.len());
        let mut distance_on_surface = Vec::with_capacity(px.len());
        for i in 0..px.len() {
            let (gx, gy) = angular::pixels_to_grid(px[i], py[i], self.step);
            let (x, y) = angular::grid_to_planar(gx, gy, self.half);
            let (az, zen) = angular::planar_to_angular(x, y, self.settings.cloud_height);

            let elevation_rad = std::f64::consts::FRAC_PI_2 - zen;
            let dz = alt_m[i] - self.camera_alt;
            azimuth_deg.push(az.to_degrees());
            distance_on_surface.push(dz / elevation_rad.tan());
        }

        let (lat, lon) = sky_geodesy::direct(
            self.camera_lat,
            self.camera_lon,
            &azimuth_deg,
            &distance_on_surface,
        )?;
        Ok((lon, lat))
    }
}

/// Single-point convenience form of the azimuth/zenith calculation used by
/// [`AircraftProjector::lonlat_to_pixels`], exposed directly per the
/// external interface contract.
///
/// Returns `(azimuth_deg, zenith_deg)` from the observer to the target.
pub fn calculate_azimuth_zenith(
    target_lat: f64,
    target_lon: f64,
    target_alt: f64,
    observer_lat: f64,
    observer_lon: f64,
    observer_alt: f64,
) -> Result<(f64, f64)> {
    let (azimuth_deg, s12) =
        sky_geodesy::inverse(observer_lat, observer_lon, &[target_lat], &[target_lon])?;
    let dz = target_alt - observer_alt;
    let straight = (s12[0] * s12[0] + dz * dz).sqrt();
    let elevation_deg = (dz / straight).asin().to_degrees();
    Ok((azimuth_deg[0], 90.0 - elevation_deg))
}

/// Single-point convenience form of the inverse calculation used by
/// [`AircraftProjector::pixels_to_lonlat`], exposed directly per the
/// external interface contract.
///
/// Returns `(lat, lon)` in decimal degrees.
pub fn calculate_latitude_longitude(
    azimuth_deg: f64,
    zenith_deg: f64,
    target_altitude: f64,
    observer_lat: f64,
    observer_lon: f64,
    observer_alt: f64,
) -> Result<(f64, f64)> {
    let elevation_rad = (90.0 - zenith_deg).to_radians();
    let dz = target_altitude - observer_alt;
    let distance_on_surface = dz / elevation_rad.tan();

    let (lat2, lon2) = sky_geodesy::direct(
        observer_lat,
        observer_lon,
        &[azimuth_deg],
        &[distance_on_surface],
    )?;
    Ok((lat2[0], lon2[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_projector() -> AircraftProjector {
        AircraftProjector::with_settings(
            48.6,
            2.35,
            90.0,
            AircraftProjectionSettings::new(1024, 75_000.0, 10_000.0).unwrap(),
        )
    }

    #[test]
    fn default_settings_match_spec_example() {
        let s = AircraftProjectionSettings::default();
        assert_eq!(s.resolution, 1024);
        assert_eq!(s.square_size, 75_000.0);
        assert_eq!(s.cloud_height, 10_000.0);
    }

    #[test]
    fn settings_reject_out_of_range_values() {
        assert!(AircraftProjectionSettings::new(32, 75_000.0, 10_000.0).is_err());
        assert!(AircraftProjectionSettings::new(1024, 500.0, 10_000.0).is_err());
        assert!(AircraftProjectionSettings::new(1024, 75_000.0, 50.0).is_err());
    }

    #[test]
    fn overhead_point_projects_to_center() {
        let proj = test_projector();
        let (px, py) = proj
            .lonlat_to_pixels(&[2.35], &[48.6], &[10_090.0])
            .unwrap();
        let center = proj.center_pixel();
        assert_relative_eq!(px[0], center, epsilon = 1.0);
        assert_relative_eq!(py[0], center, epsilon = 1.0);
    }

    #[test]
    fn due_north_point_matches_expected_grid_offset() {
        let proj = test_projector();
        // zenith 10 degrees due north: r = cloud_height * tan(10deg).
        let zen = 10f64.to_radians();
        let r = 10_000.0 * zen.tan();
        let (az_deg, dist) =
            sky_geodesy::inverse(proj.camera_lat, proj.camera_lon, &[48.6], &[2.35]).unwrap();
        // Build a target at that azimuth/distance using the direct problem,
        // matching azimuth 0 (due north) directly instead.
        let (lat2, lon2) = sky_geodesy::direct(proj.camera_lat, proj.camera_lon, &[0.0], &[r])
            .unwrap();
        let _ = (az_deg, dist);

        let (px, py) = proj
            .lonlat_to_pixels(&[lon2[0]], &[lat2[0]], &[10_090.0])
            .unwrap();
        let half = proj.settings.square_size / 2.0;
        let step = proj.settings.square_size / (proj.settings.resolution as f64 - 1.0);
        let expected_gx = half;
        let expected_gy = half - r;
        assert_relative_eq!(px[0], expected_gx / step, epsilon = 1e-2);
        assert_relative_eq!(py[0], expected_gy / step, epsilon = 1e-2);
    }

    #[test]
    fn lonlat_pixels_roundtrip() {
        let proj = test_projector();
        let lon = [2.30, 2.35, 2.40];
        let lat = [48.55, 48.60, 48.65];
        let alt = [10_000.0, 10_000.0, 10_000.0];

        let (px, py) = proj.lonlat_to_pixels(&lon, &lat, &alt).unwrap();
        let (lon_back, lat_back) = proj.pixels_to_lonlat(&px, &py, &alt).unwrap();

        for i in 0..lon.len() {
            assert_relative_eq!(lon_back[i], lon[i], epsilon = 1e-5);
            assert_relative_eq!(lat_back[i], lat[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn pixels_lonlat_roundtrip() {
        let proj = test_projector();
        let px_orig = [400.0, 512.0, 600.0];
        let py_orig = [400.0, 512.0, 600.0];
        let alt = [10_000.0, 10_000.0, 10_000.0];

        let (lon, lat) = proj.pixels_to_lonlat(&px_orig, &py_orig, &alt).unwrap();
        let (px_back, py_back) = proj.lonlat_to_pixels(&lon, &lat, &alt).unwrap();

        for i in 0..px_orig.len() {
            assert_relative_eq!(px_back[i], px_orig[i], epsilon = 1e-3);
            assert_relative_eq!(py_back[i], py_orig[i], epsilon = 1e-3);
        }
    }

    #[test]
    fn mismatched_shapes_error() {
        let proj = test_projector();
        let err = proj
            .lonlat_to_pixels(&[2.3, 2.4], &[48.5], &[10_000.0])
            .unwrap_err();
        assert_eq!(err, ProjectionGeomError::ShapeMismatch { a: 2, b: 1 });
    }

    #[test]
    fn single_point_helpers_agree_with_batch_form() {
        let proj = test_projector();
        let (az, zen) = calculate_azimuth_zenith(
            48.65,
            2.40,
            10_000.0,
            proj.camera_lat,
            proj.camera_lon,
            proj.camera_alt,
        )
        .unwrap();
        let (lat, lon) =
            calculate_latitude_longitude(az, zen, 10_000.0, proj.camera_lat, proj.camera_lon, proj.camera_alt)
                .unwrap();
        assert_relative_eq!(lat, 48.65, epsilon = 1e-5);
        assert_relative_eq!(lon, 2.40, epsilon = 1e-5);
    }
}
