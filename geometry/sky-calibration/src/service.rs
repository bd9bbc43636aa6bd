//! The lazily-built calibrated projection service.

use std::sync::OnceLock;

use sky_interp::bilinear::{self, ImageView};
use sky_interp::delaunay::AngularInterpolant;

use crate::{CalibrationData, ProjectionError, ProjectionSettings, Result};

struct Built {
    interpolant: AngularInterpolant,
    /// `(azimuth_rad, zenith_rad)` per output cell, row-major,
    /// `resolution * resolution` long.
    angular_grid: Vec<(f64, f64)>,
}

/// Ties a [`CalibrationData`] record to [`ProjectionSettings`] and exposes
/// `project`, building the Delaunay interpolant and the output-cell
/// angular grid on first use.
///
/// Both derived structures depend only on the `CalibrationData` and
/// `ProjectionSettings` this service was constructed with; they become
/// stale if either would change, which is why both are taken by value (or
/// clone) at construction rather than referenced.
pub struct ProjectionService {
    calibration: CalibrationData,
    settings: ProjectionSettings,
    built: OnceLock<Result<Built>>,
}

impl ProjectionService {
    pub fn new(calibration: CalibrationData, settings: ProjectionSettings) -> Self {
        Self {
            calibration,
            settings,
            built: OnceLock::new(),
        }
    }

    pub fn calibration(&self) -> &CalibrationData {
        &self.calibration
    }

    pub fn settings(&self) -> &ProjectionSettings {
        &self.settings
    }

    /// Build the interpolant and output grid if they have not been built
    /// yet. Idempotent; under concurrent first use, every caller but one
    /// blocks on `OnceLock::get_or_init` rather than redoing the
    /// triangulation themselves.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn ensure_built(&self) -> Result<()> {
        match self.built.get_or_init(|| self.build()) {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        }
    }

    fn build(&self) -> Result<Built> {
        let max_zenith_rad = self.settings.max_zenith_angle.to_radians();

        let mut points = Vec::new();
        let mut values = Vec::new();
        for (row, col, az, zen) in self.calibration.iter_pixels() {
            if az.is_nan() || zen.is_nan() || zen > max_zenith_rad {
                continue;
            }
            points.push((az, zen));
            values.push((row as f64, col as f64));
        }
        let interpolant = AngularInterpolant::build(&points, &values)?;

        let resolution = self.settings.resolution as usize;
        let half = self.settings.half();
        let step = self.settings.step();
        let cloud_height = self.settings.cloud_height;

        let mut angular_grid = Vec::with_capacity(resolution * resolution);
        for i in 0..resolution {
            let y = -half + i as f64 * step;
            for j in 0..resolution {
                let x = -half + j as f64 * step;
                let r = (x * x + y * y).sqrt();
                let zen = (r / cloud_height).atan();
                let az = y.atan2(x);
                let az = legacy_azimuth_alignment(az);
                angular_grid.push((az, zen));
            }
        }

        Ok(Built {
            interpolant,
            angular_grid,
        })
    }

    /// Remap `image` (shape matching `calibration.image_size()`, with
    /// `channels` color/intensity planes) to the `resolution x resolution`
    /// output grid.
    ///
    /// Returns `uint8` samples (saturating-clamped) when `as_uint8` is
    /// true, `float64` samples otherwise. Output cells whose back-projected
    /// angle falls outside the calibration interpolant's convex hull (e.g.
    /// beyond `max_zenith_angle`) sample to all-zero, the same contract
    /// [`bilinear::sample_into`] applies to out-of-bounds raw-image
    /// queries.
    #[tracing::instrument(level = "debug", skip(self, image), fields(as_uint8))]
    pub fn project(&self, image: ImageView<'_>, as_uint8: bool) -> Result<ProjectedImage> {
        self.ensure_built()?;
        let built = self
            .built
            .get()
            .and_then(|r| r.as_ref().ok())
            .expect("ensure_built just populated this with Ok");

        let (expected_rows, expected_cols) = self.calibration.image_size();
        if image.height() != expected_rows || image.width() != expected_cols {
            return Err(ProjectionError::ImageShapeMismatch {
                expected_rows,
                expected_cols,
                actual_rows: image.height(),
                actual_cols: image.width(),
            });
        }

        let resolution = self.settings.resolution as usize;
        let channels = image.channels();
        let mut out = vec![0.0f64; resolution * resolution * channels];
        let mut sample = vec![0.0f64; channels];

        for (cell_idx, &(az, zen)) in built.angular_grid.iter().enumerate() {
            let (row, col) = built.interpolant.eval((az, zen));
            bilinear::sample_into(image, row, col, &mut sample);
            out[cell_idx * channels..(cell_idx + 1) * channels].copy_from_slice(&sample);
        }

        if as_uint8 {
            let data = out.into_iter().map(bilinear::to_u8_saturating).collect();
            Ok(ProjectedImage::U8 {
                data,
                resolution,
                channels,
            })
        } else {
            Ok(ProjectedImage::F64 {
                data: out,
                resolution,
                channels,
            })
        }
    }
}

/// Map the mathematical `atan2` azimuth convention onto the calibration
/// map's orientation: `az <- ((az - 3*pi/2) mod 2*pi) - pi`.
///
/// This is a wire-compatibility contract with existing calibration
/// artifacts, not an arbitrary convention choice; do not simplify it.
fn legacy_azimuth_alignment(az: f64) -> f64 {
    use std::f64::consts::PI;
    (az - 1.5 * PI).rem_euclid(2.0 * PI) - PI
}

/// A remapped output image, shape `(resolution, resolution, channels)`
/// row-major, in the sample type [`ProjectionService::project`] was asked
/// for.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedImage {
    U8 {
        data: Vec<u8>,
        resolution: usize,
        channels: usize,
    },
    F64 {
        data: Vec<f64>,
        resolution: usize,
        channels: usize,
    },
}
