//! End-to-end exercise of `CalibrationData` -> `ProjectionService` ->
//! `project`, covering determinism and the out-of-hull-is-zero contract.

use sky_calibration::{CalibrationData, ProjectionService, ProjectionSettings};
use sky_interp::bilinear::ImageView;

fn synthetic_calibration(h: usize, w: usize, cone_half_width_cells: f64) -> CalibrationData {
    let mut azimuth = Vec::with_capacity(h * w);
    let mut zenith = Vec::with_capacity(h * w);
    let (cy, cx) = ((h as f64 - 1.0) / 2.0, (w as f64 - 1.0) / 2.0);
    for row in 0..h {
        for col in 0..w {
            let x = col as f64 - cx;
            let y = row as f64 - cy;
            azimuth.push(y.atan2(x));
            zenith.push(((x * x + y * y).sqrt() / cone_half_width_cells).atan());
        }
    }
    CalibrationData::new(azimuth, zenith, (h, w)).unwrap()
}

#[test]
fn project_is_deterministic_across_runs() {
    let calibration = synthetic_calibration(8, 8, 8.0);
    let settings = ProjectionSettings::new(16, 1.0, 8.0, 85.0).unwrap();
    let service = ProjectionService::new(calibration, settings);

    let mut data = vec![0u8; 8 * 8 * 3];
    for (i, px) in data.iter_mut().enumerate() {
        *px = (i % 256) as u8;
    }
    let image = ImageView::new(&data, 8, 8, 3);

    let first = service.project(image, true).unwrap();
    let second = service.project(image, true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn tight_zenith_cutoff_produces_zero_outer_ring() {
    let calibration = synthetic_calibration(16, 16, 16.0);
    // A narrow cutoff leaves only the central calibration points available,
    // so the corners of the output grid (far zenith) fall outside the
    // interpolant's hull and must sample to zero.
    let settings = ProjectionSettings::new(32, 1.0, 16.0, 5.0).unwrap();
    let service = ProjectionService::new(calibration, settings);

    let data = vec![250u8; 16 * 16 * 3];
    let image = ImageView::new(&data, 16, 16, 3);

    let out = service.project(image, true).unwrap();
    let sky_calibration::ProjectedImage::U8 {
        data, resolution, channels, ..
    } = out
    else {
        panic!("expected uint8 output");
    };
    let corner = &data[0..channels];
    assert_eq!(corner, &vec![0u8; channels][..]);
    assert_eq!(resolution, 32);
}
