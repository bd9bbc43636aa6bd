//! Piecewise-linear interpolation over a Delaunay triangulation of a
//! scattered 2-D point set.
//!
//! Triangulation itself is delegated to [`delaunator`], the same crate the
//! pack's `parry-geom` uses to turn a point set into a triangle mesh.
//! [`AngularInterpolant`] adds the piece `parry-geom` doesn't need: a grid
//! index over the triangles so that evaluating a query doesn't require
//! testing every triangle in the mesh, and barycentric-weighted value
//! interpolation rather than just collision shapes.

use crate::{InterpError, Result};

/// A 2-D value carried at each sample point — for this crate's use, a
/// fractional `(row, col)` location in a raw camera frame.
pub type Value = (f64, f64);

const EPS: f64 = 1e-9;

/// A piecewise-linear interpolant over the convex hull of a scattered point
/// set, built once and evaluated many times.
///
/// Construction triangulates every sample point (no subsampling); evaluation
/// locates the triangle containing the query and returns the
/// barycentric-weighted blend of its three vertex values. Queries outside
/// the convex hull of the input points return `(NaN, NaN)`.
pub struct AngularInterpolant {
    points: Vec<(f64, f64)>,
    values: Vec<Value>,
    triangles: Vec<[u32; 3]>,
    grid: GridIndex,
}

/// A uniform grid over the point set's bounding box, bucketing triangles by
/// the cells their bounding box overlaps. Keeps per-query triangle tests to
/// roughly the triangles actually near the query instead of the whole mesh.
struct GridIndex {
    min_x: f64,
    min_y: f64,
    cell_w: f64,
    cell_h: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<u32>>,
}

impl GridIndex {
    fn build(points: &[(f64, f64)], triangles: &[[u32; 3]]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        // One cell per ~4 triangles on average, at least a 1x1 grid.
        let target_cells = ((triangles.len() as f64 / 4.0).sqrt().ceil() as usize).max(1);
        let cols = target_cells;
        let rows = target_cells;
        let span_x = (max_x - min_x).max(EPS);
        let span_y = (max_y - min_y).max(EPS);
        let cell_w = span_x / cols as f64;
        let cell_h = span_y / rows as f64;

        let mut cells = vec![Vec::new(); cols * rows];
        for (ti, tri) in triangles.iter().enumerate() {
            let (mut tx0, mut ty0) = (f64::INFINITY, f64::INFINITY);
            let (mut tx1, mut ty1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for &vi in tri {
                let (x, y) = points[vi as usize];
                tx0 = tx0.min(x);
                ty0 = ty0.min(y);
                tx1 = tx1.max(x);
                ty1 = ty1.max(y);
            }
            let c0 = Self::clamp_index((tx0 - min_x) / cell_w, cols);
            let c1 = Self::clamp_index((tx1 - min_x) / cell_w, cols);
            let r0 = Self::clamp_index((ty0 - min_y) / cell_h, rows);
            let r1 = Self::clamp_index((ty1 - min_y) / cell_h, rows);
            for r in r0..=r1 {
                for c in c0..=c1 {
                    cells[r * cols + c].push(ti as u32);
                }
            }
        }

        Self {
            min_x,
            min_y,
            cell_w,
            cell_h,
            cols,
            rows,
            cells,
        }
    }

    fn clamp_index(v: f64, len: usize) -> usize {
        if v.is_nan() {
            return 0;
        }
        (v as isize).clamp(0, len as isize - 1) as usize
    }

    fn candidates(&self, x: f64, y: f64) -> &[u32] {
        let c = Self::clamp_index((x - self.min_x) / self.cell_w, self.cols);
        let r = Self::clamp_index((y - self.min_y) / self.cell_h, self.rows);
        &self.cells[r * self.cols + c]
    }
}

impl AngularInterpolant {
    /// Triangulate `points` and build an interpolant returning the
    /// corresponding `values` at each vertex.
    ///
    /// `points` and `values` must be parallel (same length, `points[i]`
    /// carries `values[i]`). Degenerate or duplicate points are tolerated —
    /// delaunator breaks ties arbitrarily, which this interpolant is
    /// indifferent to. Fails with [`InterpError::InsufficientPoints`] if
    /// fewer than three non-collinear points remain (delaunator produces no
    /// triangles in that case).
    #[tracing::instrument(level = "debug", skip(points, values), fields(n = points.len()))]
    pub fn build(points: &[(f64, f64)], values: &[Value]) -> Result<Self> {
        if points.len() != values.len() {
            return Err(InterpError::ShapeMismatch {
                points: points.len(),
                values: values.len(),
            });
        }
        let dpoints: Vec<delaunator::Point> = points
            .iter()
            .map(|&(x, y)| delaunator::Point { x, y })
            .collect();
        let triangulation = delaunator::triangulate(&dpoints);
        if triangulation.triangles.is_empty() {
            return Err(InterpError::InsufficientPoints);
        }
        let triangles: Vec<[u32; 3]> = triangulation
            .triangles
            .chunks(3)
            .map(|idx| [idx[0] as u32, idx[1] as u32, idx[2] as u32])
            .collect();
        let grid = GridIndex::build(points, &triangles);

        Ok(Self {
            points: points.to_vec(),
            values: values.to_vec(),
            triangles,
            grid,
        })
    }

    /// Evaluate the interpolant at `(x, y)`. Returns `(NaN, NaN)` if the
    /// query lies outside the convex hull of the construction points.
    pub fn eval(&self, query: (f64, f64)) -> Value {
        let (qx, qy) = query;
        if qx.is_nan() || qy.is_nan() {
            return (f64::NAN, f64::NAN);
        }
        for &ti in self.grid.candidates(qx, qy) {
            let tri = self.triangles[ti as usize];
            if let Some(weights) = barycentric(self.points[tri[0] as usize],
                self.points[tri[1] as usize],
                self.points[tri[2] as usize],
                (qx, qy))
            {
                let v0 = self.values[tri[0] as usize];
                let v1 = self.values[tri[1] as usize];
                let v2 = self.values[tri[2] as usize];
                return (
                    weights.0 * v0.0 + weights.1 * v1.0 + weights.2 * v2.0,
                    weights.0 * v0.1 + weights.1 * v1.1 + weights.2 * v2.1,
                );
            }
        }
        (f64::NAN, f64::NAN)
    }

    /// Number of triangles in the underlying triangulation.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Barycentric weights of `q` with respect to triangle `(a, b, c)`, or
/// `None` if `q` lies outside the triangle (within a small epsilon).
fn barycentric(
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    q: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1);
    if denom.abs() < EPS {
        return None;
    }
    let w_a = ((b.1 - c.1) * (q.0 - c.0) + (c.0 - b.0) * (q.1 - c.1)) / denom;
    let w_b = ((c.1 - a.1) * (q.0 - c.0) + (a.0 - c.0) * (q.1 - c.1)) / denom;
    let w_c = 1.0 - w_a - w_b;
    if w_a < -EPS || w_b < -EPS || w_c < -EPS {
        None
    } else {
        Some((w_a, w_b, w_c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_points() -> (Vec<(f64, f64)>, Vec<Value>) {
        let points = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let values = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        (points, values)
    }

    #[test]
    fn interpolates_inside_hull() {
        let (points, values) = square_points();
        let f = AngularInterpolant::build(&points, &values).unwrap();
        let (row, col) = f.eval((0.5, 0.5));
        assert_relative_eq!(row, 5.0, epsilon = 1e-9);
        assert_relative_eq!(col, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn exact_at_vertices() {
        let (points, values) = square_points();
        let f = AngularInterpolant::build(&points, &values).unwrap();
        for (p, v) in points.iter().zip(values.iter()) {
            let (row, col) = f.eval(*p);
            assert_relative_eq!(row, v.0, epsilon = 1e-6);
            assert_relative_eq!(col, v.1, epsilon = 1e-6);
        }
    }

    #[test]
    fn outside_hull_is_nan() {
        let (points, values) = square_points();
        let f = AngularInterpolant::build(&points, &values).unwrap();
        let (row, col) = f.eval((10.0, 10.0));
        assert!(row.is_nan());
        assert!(col.is_nan());
    }

    #[test]
    fn nan_query_is_nan() {
        let (points, values) = square_points();
        let f = AngularInterpolant::build(&points, &values).unwrap();
        let (row, col) = f.eval((f64::NAN, 0.5));
        assert!(row.is_nan());
        assert!(col.is_nan());
    }

    #[test]
    fn insufficient_points_fails() {
        let points = vec![(0.0, 0.0), (1.0, 0.0)];
        let values = vec![(0.0, 0.0), (1.0, 0.0)];
        assert_eq!(
            AngularInterpolant::build(&points, &values).unwrap_err(),
            InterpError::InsufficientPoints
        );
    }

    #[test]
    fn collinear_points_fail() {
        let points = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        let values = vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)];
        assert_eq!(
            AngularInterpolant::build(&points, &values).unwrap_err(),
            InterpError::InsufficientPoints
        );
    }

    #[test]
    fn mismatched_lengths_error() {
        let points = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)];
        let values = vec![(0.0, 0.0)];
        assert_eq!(
            AngularInterpolant::build(&points, &values).unwrap_err(),
            InterpError::ShapeMismatch {
                points: 3,
                values: 1
            }
        );
    }
}
