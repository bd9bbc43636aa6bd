//! Traversal and coordinate-wise re-projection of vector geometries (§C7).
//!
//! Shaped after `geo-types`' `Geometry` enum and its nesting conventions
//! (exterior ring + interior rings for `Polygon`), but three-dimensional
//! throughout: every vertex carries an altitude, since the only use of this
//! enum is passing georeferenced shapes through [`crate::aircraft`]'s
//! projector. `geo-types` itself only models 2D coordinates, so it is not
//! reused here.

use crate::{AircraftProjector, ProjectionGeomError, Result};

/// A single vertex: `(x, y, z)` where `x`/`y` are either (lon, lat) or
/// (pixel, pixel) depending on which side of a projection the geometry is
/// on, and `z` is the altitude, required on every vertex.
///
/// `z` is `Option` only to let a geometry pass through construction before
/// altitude validation; [`transform_geometry`] rejects any geometry with a
/// `None` z (other than an empty one) with
/// [`ProjectionGeomError::AltitudeMissing`], matching how the analytical
/// projector treats a missing Z coordinate as a caller error rather than
/// silently substituting zero.
pub type Coord = (f64, f64, Option<f64>);

/// A vector geometry carrying per-vertex altitude, mirroring the standard
/// simple-features shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    /// `exterior` is the outer ring; `interiors` are holes. Either may be
    /// empty for a degenerate/empty polygon.
    Polygon {
        exterior: Vec<Coord>,
        interiors: Vec<Vec<Coord>>,
    },
    MultiPolygon(Vec<(Vec<Coord>, Vec<Vec<Coord>>)>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// True for an empty collection/multi-geometry or a `LineString`,
    /// `Polygon`, etc. with no vertices. A `Point` is never considered
    /// empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::MultiPoint(pts) => pts.is_empty(),
            Geometry::LineString(pts) => pts.is_empty(),
            Geometry::MultiLineString(lines) => lines.iter().all(|l| l.is_empty()),
            Geometry::Polygon { exterior, .. } => exterior.is_empty(),
            Geometry::MultiPolygon(polys) => polys.iter().all(|(ext, _)| ext.is_empty()),
            Geometry::GeometryCollection(geoms) => geoms.iter().all(Geometry::is_empty),
        }
    }
}

/// Flatten every vertex of `geom` into parallel `(x, y, z)` buffers, in a
/// fixed traversal order that [`rebuild`] can reverse.
fn flatten(geom: &Geometry, xs: &mut Vec<f64>, ys: &mut Vec<f64>, zs: &mut Vec<f64>) -> Result<()> {
    let mut push_coord = |c: &Coord, xs: &mut Vec<f64>, ys: &mut Vec<f64>, zs: &mut Vec<f64>| {
        let z = c.2.ok_or(ProjectionGeomError::AltitudeMissing)?;
        xs.push(c.0);
        ys.push(c.1);
        zs.push(z);
        Ok::<(), ProjectionGeomError>(())
    };

    match geom {
        Geometry::Point(c) => push_coord(c, xs, ys, zs)?,
        Geometry::MultiPoint(pts) | Geometry::LineString(pts) => {
            for c in pts {
                push_coord(c, xs, ys, zs)?;
            }
        }
        Geometry::MultiLineString(lines) => {
            for line in lines {
                for c in line {
                    push_coord(c, xs, ys, zs)?;
                }
            }
        }
        Geometry::Polygon { exterior, interiors } => {
            for c in exterior {
                push_coord(c, xs, ys, zs)?;
            }
            for ring in interiors {
                for c in ring {
                    push_coord(c, xs, ys, zs)?;
                }
            }
        }
        Geometry::MultiPolygon(polys) => {
            for (exterior, interiors) in polys {
                for c in exterior {
                    push_coord(c, xs, ys, zs)?;
                }
                for ring in interiors {
                    for c in ring {
                        push_coord(c, xs, ys, zs)?;
                    }
                }
            }
        }
        Geometry::GeometryCollection(geoms) => {
            for g in geoms {
                flatten(g, xs, ys, zs)?;
            }
        }
    }
    Ok(())
}

/// Rebuild a geometry with `geom`'s shape, consuming transformed
/// coordinates from `xs`/`ys`/`zs` in the same order [`flatten`] produced
/// them.
fn rebuild(geom: &Geometry, xs: &[f64], ys: &[f64], zs: &[f64], cursor: &mut usize) -> Geometry {
    let mut next_coord = |cursor: &mut usize| -> Coord {
        let i = *cursor;
        *cursor += 1;
        (xs[i], ys[i], Some(zs[i]))
    };

    match geom {
        Geometry::Point(_) => Geometry::Point(next_coord(cursor)),
        Geometry::MultiPoint(pts) => {
            Geometry::MultiPoint(pts.iter().map(|_| next_coord(cursor)).collect())
        }
        Geometry::LineString(pts) => {
            Geometry::LineString(pts.iter().map(|_| next_coord(cursor)).collect())
        }
        Geometry::MultiLineString(lines) => Geometry::MultiLineString(
            lines
                .iter()
                .map(|line| line.iter().map(|_| next_coord(cursor)).collect())
                .collect(),
        ),
        Geometry::Polygon { exterior, interiors } => Geometry::Polygon {
            exterior: exterior.iter().map(|_| next_coord(cursor)).collect(),
            interiors: interiors
                .iter()
                .map(|ring| ring.iter().map(|_| next_coord(cursor)).collect())
                .collect(),
        },
        Geometry::MultiPolygon(polys) => Geometry::MultiPolygon(
            polys
                .iter()
                .map(|(exterior, interiors)| {
                    (
                        exterior.iter().map(|_| next_coord(cursor)).collect(),
                        interiors
                            .iter()
                            .map(|ring| ring.iter().map(|_| next_coord(cursor)).collect())
                            .collect(),
                    )
                })
                .collect(),
        ),
        Geometry::GeometryCollection(geoms) => Geometry::GeometryCollection(
            geoms
                .iter()
                .map(|g| rebuild(g, xs, ys, zs, cursor))
                .collect(),
        ),
    }
}

/// Apply a batched coordinate transform to every vertex of `geom`, leaving
/// altitude untouched and structure (rings, parts, collection members)
/// identical.
///
/// An empty geometry is returned unchanged without invoking `transform`.
/// Any vertex missing its altitude causes
/// [`ProjectionGeomError::AltitudeMissing`].
pub fn transform_geometry<F>(geom: &Geometry, transform: F) -> Result<Geometry>
where
    F: FnOnce(&[f64], &[f64], &[f64]) -> Result<(Vec<f64>, Vec<f64>)>,
{
    if geom.is_empty() {
        return Ok(geom.clone());
    }

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut zs = Vec::new();
    flatten(geom, &mut xs, &mut ys, &mut zs)?;

    let (new_xs, new_ys) = transform(&xs, &ys, &zs)?;

    let mut cursor = 0;
    Ok(rebuild(geom, &new_xs, &new_ys, &zs, &mut cursor))
}

/// Project a geometry's `(lon, lat, alt)` vertices to `(pixel_x, pixel_y,
/// alt)` using `projector`.
pub fn project_geometry(projector: &AircraftProjector, geom: &Geometry) -> Result<Geometry> {
    transform_geometry(geom, |lon, lat, alt| projector.lonlat_to_pixels(lon, lat, alt))
}

/// Invert [`project_geometry`]: project a geometry's `(pixel_x, pixel_y,
/// alt)` vertices back to `(lon, lat, alt)` using `projector`.
pub fn project_geometry_back(projector: &AircraftProjector, geom: &Geometry) -> Result<Geometry> {
    transform_geometry(geom, |px, py, alt| projector.pixels_to_lonlat(px, py, alt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{AircraftProjectionSettings, AircraftProjector};
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
    fn empty_geometry_passes_through_unchanged() {
        let proj = test_projector();
        let empty = Geometry::LineString(vec![]);
        let out = project_geometry(&proj, &empty).unwrap();
        assert_eq!(out, empty);
    }

    #[test]
    fn missing_altitude_errors() {
        let proj = test_projector();
        let point = Geometry::Point((2.35, 48.6, None));
        let err = project_geometry(&proj, &point).unwrap_err();
        assert_eq!(err, ProjectionGeomError::AltitudeMissing);
    }

    #[test]
    fn point_round_trips_through_projection() {
        let proj = test_projector();
        let point = Geometry::Point((2.40, 48.65, Some(10_000.0)));

        let projected = project_geometry(&proj, &point).unwrap();
        let back = project_geometry_back(&proj, &projected).unwrap();

        match back {
            Geometry::Point((x, y, Some(z))) => {
                assert_relative_eq!(x, 2.40, epsilon = 1e-5);
                assert_relative_eq!(y, 48.65, epsilon = 1e-5);
                assert_relative_eq!(z, 10_000.0, epsilon = 1e-9);
            }
            other => panic!("expected Point, got {other:?}"),
        }
    }

    #[test]
    fn linestring_preserves_vertex_count_and_altitude() {
        let proj = test_projector();
        let line = Geometry::LineString(vec![
            (2.30, 48.55, Some(10_000.0)),
            (2.35, 48.60, Some(10_100.0)),
            (2.40, 48.65, Some(10_200.0)),
        ]);

        let projected = project_geometry(&proj, &line).unwrap();
        match &projected {
            Geometry::LineString(pts) => {
                assert_eq!(pts.len(), 3);
                assert_eq!(pts[1].2, Some(10_100.0));
            }
            other => panic!("expected LineString, got {other:?}"),
        }
    }

    #[test]
    fn polygon_round_trips_rings() {
        let proj = test_projector();
        let polygon = Geometry::Polygon {
            exterior: vec![
                (2.30, 48.55, Some(10_000.0)),
                (2.40, 48.55, Some(10_000.0)),
                (2.40, 48.65, Some(10_000.0)),
                (2.30, 48.65, Some(10_000.0)),
                (2.30, 48.55, Some(10_000.0)),
            ],
            interiors: vec![],
        };

        let projected = project_geometry(&proj, &polygon).unwrap();
        let back = project_geometry_back(&proj, &projected).unwrap();

        match (&polygon, &back) {
            (
                Geometry::Polygon { exterior: orig, .. },
                Geometry::Polygon { exterior: round, .. },
            ) => {
                assert_eq!(orig.len(), round.len());
                for (o, r) in orig.iter().zip(round.iter()) {
                    assert_relative_eq!(o.0, r.0, epsilon = 1e-5);
                    assert_relative_eq!(o.1, r.1, epsilon = 1e-5);
                }
            }
            _ => panic!("expected Polygon on both sides"),
        }
    }

    #[test]
    fn geometry_collection_recurses() {
        let proj = test_projector();
        let collection = Geometry::GeometryCollection(vec![
            Geometry::Point((2.35, 48.6, Some(10_000.0))),
            Geometry::LineString(vec![]),
        ]);
        let projected = project_geometry(&proj, &collection).unwrap();
        match projected {
            Geometry::GeometryCollection(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected GeometryCollection, got {other:?}"),
        }
    }
}
