//! Conversions between `mrsp_core` geometry and the two backing kernels:
//! `cavalier_contours::polyline::Polyline` (offsetting) and
//! `csgrs::sketch::Sketch` via its `geo::MultiPolygon` bridge (clipping).
//!
//! Grounded in `gcodekit5-designer::ops::perform_offset`/`perform_boolean`,
//! which already convert `cavalier_contours::Polyline` vertices to/from
//! `[f64; 2]` pairs and build a `csgrs::sketch::Sketch` polygon-by-polygon
//! from a `geo::MultiPolygon`'s exteriors/interiors.

use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use mrsp_core::geometry::{nesting_info, Path, Point, PolygonSet};

/// Converts an integer [`Path`] into a `cavalier_contours` polyline with
/// zero bulge on every vertex (our offsetting input is always a straight
/// polygon/polyline; arcs only appear in the kernel's own offset output).
pub fn path_to_pline(path: &Path) -> Polyline<f64> {
    let mut pline = Polyline::new();
    for p in &path.points {
        pline.add_vertex(PlineVertex::new(p.x as f64, p.y as f64, 0.0));
    }
    pline.set_is_closed(path.closed);
    pline
}

/// Converts a `cavalier_contours` polyline back into an integer [`Path`],
/// rounding vertex coordinates (arcs introduced by offsetting are
/// flattened into their vertex positions; sub-vertex arc curvature is not
/// preserved, matching the rest of the pipeline's integer coordinate
/// model).
pub fn pline_to_path(pline: &Polyline<f64>) -> Path {
    let points: Vec<Point> = pline
        .iter_vertexes()
        .map(|v| Point::new(v.x.round() as i64, v.y.round() as i64))
        .collect();
    Path {
        points,
        closed: pline.is_closed(),
    }
}

/// Cleans a polyline the way `gcodekit5-designer::ops::clean_polyline` does:
/// drop near-duplicate consecutive vertices, and drop a closing vertex that
/// duplicates the first one.
pub fn clean_pline(mut pline: Polyline<f64>) -> Polyline<f64> {
    pline.remove_repeat_pos(1e-5);
    if pline.is_closed() && pline.vertex_count() > 1 {
        let first = pline.get(0).unwrap();
        let last = pline.get(pline.vertex_count() - 1).unwrap();
        if (first.x - last.x).abs() < 1e-5 && (first.y - last.y).abs() < 1e-5 {
            pline.remove(pline.vertex_count() - 1);
        }
    }
    pline
}

/// Builds a `csgrs` sketch from a `PolygonSet` by first grouping its paths
/// into outer/hole nestings (spec.md §4.1 `orientPaths`'s depth analysis)
/// and then, matching `perform_offset`'s per-polygon construction, adding
/// each top-level polygon (with its holes subtracted) as a union into the
/// sketch.
pub fn polygon_set_to_sketch(set: &PolygonSet) -> csgrs::sketch::Sketch<()> {
    let closed_paths: Vec<&Path> = set.paths.iter().filter(|p| p.points.len() >= 3).collect();
    let owned: Vec<Path> = closed_paths.iter().map(|p| (*p).clone()).collect();
    let info = nesting_info(&owned);

    let mut sketch = csgrs::sketch::Sketch::new();
    for (i, n) in info.iter().enumerate() {
        if n.depth % 2 != 0 {
            continue; // holes are handled from their parent below
        }
        let outer_pts = path_to_f64_pairs(&owned[i]);
        if outer_pts.len() < 3 {
            continue;
        }
        let mut poly_sketch = csgrs::sketch::Sketch::polygon(&outer_pts, None);
        for (j, nj) in info.iter().enumerate() {
            if nj.parent == Some(i) && nj.depth % 2 == 1 {
                let hole_pts = path_to_f64_pairs(&owned[j]);
                if hole_pts.len() >= 3 {
                    let hole_sketch = csgrs::sketch::Sketch::polygon(&hole_pts, None);
                    poly_sketch = poly_sketch.difference(&hole_sketch);
                }
            }
        }
        sketch = sketch.union(&poly_sketch);
    }
    sketch
}

fn path_to_f64_pairs(path: &Path) -> Vec<[f64; 2]> {
    path.points.iter().map(|p| [p.x as f64, p.y as f64]).collect()
}

/// Converts a `csgrs` sketch's multipolygon back into a `PolygonSet`,
/// emitting the exterior of each polygon as one closed path and each
/// interior ring as another, the way `perform_offset` walks
/// `poly.exterior()`/`poly.interiors()`.
pub fn sketch_to_polygon_set(sketch: &csgrs::sketch::Sketch<()>) -> PolygonSet {
    let mp = sketch.to_multipolygon();
    let mut paths = Vec::new();
    for poly in mp.0.iter() {
        paths.push(coords_to_path(poly.exterior().0.iter()));
        for interior in poly.interiors() {
            paths.push(coords_to_path(interior.0.iter()));
        }
    }
    PolygonSet::new(paths)
}

fn coords_to_path<'a>(coords: impl Iterator<Item = &'a geo::Coord<f64>>) -> Path {
    let mut pts: Vec<Point> = coords
        .map(|c| Point::new(c.x.round() as i64, c.y.round() as i64))
        .collect();
    // geo rings repeat the first point as the last; our closed Path does not.
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    Path::closed(pts)
}
