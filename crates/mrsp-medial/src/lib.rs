//! # mrsp-medial
//!
//! The C3 medial axis extractor (spec.md §4.3): given a `HoledPolygon` and a
//! `(min_width, max_width)` window, returns open paths approximating the
//! medial axis through regions whose local width falls inside that window.
//!
//! Grounded in `original_source/multi/medialaxis.cpp`'s `prunedMedialAxis`/
//! `buildMedialAxis`, split across four kernel-agnostic passes
//! ([`graph`], [`prune`], [`walk`], [`clip_extend`]) plus one adapter to the
//! real Voronoi kernel ([`voronoi_adapter`]), the way `mrsp-geom` keeps its
//! kernel bindings in a dedicated `convert` module.

mod clip_extend;
mod error;
mod graph;
mod prune;
mod voronoi_adapter;
mod walk;

pub use error::{MedialError, MedialResult};
pub use graph::{Segment, VoronoiGraph};

use mrsp_core::geometry::{BoundingBox, FitTransform, HoledPolygon, Path, Point};
use tracing::debug;

/// Runs the full pipeline of spec.md §4.3 and returns the surviving open
/// polylines, in the polygon's original coordinate system.
pub fn medial_axis(hp: &HoledPolygon, min_width: f64, max_width: f64) -> MedialResult<Vec<Path>> {
    let all_points: Vec<Point> = hp.all_paths().flat_map(|p| p.points.iter().copied()).collect();
    let Some(bbox) = BoundingBox::from_points(&all_points) else {
        return Ok(Vec::new());
    };
    let transform = bbox.fit_to_int32();
    let is_identity = transform == FitTransform::identity();

    let scaled_hp = if is_identity {
        hp.clone()
    } else {
        transform_holed_polygon(hp, &transform)
    };

    let segments = voronoi_adapter::polygon_to_segments(&scaled_hp);
    let graph = voronoi_adapter::build_graph(&segments)?;
    debug!(vertices = graph.vertices.len(), edges = graph.edges.len(), "voronoi diagram built");

    let active = prune::prune(&graph, &segments, min_width);
    let mut lines = walk::walk(&graph, active);
    debug!(polylines = lines.len(), "medial axis walked");

    lines = clip_extend::clip_polylines(&lines, &scaled_hp);
    clip_extend::extend_endpoints(&mut lines, max_width);
    lines = clip_extend::clip_polylines(&lines, &scaled_hp);
    lines = clip_extend::drop_short(lines, max_width);

    let paths = lines
        .into_iter()
        .map(|line| {
            let points: Vec<Point> = line
                .into_iter()
                .map(|(x, y)| {
                    let p = Point::new(x.round() as i64, y.round() as i64);
                    if is_identity {
                        p
                    } else {
                        transform.invert(p)
                    }
                })
                .collect();
            Path::open(points)
        })
        .collect();

    Ok(paths)
}

fn transform_holed_polygon(
    hp: &HoledPolygon,
    transform: &mrsp_core::geometry::FitTransform,
) -> HoledPolygon {
    let map_path = |p: &Path| Path {
        points: p.points.iter().map(|&pt| transform.apply(pt)).collect(),
        closed: p.closed,
    };
    HoledPolygon::new(
        map_path(&hp.outer),
        hp.holes.iter().map(map_path).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(w: i64, h: i64) -> HoledPolygon {
        HoledPolygon::new(
            Path::closed(vec![
                Point::new(0, 0),
                Point::new(w, 0),
                Point::new(w, h),
                Point::new(0, h),
            ]),
            Vec::new(),
        )
    }

    #[test]
    fn narrow_rectangle_yields_a_spine() {
        // A long, narrow rectangle's medial axis should be roughly its
        // horizontal centerline.
        let hp = rectangle(1000, 40);
        let paths = medial_axis(&hp, 5.0, 30.0).unwrap();
        assert!(!paths.is_empty());
        for path in &paths {
            for p in &path.points {
                assert!((p.y - 20).abs() <= 5, "expected points near centerline, got {p:?}");
            }
        }
    }

    #[test]
    fn window_narrower_than_shape_yields_nothing_or_trivial() {
        let hp = rectangle(100, 100);
        // min_width larger than any local width in a roughly-square shape:
        // every candidate edge should be pruned as "too narrow" or absent.
        let paths = medial_axis(&hp, 1000.0, 2000.0).unwrap();
        assert!(paths.is_empty() || paths.iter().all(|p| p.points.len() < 2));
    }
}
