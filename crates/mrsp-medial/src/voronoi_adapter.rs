//! Binds [`crate::graph::VoronoiGraph`] construction to the real `boostvoronoi`
//! kernel, mirroring how `original_source/multi/medialaxis.cpp` feeds the
//! polygon's boundary segments to `boost::polygon::voronoi_builder` and then
//! walks `vd.edges()`/`vd.vertices()` filtering out secondary and infinite
//! edges (spec.md §4.3 steps 2–3).
//!
//! This is the one place in the crate that talks to the backing kernel
//! directly; the pruning and walking passes operate on the kernel-agnostic
//! [`crate::graph::VoronoiGraph`] so they stay unit-testable without it.

use crate::error::{MedialError, MedialResult};
use crate::graph::{Segment, VoronoiGraph};
use boostvoronoi::builder::Builder;
use boostvoronoi::geometry::{Line, Point as BvPoint};
use mrsp_core::geometry::HoledPolygon;
use std::panic::AssertUnwindSafe;

/// Flattens a `HoledPolygon`'s outer path and holes into directed boundary
/// segments (outer CCW, holes CW — the orientation `boost::polygon`'s
/// voronoi builder needs to tell solid from void apart is irrelevant here
/// since the medial axis only consumes cell *adjacency*, not sidedness, but
/// the standard orientation is kept for parity with the original's
/// `HoledPolygon::addToSegments`).
pub fn polygon_to_segments(hp: &HoledPolygon) -> Vec<Segment> {
    let mut segments = Vec::new();
    for path in hp.all_paths() {
        let n = path.points.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let a = path.points[i];
            let b = path.points[(i + 1) % n];
            segments.push(Segment { a, b });
        }
    }
    segments
}

/// Constructs the Voronoi diagram over `segments` and reduces it to a
/// [`VoronoiGraph`] holding only primary, finite edges (spec.md §4.3 step 3).
pub fn build_graph(segments: &[Segment]) -> MedialResult<VoronoiGraph> {
    if segments.len() < 2 {
        return Ok(VoronoiGraph::default());
    }

    let lines: Vec<Line<i64>> = segments
        .iter()
        .map(|s| Line::new(BvPoint { x: s.a.x, y: s.a.y }, BvPoint { x: s.b.x, y: s.b.y }))
        .collect();

    let diagram = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let mut builder: Builder<i64, f64> = Builder::default();
        builder.with_segments(lines.iter())?;
        builder.build()
    }))
    .map_err(|_| MedialError::VoronoiBuildFailed("kernel panicked".to_string()))?
    .map_err(|e| MedialError::VoronoiBuildFailed(e.to_string()))?;

    let mut graph = VoronoiGraph::default();
    let num_vertices = diagram.vertices().len();
    let mut vertex_ids = Vec::with_capacity(num_vertices);
    for v in diagram.vertices().iter() {
        let v = v.get();
        vertex_ids.push(graph.add_vertex(v.x(), v.y()));
    }

    // Each primary, finite twin pair is emitted once (when we encounter the
    // lower-indexed half) as one `add_edge_pair`, matching spec.md §4.3
    // step 3's "discard secondary and infinite edges".
    let mut emitted = vec![false; diagram.edges().len()];
    for (idx, e) in diagram.edges().iter().enumerate() {
        if emitted[idx] {
            continue;
        }
        let edge = e.get();
        if edge.is_secondary() || !edge.is_finite() {
            emitted[idx] = true;
            continue;
        }
        let twin_idx = edge.twin().0;
        emitted[idx] = true;
        emitted[twin_idx] = true;

        let (Some(v0), Some(v1)) = (edge.vertex0(), edge.vertex1()) else {
            continue;
        };
        let cell_idx = edge.cell().0;
        let twin_cell_idx = diagram.edges()[twin_idx].get().cell().0;
        let cell = diagram.cells()[cell_idx].get();
        let twin_cell = diagram.cells()[twin_cell_idx].get();
        let seg_a = cell.contains_segment().then(|| cell.source_index());
        let seg_b = twin_cell.contains_segment().then(|| twin_cell.source_index());

        graph.add_edge_pair(vertex_ids[v0.0], vertex_ids[v1.0], seg_a, seg_b);
    }

    Ok(graph)
}
