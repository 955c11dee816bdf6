//! Leaf-pruning pass (spec.md §4.3 step 4), grounded in
//! `original_source/multi/medialaxis.cpp`'s `buildMedialAxis` leaf-removal
//! loop and `valid_edge`.

use crate::graph::{Segment, VoronoiGraph};
use std::collections::{HashSet, VecDeque};

/// Runs the leaf-pruning pass and returns the surviving half-edge indices.
///
/// An edge is pruned when (a) the two cells it separates do not share
/// opposite-direction parent segments (the angle between them deviates from
/// `π` by more than `π/5`), or (b) — following
/// `original_source/multi/medialaxis.cpp::valid_edge` exactly, which
/// computes something subtly different from spec.md's own prose about
/// "distances differing by more than minWidth" — both of the edge's
/// endpoints sit closer than `min_width` to the *other* segment's far tip,
/// which is the original's proxy for "this edge lies in a corner, not a
/// through-channel". See `DESIGN.md` for why the original is followed here.
pub fn prune(graph: &VoronoiGraph, segments: &[Segment], min_width: f64) -> HashSet<usize> {
    let mut incident: Vec<HashSet<usize>> = vec![HashSet::new(); graph.vertices.len()];
    let mut active: HashSet<usize> = HashSet::new();
    for (idx, edge) in graph.edges.iter().enumerate() {
        active.insert(idx);
        incident[edge.from].insert(idx);
    }

    let mut leaves: VecDeque<usize> = VecDeque::new();
    let mut queued: HashSet<usize> = HashSet::new();
    for (v, inc) in incident.iter().enumerate() {
        if inc.len() == 1 {
            leaves.push_back(v);
            queued.insert(v);
        }
    }

    while let Some(v) = leaves.pop_front() {
        queued.remove(&v);
        let Some(&e) = incident[v].iter().next() else {
            continue;
        };
        if incident[v].len() != 1 {
            continue;
        }
        if valid_edge(graph, segments, e, min_width) {
            continue;
        }
        let twin = graph.edges[e].twin;
        let w = graph.edges[e].to;
        active.remove(&e);
        active.remove(&twin);
        incident[v].remove(&e);
        incident[w].remove(&twin);

        if incident[w].len() == 1 && !queued.contains(&w) {
            leaves.push_back(w);
            queued.insert(w);
        }
    }

    active
}

fn valid_edge(graph: &VoronoiGraph, segments: &[Segment], edge_idx: usize, min_width: f64) -> bool {
    let edge = &graph.edges[edge_idx];
    let twin = &graph.edges[edge.twin];
    let (Some(seg_a_idx), Some(seg_b_idx)) = (edge.cell_segment, twin.cell_segment) else {
        return false;
    };
    let seg_a = segments[seg_a_idx];
    let seg_b = segments[seg_b_idx];

    let angle = (seg_b.orientation() - seg_a.orientation()).abs();
    if (angle - std::f64::consts::PI).abs() > std::f64::consts::PI / 5.0 {
        return false;
    }

    let dist_a = point_dist(seg_a.a, seg_b.b);
    let dist_b = point_dist(seg_a.b, seg_b.a);
    !(dist_a < min_width && dist_b < min_width)
}

fn point_dist(a: mrsp_core::geometry::Point, b: mrsp_core::geometry::Point) -> f64 {
    a.distance_to(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrsp_core::geometry::Point;

    fn corridor_graph() -> (VoronoiGraph, Vec<Segment>) {
        // Two parallel facing segments with a single bisector edge between
        // their midpoint-projected vertices: a minimal "valid" case.
        let segments = vec![
            Segment {
                a: Point::new(0, 0),
                b: Point::new(100, 0),
            },
            Segment {
                a: Point::new(100, 20),
                b: Point::new(0, 20),
            },
        ];
        let mut g = VoronoiGraph::default();
        let v0 = g.add_vertex(0.0, 10.0);
        let v1 = g.add_vertex(100.0, 10.0);
        g.add_edge_pair(v0, v1, Some(0), Some(1));
        (g, segments)
    }

    #[test]
    fn facing_segments_survive_pruning() {
        let (g, segs) = corridor_graph();
        let active = prune(&g, &segs, 5.0);
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn too_narrow_region_is_pruned() {
        let segments = vec![
            Segment {
                a: Point::new(0, 0),
                b: Point::new(1, 0),
            },
            Segment {
                a: Point::new(1, 1),
                b: Point::new(0, 1),
            },
        ];
        let mut g = VoronoiGraph::default();
        let v0 = g.add_vertex(0.0, 0.5);
        let v1 = g.add_vertex(1.0, 0.5);
        g.add_edge_pair(v0, v1, Some(0), Some(1));
        let active = prune(&g, &segments, 50.0);
        assert!(active.is_empty());
    }
}
