//! A plain graph representation of a Voronoi diagram's primary, finite
//! edges, independent of the backing kernel (spec.md §4.3 steps 2–5).
//!
//! Kept deliberately decoupled from `boostvoronoi`'s own types so the
//! pruning/walking logic (grounded in `original_source/multi/medialaxis.cpp`'s
//! `buildMedialAxis`/`process_neighbors`/`valid_edge`) can be unit-tested
//! against a hand-built graph without constructing a real diagram.

use mrsp_core::geometry::Point;

/// One parent input segment of the polygon boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub fn orientation(&self) -> f64 {
        let (ax, ay) = self.a.as_f64();
        let (bx, by) = self.b.as_f64();
        (by - ay).atan2(bx - ax)
    }
}

/// One directed half-edge of the Voronoi diagram. `twin` is the paired
/// half-edge running the opposite direction along the same bisector.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub twin: usize,
    /// Index of the input `Segment` whose cell this half-edge bounds, when
    /// the cell is segment-generated (always true for a polygon-boundary
    /// Voronoi diagram with no isolated point sites).
    pub cell_segment: Option<usize>,
}

/// A Voronoi diagram reduced to the vertices/edges the medial-axis pruning
/// pass needs: already filtered to primary, finite edges (spec.md §4.3 step 3).
#[derive(Debug, Clone, Default)]
pub struct VoronoiGraph {
    pub vertices: Vec<(f64, f64)>,
    pub edges: Vec<Edge>,
}

impl VoronoiGraph {
    pub fn add_vertex(&mut self, x: f64, y: f64) -> usize {
        self.vertices.push((x, y));
        self.vertices.len() - 1
    }

    /// Adds a pair of twin half-edges between `from` and `to`, returning the
    /// index of the forward half-edge.
    pub fn add_edge_pair(
        &mut self,
        from: usize,
        to: usize,
        cell_segment_forward: Option<usize>,
        cell_segment_backward: Option<usize>,
    ) -> usize {
        let fwd_idx = self.edges.len();
        let bwd_idx = fwd_idx + 1;
        self.edges.push(Edge {
            from,
            to,
            twin: bwd_idx,
            cell_segment: cell_segment_forward,
        });
        self.edges.push(Edge {
            from: to,
            to: from,
            twin: fwd_idx,
            cell_segment: cell_segment_backward,
        });
        fwd_idx
    }

    pub fn point_of(&self, vertex: usize) -> (f64, f64) {
        self.vertices[vertex]
    }
}
