//! Walks the pruned graph into open polylines, breaking at bifurcations
//! (spec.md §4.3 step 5), grounded in
//! `original_source/multi/medialaxis.cpp`'s `process_neighbors`.

use crate::graph::VoronoiGraph;
use std::collections::HashSet;

/// Consumes `active` (the surviving half-edge set from [`crate::prune::prune`])
/// and returns one polyline per maximal edge-disjoint chain between
/// bifurcations/leaves.
pub fn walk(graph: &VoronoiGraph, mut active: HashSet<usize>) -> Vec<Vec<(f64, f64)>> {
    let mut incident: Vec<HashSet<usize>> = vec![HashSet::new(); graph.vertices.len()];
    for &e in &active {
        incident[graph.edges[e].from].insert(e);
    }

    let mut polylines = Vec::new();
    while let Some(&start) = active.iter().next() {
        let edge = graph.edges[start];
        active.remove(&start);
        active.remove(&edge.twin);
        incident[edge.from].remove(&start);
        incident[edge.to].remove(&edge.twin);

        let mut forward = vec![graph.point_of(edge.from), graph.point_of(edge.to)];
        extend_chain(graph, &mut active, &mut incident, edge.to, &mut forward);

        let mut backward = Vec::new();
        extend_chain(graph, &mut active, &mut incident, edge.from, &mut backward);
        backward.reverse();

        let mut full = backward;
        full.extend(forward);
        polylines.push(full);
    }
    polylines
}

/// Appends vertices to `points` while the chain from `from` has exactly one
/// remaining neighbor (i.e. no bifurcation yet), consuming those edges.
fn extend_chain(
    graph: &VoronoiGraph,
    active: &mut HashSet<usize>,
    incident: &mut [HashSet<usize>],
    mut from: usize,
    points: &mut Vec<(f64, f64)>,
) {
    loop {
        let neighbors: Vec<usize> = incident[from].iter().copied().collect();
        if neighbors.len() != 1 {
            return;
        }
        let next_edge_idx = neighbors[0];
        let next_edge = graph.edges[next_edge_idx];
        active.remove(&next_edge_idx);
        active.remove(&next_edge.twin);
        incident[next_edge.from].remove(&next_edge_idx);
        incident[next_edge.to].remove(&next_edge.twin);

        points.push(graph.point_of(next_edge.to));
        from = next_edge.to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chain_walks_to_one_polyline() {
        let mut g = VoronoiGraph::default();
        let v0 = g.add_vertex(0.0, 0.0);
        let v1 = g.add_vertex(10.0, 0.0);
        let v2 = g.add_vertex(20.0, 0.0);
        g.add_edge_pair(v0, v1, None, None);
        g.add_edge_pair(v1, v2, None, None);
        let active: HashSet<usize> = (0..g.edges.len()).collect();
        let lines = walk(&g, active);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 3);
    }

    #[test]
    fn bifurcation_splits_into_three_polylines() {
        let mut g = VoronoiGraph::default();
        let center = g.add_vertex(0.0, 0.0);
        let a = g.add_vertex(10.0, 0.0);
        let b = g.add_vertex(-10.0, 0.0);
        let c = g.add_vertex(0.0, 10.0);
        g.add_edge_pair(center, a, None, None);
        g.add_edge_pair(center, b, None, None);
        g.add_edge_pair(center, c, None, None);
        let active: HashSet<usize> = (0..g.edges.len()).collect();
        let lines = walk(&g, active);
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.len(), 2);
        }
    }
}
