//! Global clustering coefficient (transitivity)

use super::{Metric, UndefinedReason};
use crate::graph::CoauthorGraph;

/// Number of triangles, each counted once
pub fn triangle_count(graph: &CoauthorGraph) -> usize {
    let mut triangles = 0;

    for (u, v) in graph.edges() {
        // u < v; count common neighbors above v so each triangle is seen once
        triangles += graph
            .neighbors(v)
            .filter(|&w| w > v && graph.contains_edge(u, w))
            .count();
    }

    triangles
}

/// Connected triplets, `Σ d(d-1)/2` over all nodes
pub fn triplet_count(graph: &CoauthorGraph) -> usize {
    graph
        .degrees()
        .map(|(_, d)| d * d.saturating_sub(1) / 2)
        .sum()
}

/// Ratio of closed triplets to all connected triplets
///
/// Undefined for a degenerate graph. A graph with edges but no connected
/// triplet (a perfect matching) has transitivity 0.
pub fn transitivity(graph: &CoauthorGraph) -> Metric<f64> {
    if graph.is_degenerate() {
        return Metric::undefined(UndefinedReason::DegenerateGraph);
    }

    let triplets = triplet_count(graph);
    if triplets == 0 {
        return Metric::defined(0.0);
    }

    Metric::defined(3.0 * triangle_count(graph) as f64 / triplets as f64)
}
