//! Average shortest-path length
//!
//! Only defined for connected graphs. A disconnected graph is reported as
//! such; the value is never computed over a single component.

use super::{Metric, UndefinedReason};
use crate::graph::{CoauthorGraph, NodeId};
use std::collections::{HashMap, VecDeque};

/// Mean hop distance over all ordered node pairs
///
/// Runs one BFS per node on a dense copy of the adjacency, so it is
/// quadratic in the node count.
pub fn average_shortest_path_length(graph: &CoauthorGraph) -> Metric<f64> {
    if graph.is_degenerate() {
        return Metric::undefined(UndefinedReason::DegenerateGraph);
    }
    if !graph.is_connected() {
        return Metric::undefined(UndefinedReason::DisconnectedGraph);
    }

    let index: HashMap<NodeId, usize> = graph
        .nodes()
        .enumerate()
        .map(|(i, node)| (node, i))
        .collect();
    let adjacency: Vec<Vec<usize>> = graph
        .nodes()
        .map(|node| graph.neighbors(node).map(|n| index[&n]).collect())
        .collect();

    let n = adjacency.len();
    let mut distance = vec![usize::MAX; n];
    let mut queue = VecDeque::with_capacity(n);
    let mut total: u64 = 0;

    for source in 0..n {
        distance.fill(usize::MAX);
        distance[source] = 0;
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            let next = distance[current] + 1;
            for &neighbor in &adjacency[current] {
                if distance[neighbor] == usize::MAX {
                    distance[neighbor] = next;
                    total += next as u64;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    let pairs = n as f64 * (n as f64 - 1.0);
    Metric::defined(total as f64 / pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_graph() {
        // 0-1-2: distances 1, 2, 1 each way
        let graph = CoauthorGraph::from_edges(vec![(0, 1), (1, 2)]);
        let value = *average_shortest_path_length(&graph).value().unwrap();
        assert!((value - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_complete_graph() {
        let graph = CoauthorGraph::from_edges(vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(average_shortest_path_length(&graph), Metric::defined(1.0));
    }

    #[test]
    fn test_sparse_ids() {
        let graph = CoauthorGraph::from_edges(vec![(10, 500), (500, 9000)]);
        let value = *average_shortest_path_length(&graph).value().unwrap();
        assert!((value - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_disconnected_is_undefined() {
        let graph = CoauthorGraph::from_edges(vec![(0, 1), (2, 3)]);
        assert_eq!(
            average_shortest_path_length(&graph),
            Metric::undefined(UndefinedReason::DisconnectedGraph)
        );
    }

    #[test]
    fn test_isolated_node_disconnects() {
        let mut graph = CoauthorGraph::from_edges(vec![(0, 1)]);
        graph.add_node(2);
        assert_eq!(
            average_shortest_path_length(&graph).reason(),
            Some(UndefinedReason::DisconnectedGraph)
        );
    }

    #[test]
    fn test_degenerate_is_undefined() {
        assert_eq!(
            average_shortest_path_length(&CoauthorGraph::with_nodes(1)).reason(),
            Some(UndefinedReason::DegenerateGraph)
        );
        assert_eq!(
            average_shortest_path_length(&CoauthorGraph::with_nodes(3)).reason(),
            Some(UndefinedReason::DegenerateGraph)
        );
    }
}
