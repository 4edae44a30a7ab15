//! Degree artifact filter
//!
//! Authors whose co-author listing was cut at a page boundary of the record
//! source surface with a degree exactly equal to the page size. This filter
//! drops every node whose degree equals that threshold.
//!
//! It is a heuristic: a genuine author with exactly that many co-authors is
//! dropped as well. The removal set is computed once from a snapshot taken
//! before anything is removed. Nodes whose degree falls to the threshold as
//! a consequence of the removal are kept.

use crate::graph::{CoauthorGraph, NodeId};
use collabnet_common::config::{GraphConfig, DEFAULT_ARTIFACT_DEGREE};
use collabnet_common::metrics::{record_graph, record_nodes_filtered};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// What a filter pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Threshold degree used
    pub threshold: usize,

    /// Removed nodes in ascending order
    pub removed_nodes: Vec<NodeId>,

    /// Edges removed with them
    pub removed_edges: usize,
}

/// Single-pass exact-degree filter
#[derive(Debug, Clone, Copy)]
pub struct DegreeArtifactFilter {
    threshold: usize,
}

impl Default for DegreeArtifactFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_DEGREE)
    }
}

impl From<&GraphConfig> for DegreeArtifactFilter {
    fn from(config: &GraphConfig) -> Self {
        Self::new(config.artifact_degree)
    }
}

impl DegreeArtifactFilter {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Nodes whose current degree equals the threshold
    pub fn candidates(&self, graph: &CoauthorGraph) -> Vec<NodeId> {
        graph
            .degrees()
            .filter(|&(_, degree)| degree == self.threshold)
            .map(|(node, _)| node)
            .collect()
    }

    /// Remove the candidates of the current snapshot in one pass
    #[instrument(skip(self, graph), fields(threshold = self.threshold))]
    pub fn apply(&self, graph: &mut CoauthorGraph) -> FilterReport {
        let removed_nodes = self.candidates(graph);
        let removed_edges = graph.remove_nodes(&removed_nodes);

        record_nodes_filtered(removed_nodes.len());
        record_graph("filtered", graph.node_count(), graph.edge_count());

        info!(
            removed_nodes = removed_nodes.len(),
            removed_edges,
            remaining_nodes = graph.node_count(),
            "Degree artifact filter applied"
        );

        FilterReport {
            threshold: self.threshold,
            removed_nodes,
            removed_edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Star with `leaves` leaves around `center`, leaves numbered from `first`
    fn add_star(graph: &mut CoauthorGraph, center: NodeId, first: NodeId, leaves: u64) {
        for leaf in first..first + leaves {
            graph.add_edge(center, leaf);
        }
    }

    #[test]
    fn test_scenario_c_single_artifact_node() {
        let mut graph = CoauthorGraph::new();
        // Node 0 has degree 100; leaves 1..=100
        add_star(&mut graph, 0, 1, 100);
        // A few extra edges among the leaves
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(3, 4);

        let before: Vec<usize> = (1..=4).map(|n| graph.degree(n)).collect();
        let report = DegreeArtifactFilter::new(100).apply(&mut graph);

        assert_eq!(report.removed_nodes, vec![0]);
        assert_eq!(report.removed_edges, 100);
        assert!(!graph.contains_node(0));
        assert_eq!(graph.node_count(), 100);
        for (offset, node) in (1..=4).enumerate() {
            assert_eq!(graph.degree(node), before[offset] - 1);
        }
    }

    #[test]
    fn test_single_pass_does_not_refilter() {
        // Node 0 sits at the threshold. Node 1 is one above it and adjacent
        // to node 0, so it reaches the threshold only after the removal.
        let mut graph = CoauthorGraph::new();
        add_star(&mut graph, 0, 1000, 2);
        add_star(&mut graph, 1, 2000, 3);
        graph.add_edge(0, 1);
        assert_eq!(graph.degree(0), 3);
        assert_eq!(graph.degree(1), 4);

        let report = DegreeArtifactFilter::new(3).apply(&mut graph);

        assert_eq!(report.removed_nodes, vec![0]);
        assert_eq!(graph.degree(1), 3);
        assert!(graph.contains_node(1));
    }

    #[test]
    fn test_no_match_leaves_graph_untouched() {
        let mut graph = CoauthorGraph::from_edges(vec![(0, 1), (1, 2)]);
        let snapshot = graph.clone();

        let report = DegreeArtifactFilter::new(100).apply(&mut graph);
        assert!(report.removed_nodes.is_empty());
        assert_eq!(graph, snapshot);
    }

    #[test]
    fn test_zero_threshold_drops_isolated_nodes() {
        let mut graph = CoauthorGraph::from_edges(vec![(0, 1)]);
        graph.add_node(9);

        let report = DegreeArtifactFilter::new(0).apply(&mut graph);
        assert_eq!(report.removed_nodes, vec![9]);
        assert_eq!(report.removed_edges, 0);
    }

    #[test]
    fn test_removed_nodes_had_threshold_degree() {
        let mut graph = CoauthorGraph::new();
        add_star(&mut graph, 0, 10, 2);
        add_star(&mut graph, 1, 20, 2);
        add_star(&mut graph, 2, 30, 5);
        let snapshot = graph.clone();

        let report = DegreeArtifactFilter::new(2).apply(&mut graph);
        for node in &report.removed_nodes {
            assert_eq!(snapshot.degree(*node), 2);
        }
        for node in graph.nodes() {
            assert_ne!(snapshot.degree(node), 2);
        }
    }
}
