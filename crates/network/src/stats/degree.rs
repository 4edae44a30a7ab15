//! Degree distribution
//!
//! Derived read-only from a graph snapshot; recompute it after the graph
//! changes.

use crate::graph::CoauthorGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from degree to the number of nodes with that degree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeDistribution {
    counts: BTreeMap<usize, usize>,
}

impl DegreeDistribution {
    pub fn from_graph(graph: &CoauthorGraph) -> Self {
        Self::from_sequence(graph.degrees().map(|(_, degree)| degree))
    }

    pub fn from_sequence<I: IntoIterator<Item = usize>>(degrees: I) -> Self {
        let mut counts = BTreeMap::new();
        for degree in degrees {
            *counts.entry(degree).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Nodes with exactly `degree`
    pub fn count(&self, degree: usize) -> usize {
        self.counts.get(&degree).copied().unwrap_or(0)
    }

    /// `(degree, count)` pairs in ascending degree order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&degree, &count)| (degree, count))
    }

    pub fn total_nodes(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn max_degree(&self) -> Option<usize> {
        self.counts.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Mean degree; `None` when empty
    pub fn mean(&self) -> Option<f64> {
        let total = self.total_nodes();
        if total == 0 {
            return None;
        }
        let sum: usize = self.iter().map(|(degree, count)| degree * count).sum();
        Some(sum as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_from_graph() {
        let mut graph = CoauthorGraph::from_edges(vec![(0, 1), (1, 2), (0, 2), (2, 3)]);
        graph.add_node(9);

        let distribution = DegreeDistribution::from_graph(&graph);
        assert_eq!(distribution.count(0), 1);
        assert_eq!(distribution.count(1), 1);
        assert_eq!(distribution.count(2), 2);
        assert_eq!(distribution.count(3), 1);
        assert_eq!(distribution.total_nodes(), 5);
        assert_eq!(distribution.max_degree(), Some(3));
        assert!((distribution.mean().unwrap() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn test_empty_distribution() {
        let distribution = DegreeDistribution::from_graph(&CoauthorGraph::new());
        assert!(distribution.is_empty());
        assert_eq!(distribution.mean(), None);
        assert_eq!(distribution.max_degree(), None);
    }

    #[test]
    fn test_recomputed_after_change() {
        let mut graph = CoauthorGraph::from_edges(vec![(0, 1), (0, 2)]);
        let before = DegreeDistribution::from_graph(&graph);
        graph.remove_node(0);
        let after = DegreeDistribution::from_graph(&graph);

        assert_eq!(before.count(2), 1);
        assert_eq!(after.count(0), 2);
        assert_ne!(before, after);
    }
}
