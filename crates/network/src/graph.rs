//! Undirected co-authorship graph
//!
//! Simple graph over author IDs: no self-loops, no parallel edges. Adjacency
//! is kept in ordered maps so node and edge iteration is deterministic, which
//! the edge-list writer and the seeded null models rely on.

use crate::registry::AuthorId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ops::Bound;

/// Node identifier; author IDs for built graphs, `0..n` for null models
pub type NodeId = AuthorId;

/// Undirected simple graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoauthorGraph {
    /// Adjacency: node -> neighbors
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// Number of undirected edges
    edge_count: usize,
}

/// Connected component summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSummary {
    /// Number of connected components
    pub count: usize,

    /// Node count of the largest component
    pub largest: usize,
}

impl CoauthorGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph with nodes `0..n` and no edges
    pub fn with_nodes(n: usize) -> Self {
        let mut graph = Self::new();
        for node in 0..n as NodeId {
            graph.add_node(node);
        }
        graph
    }

    /// Build from an edge list; self-loops and repeats are dropped
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    /// Add a node; returns false if it already existed
    pub fn add_node(&mut self, node: NodeId) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, BTreeSet::new());
        true
    }

    /// Add an undirected edge, creating both endpoints
    ///
    /// Returns true only when a new edge was created. A self-loop creates
    /// the node but no edge.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            self.add_node(a);
            return false;
        }

        let inserted = self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);

        if inserted {
            self.edge_count += 1;
        }
        inserted
    }

    /// Remove a node and its incident edges; returns the edges removed
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let Some(neighbors) = self.adjacency.remove(&node) else {
            return 0;
        };

        for neighbor in &neighbors {
            if let Some(adjacent) = self.adjacency.get_mut(neighbor) {
                adjacent.remove(&node);
            }
        }

        self.edge_count -= neighbors.len();
        neighbors.len()
    }

    /// Remove every node in `nodes`; returns the edges removed
    pub fn remove_nodes<'a, I>(&mut self, nodes: I) -> usize
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        nodes.into_iter().map(|&node| self.remove_node(node)).sum()
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency
            .get(&a)
            .map(|neighbors| neighbors.contains(&b))
            .unwrap_or(false)
    }

    /// Degree of a node; 0 for unknown nodes
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map(|n| n.len()).unwrap_or(0)
    }

    /// Neighbors of a node in ascending order
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|neighbors| neighbors.iter().copied())
    }

    /// All nodes in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// All edges as `(a, b)` with `a < b`, in ascending order
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency.iter().flat_map(|(&a, neighbors)| {
            neighbors
                .range((Bound::Excluded(a), Bound::Unbounded))
                .map(move |&b| (a, b))
        })
    }

    /// `(node, degree)` pairs in node order
    pub fn degrees(&self) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.adjacency.iter().map(|(&node, n)| (node, n.len()))
    }

    /// Degrees in node order
    pub fn degree_sequence(&self) -> Vec<usize> {
        self.adjacency.values().map(|n| n.len()).collect()
    }

    /// Mean degree, `2m / n`; 0 for an empty graph
    pub fn average_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        2.0 * self.edge_count as f64 / self.adjacency.len() as f64
    }

    /// Fewer than 2 nodes or no edges
    pub fn is_degenerate(&self) -> bool {
        self.node_count() < 2 || self.edge_count == 0
    }

    /// Nodes reachable from `start`, including itself
    fn component_of(&self, start: NodeId, visited: &mut BTreeSet<NodeId>) -> usize {
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        let mut size = 0;

        while let Some(current) = queue.pop_front() {
            size += 1;
            for neighbor in self.neighbors(current) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        size
    }

    /// Count connected components and the size of the largest
    pub fn components(&self) -> ComponentSummary {
        let mut visited = BTreeSet::new();
        let mut summary = ComponentSummary { count: 0, largest: 0 };

        for node in self.nodes() {
            if visited.contains(&node) {
                continue;
            }
            let size = self.component_of(node, &mut visited);
            summary.count += 1;
            summary.largest = summary.largest.max(size);
        }

        summary
    }

    /// True for a non-empty graph with a single component
    pub fn is_connected(&self) -> bool {
        match self.nodes().next() {
            Some(start) => {
                let mut visited = BTreeSet::new();
                self.component_of(start, &mut visited) == self.node_count()
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_tail() -> CoauthorGraph {
        CoauthorGraph::from_edges(vec![(0, 1), (1, 2), (0, 2), (2, 3)])
    }

    #[test]
    fn test_add_edge_is_idempotent() {
        let mut graph = CoauthorGraph::new();
        assert!(graph.add_edge(1, 2));
        assert!(!graph.add_edge(2, 1));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(1), 1);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut graph = CoauthorGraph::new();
        assert!(!graph.add_edge(7, 7));
        assert!(graph.contains_node(7));
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.degree(7), 0);
    }

    #[test]
    fn test_edges_are_ordered_pairs() {
        let graph = CoauthorGraph::from_edges(vec![(5, 1), (3, 1), (5, 3)]);
        let edges: Vec<_> = graph.edges().collect();
        assert_eq!(edges, vec![(1, 3), (1, 5), (3, 5)]);
    }

    #[test]
    fn test_edges_at_id_ceiling() {
        let edges = collabnet_common::sink::read_edge_list("18446744073709551615 0\n".as_bytes()).unwrap();
        let graph = CoauthorGraph::from_edges(edges);

        let listed: Vec<_> = graph.edges().collect();
        assert_eq!(listed, vec![(0, u64::MAX)]);
        assert_eq!(graph.degree(u64::MAX), 1);
    }

    #[test]
    fn test_remove_node() {
        let mut graph = triangle_with_tail();
        let removed = graph.remove_node(2);

        assert_eq!(removed, 3);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.degree(3), 0);
        assert!(!graph.contains_edge(0, 2));
        assert_eq!(graph.remove_node(42), 0);
    }

    #[test]
    fn test_degree_sequence_and_average() {
        let graph = triangle_with_tail();
        assert_eq!(graph.degree_sequence(), vec![2, 2, 3, 1]);
        assert!((graph.average_degree() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_components() {
        let mut graph = triangle_with_tail();
        assert!(graph.is_connected());

        graph.add_edge(10, 11);
        graph.add_node(20);

        let summary = graph.components();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.largest, 4);
        assert!(!graph.is_connected());
    }

    #[test]
    fn test_degenerate() {
        assert!(CoauthorGraph::new().is_degenerate());
        assert!(CoauthorGraph::with_nodes(5).is_degenerate());
        assert!(!triangle_with_tail().is_degenerate());
        assert!(!CoauthorGraph::new().is_connected());
    }
}
