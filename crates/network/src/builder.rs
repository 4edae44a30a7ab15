//! Clique expansion of the work index into a co-authorship graph

use crate::graph::CoauthorGraph;
use crate::registry::{WorkIndex, WorkRecord};
use collabnet_common::config::GraphConfig;
use collabnet_common::metrics::{record_edges_built, record_graph};
use tracing::{info, instrument};

/// Graph builder configuration
#[derive(Debug, Clone, Copy)]
pub struct BuilderConfig {
    /// Register every listed author as a node, even without co-authors
    pub isolated_authors: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            isolated_authors: true,
        }
    }
}

impl From<&GraphConfig> for BuilderConfig {
    fn from(config: &GraphConfig) -> Self {
        Self {
            isolated_authors: config.isolated_authors,
        }
    }
}

/// Accumulates work cliques into one undirected graph
///
/// The resulting edge set is the union of every work's clique and does not
/// depend on the order the works are added in.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    config: BuilderConfig,
    graph: CoauthorGraph,
    edges_created: usize,
}

impl GraphBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            graph: CoauthorGraph::new(),
            edges_created: 0,
        }
    }

    /// Add the clique of one work; returns the number of new edges
    pub fn add_work(&mut self, work: &WorkRecord) -> usize {
        let authors = work.author_ids();

        if self.config.isolated_authors {
            for &author in authors {
                self.graph.add_node(author);
            }
        }

        let mut created = 0;
        for (i, &a) in authors.iter().enumerate() {
            for &b in &authors[i + 1..] {
                if self.graph.add_edge(a, b) {
                    created += 1;
                }
            }
        }

        self.edges_created += created;
        created
    }

    /// Add every work of an index
    pub fn add_index(&mut self, index: &WorkIndex) {
        for work in index.iter() {
            self.add_work(work);
        }
    }

    /// Finish building and hand over the graph
    pub fn finish(self) -> CoauthorGraph {
        record_edges_built(self.edges_created);
        record_graph("built", self.graph.node_count(), self.graph.edge_count());
        self.graph
    }

    /// Build the graph of a whole work index
    #[instrument(skip(index), fields(works = index.len()))]
    pub fn build(config: BuilderConfig, index: &WorkIndex) -> CoauthorGraph {
        let mut builder = Self::new(config);
        builder.add_index(index);
        let graph = builder.finish();

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Co-authorship graph built"
        );
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Corpus, WorkTitle};
    use collabnet_common::RawWork;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn build(works: &[RawWork]) -> (Corpus, CoauthorGraph) {
        let mut corpus = Corpus::new();
        for work in works {
            corpus.observe_work(work);
        }
        let graph = GraphBuilder::build(BuilderConfig::default(), &corpus.works);
        (corpus, graph)
    }

    #[test]
    fn test_scenario_a_triangle() {
        let (corpus, graph) = build(&[
            RawWork::new("W1", &["A", "B"]),
            RawWork::new("W2", &["B", "C"]),
            RawWork::new("W3", &["A", "B", "C"]),
        ]);

        let a = corpus.authors.lookup("A").unwrap();
        let b = corpus.authors.lookup("B").unwrap();
        let c = corpus.authors.lookup("C").unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains_edge(a, b));
        assert!(graph.contains_edge(b, c));
        assert!(graph.contains_edge(a, c));
        for node in [a, b, c] {
            assert_eq!(graph.degree(node), 2);
        }
    }

    #[test]
    fn test_scenario_b_duplicate_author() {
        let (corpus, graph) = build(&[RawWork::new("W", &["X", "X"])]);

        let x = corpus.authors.lookup("X").unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.degree(x), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_isolated_authors_can_be_dropped() {
        let mut corpus = Corpus::new();
        corpus.observe_work(&RawWork::new("Solo", &["X"]));
        corpus.observe_work(&RawWork::new("Pair", &["A", "B"]));

        let config = BuilderConfig {
            isolated_authors: false,
        };
        let graph = GraphBuilder::build(config, &corpus.works);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_clique_completeness() {
        let names = ["A", "B", "C", "D", "E", "F"];
        let (_, graph) = build(&[RawWork::new("Big", &names)]);

        assert_eq!(graph.edge_count(), names.len() * (names.len() - 1) / 2);
        for a in 0..names.len() as u64 {
            for b in (a + 1)..names.len() as u64 {
                assert!(graph.contains_edge(a, b));
            }
        }
    }

    #[test]
    fn test_edge_set_is_order_independent() {
        let records: Vec<WorkRecord> = vec![
            WorkRecord::with_authors(WorkTitle::new("W1"), [0, 1, 2]),
            WorkRecord::with_authors(WorkTitle::new("W2"), [2, 3]),
            WorkRecord::with_authors(WorkTitle::new("W3"), [3, 4, 0, 3]),
            WorkRecord::with_authors(WorkTitle::new("W4"), [5]),
            WorkRecord::with_authors(WorkTitle::new("W5"), [1, 2]),
        ];

        let edge_set = |works: &[WorkRecord]| -> BTreeSet<(u64, u64)> {
            let mut builder = GraphBuilder::new(BuilderConfig::default());
            for work in works {
                builder.add_work(work);
            }
            builder.finish().edges().collect()
        };

        let expected = edge_set(&records);
        let mut rng = StdRng::seed_from_u64(17);
        let mut shuffled = records.clone();
        for _ in 0..25 {
            shuffled.shuffle(&mut rng);
            assert_eq!(edge_set(&shuffled), expected);
        }
    }

    #[test]
    fn test_no_self_loops_in_random_inputs() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool: Vec<u64> = (0..8).collect();

        let mut builder = GraphBuilder::new(BuilderConfig::default());
        for i in 0..40 {
            let mut authors: Vec<u64> = pool
                .choose_multiple(&mut rng, 1 + i % 5)
                .copied()
                .collect();
            // Repeat an author to exercise duplicate listings
            authors.push(authors[0]);
            builder.add_work(&WorkRecord::with_authors(
                WorkTitle::new(format!("W{}", i)),
                authors,
            ));
        }

        let graph = builder.finish();
        for (a, b) in graph.edges() {
            assert_ne!(a, b);
        }
        for node in graph.nodes() {
            assert!(!graph.contains_edge(node, node));
        }
    }
}
