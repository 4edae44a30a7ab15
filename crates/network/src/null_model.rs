//! Null-model generation
//!
//! Two comparison graphs matched to a reference graph with `n` nodes and `m`
//! edges:
//! - Erdős–Rényi G(n, p) with `p = 2m / (n(n-1))`, so the expected edge
//!   count equals `m`
//! - Ring lattice on `n` nodes where every node links to its `k/2` nearest
//!   neighbors on each side, `k` being the even integer nearest to the
//!   average degree `2m/n`
//!
//! Both refuse degenerate references (`n <= 1` or `m == 0`).

use crate::graph::{CoauthorGraph, NodeId};
use collabnet_common::errors::{AppError, Result};
use collabnet_common::metrics::record_graph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Null-model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullModelKind {
    Random,
    Lattice,
}

impl NullModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            NullModelKind::Random => "random",
            NullModelKind::Lattice => "lattice",
        }
    }
}

/// Parameters a null model was generated with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParameters {
    /// Independent edge probability
    Random { p: f64 },
    /// Ring degree
    Lattice { k: usize },
}

impl ModelParameters {
    pub fn kind(&self) -> NullModelKind {
        match self {
            ModelParameters::Random { .. } => NullModelKind::Random,
            ModelParameters::Lattice { .. } => NullModelKind::Lattice,
        }
    }

    /// Compact rendering, e.g. `p=0.25` or `k=4`
    pub fn describe(&self) -> String {
        match self {
            ModelParameters::Random { p } => format!("p={}", p),
            ModelParameters::Lattice { k } => format!("k={}", k),
        }
    }
}

/// A generated comparison graph tagged with its parameters
#[derive(Debug, Clone)]
pub struct NullModel {
    pub parameters: ModelParameters,
    pub graph: CoauthorGraph,
}

impl NullModel {
    pub fn kind(&self) -> NullModelKind {
        self.parameters.kind()
    }
}

/// Edge probability matching `m` edges on `n` nodes in expectation
pub fn edge_probability(n: usize, m: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let pairs = n as f64 * (n as f64 - 1.0) / 2.0;
    (m as f64 / pairs).min(1.0)
}

/// Even ring degree nearest to the average degree `2m/n`
///
/// Clamped to the largest even value not above `n - 1`.
pub fn lattice_degree(n: usize, m: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let average = 2.0 * m as f64 / n as f64;
    let nearest_even = 2 * (average / 2.0).round() as usize;
    let max_even = (n - 1) & !1;
    nearest_even.min(max_even)
}

/// G(n, p) over nodes `0..n`
///
/// Uses geometric skipping over the lower-triangular pair sequence, so the
/// cost is linear in `n + m` instead of quadratic in `n`.
pub fn gnp_random_graph<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> CoauthorGraph {
    let mut graph = CoauthorGraph::with_nodes(n);

    if p <= 0.0 || n < 2 {
        return graph;
    }

    if p >= 1.0 {
        for a in 0..n as NodeId {
            for b in (a + 1)..n as NodeId {
                graph.add_edge(a, b);
            }
        }
        return graph;
    }

    let n = n as i64;
    let log_q = (-p).ln_1p();
    let mut v: i64 = 1;
    let mut w: i64 = -1;

    while v < n {
        let log_r = (1.0 - rng.gen::<f64>()).ln();
        let skip = (log_r / log_q).floor() as i64;
        w = w.saturating_add(1).saturating_add(skip);

        while w >= v && v < n {
            w -= v;
            v += 1;
        }

        if v < n {
            graph.add_edge(v as NodeId, w as NodeId);
        }
    }

    graph
}

/// Ring lattice over nodes `0..n`, each linked to `k/2` neighbors per side
///
/// `k` must be even and below `n`.
pub fn ring_lattice(n: usize, k: usize) -> CoauthorGraph {
    let mut graph = CoauthorGraph::with_nodes(n);
    let half = k / 2;

    for node in 0..n {
        for offset in 1..=half {
            graph.add_edge(node as NodeId, ((node + offset) % n) as NodeId);
        }
    }

    graph
}

/// Seeded generator for both null models
pub struct NullModelGenerator {
    rng: StdRng,
    seed: u64,
}

impl NullModelGenerator {
    /// Create a generator; a fresh seed is drawn when none is given
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        debug!(seed, "Null-model generator seeded");

        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed in use, for reproducing a run
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn check_reference(reference: &CoauthorGraph) -> Result<(usize, usize)> {
        let (n, m) = (reference.node_count(), reference.edge_count());
        if reference.is_degenerate() {
            return Err(AppError::DegenerateGraph { nodes: n, edges: m });
        }
        Ok((n, m))
    }

    /// Erdős–Rényi graph matched on node and expected edge count
    pub fn random(&mut self, reference: &CoauthorGraph) -> Result<NullModel> {
        let (n, m) = Self::check_reference(reference)?;
        let p = edge_probability(n, m);
        let graph = gnp_random_graph(n, p, &mut self.rng);

        record_graph(NullModelKind::Random.label(), graph.node_count(), graph.edge_count());
        info!(nodes = n, p, edges = graph.edge_count(), "Random null model generated");

        Ok(NullModel {
            parameters: ModelParameters::Random { p },
            graph,
        })
    }

    /// Ring lattice matched on node count and average degree
    pub fn lattice(&self, reference: &CoauthorGraph) -> Result<NullModel> {
        let (n, m) = Self::check_reference(reference)?;
        let k = lattice_degree(n, m);
        let graph = ring_lattice(n, k);

        record_graph(NullModelKind::Lattice.label(), graph.node_count(), graph.edge_count());
        info!(nodes = n, k, edges = graph.edge_count(), "Lattice null model generated");

        Ok(NullModel {
            parameters: ModelParameters::Lattice { k },
            graph,
        })
    }
}
