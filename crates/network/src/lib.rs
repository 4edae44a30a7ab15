//! CollabNet Network Library
//!
//! Builds a co-authorship network from paginated bibliographic records and
//! compares its structure against null models:
//! - Author registry and work index (display-name deduplication)
//! - Bounded ingestion over a record source
//! - Clique expansion into an undirected graph
//! - Degree artifact filtering
//! - Random and ring-lattice null models
//! - Degree distribution, transitivity, path length and power-law statistics

pub mod builder;
pub mod compare;
pub mod filter;
pub mod graph;
pub mod ingest;
pub mod null_model;
pub mod pipeline;
pub mod registry;
pub mod stats;

pub use builder::{BuilderConfig, GraphBuilder};
pub use compare::{ComparisonRow, ComparisonTable, GraphLabel, StructuralComparator};
pub use filter::{DegreeArtifactFilter, FilterReport};
pub use graph::{CoauthorGraph, NodeId};
pub use ingest::{ingest, IngestBounds, IngestOutcome, StopReason};
pub use null_model::{ModelParameters, NullModel, NullModelGenerator, NullModelKind};
pub use pipeline::{PipelineConfig, PipelineContext};
pub use registry::{AuthorId, AuthorIdentity, AuthorRegistry, Corpus, WorkIndex, WorkRecord};
pub use stats::{Metric, UndefinedReason};
