//! Pipeline context
//!
//! Owns every piece of accumulated state (registry, work index, graph) and
//! hands it from stage to stage:
//! ingest -> build -> filter -> null models -> compare.
//! Each stage is also callable on its own for tests and partial runs.

use crate::builder::{BuilderConfig, GraphBuilder};
use crate::compare::{ComparisonConfig, ComparisonTable, StructuralComparator};
use crate::filter::{DegreeArtifactFilter, FilterReport};
use crate::graph::CoauthorGraph;
use crate::ingest::{ingest, IngestBounds, IngestOutcome};
use crate::null_model::{NullModel, NullModelGenerator};
use crate::registry::Corpus;
use collabnet_common::config::AppConfig;
use collabnet_common::errors::Result;
use collabnet_common::metrics::StageTimer;
use collabnet_common::source::RecordSource;
use tracing::info;

/// Settings for every stage
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub bounds: IngestBounds,
    pub builder: BuilderConfig,

    /// `None` disables the artifact filter
    pub filter: Option<DegreeArtifactFilter>,

    pub comparison: ComparisonConfig,
    pub seed: Option<u64>,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            bounds: IngestBounds::from(&config.ingestion),
            builder: BuilderConfig::from(&config.graph),
            filter: config
                .graph
                .filter_enabled
                .then(|| DegreeArtifactFilter::from(&config.graph)),
            comparison: ComparisonConfig::from(&config.analysis),
            seed: config.analysis.seed,
        }
    }
}

/// Random and lattice models of one reference graph
pub struct NullModels {
    pub seed: u64,
    pub random: Result<NullModel>,
    pub lattice: Result<NullModel>,
}

/// Generate both null models for `reference`
pub fn generate_null_models(reference: &CoauthorGraph, seed: Option<u64>) -> NullModels {
    let timer = StageTimer::start("null_model");
    let mut generator = NullModelGenerator::new(seed);

    let models = NullModels {
        seed: generator.seed(),
        random: generator.random(reference),
        lattice: generator.lattice(reference),
    };

    timer.finish();
    models
}

/// State accumulated by one pipeline run
pub struct PipelineContext {
    config: PipelineConfig,
    pub corpus: Corpus,
    pub ingest: IngestOutcome,
    pub graph: CoauthorGraph,
    pub filter: Option<FilterReport>,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            corpus: Corpus::new(),
            ingest: IngestOutcome::default(),
            graph: CoauthorGraph::new(),
            filter: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage 1: fill the registry and work index from `source`
    pub async fn ingest<S: RecordSource + ?Sized>(&mut self, source: &mut S) -> Result<&IngestOutcome> {
        self.ingest = ingest(source, &mut self.corpus, self.config.bounds).await?;
        Ok(&self.ingest)
    }

    /// Stage 2: clique-expand the work index
    pub fn build(&mut self) -> &CoauthorGraph {
        let timer = StageTimer::start("build");
        self.graph = GraphBuilder::build(self.config.builder, &self.corpus.works);
        timer.finish();
        &self.graph
    }

    /// Stage 3: drop degree artifacts, if enabled
    pub fn filter(&mut self) -> Option<&FilterReport> {
        let filter = self.config.filter?;

        let timer = StageTimer::start("filter");
        self.filter = Some(filter.apply(&mut self.graph));
        timer.finish();
        self.filter.as_ref()
    }

    /// Stages 4 and 5: null models and structural comparison
    pub fn compare(&self) -> (NullModels, ComparisonTable) {
        let models = generate_null_models(&self.graph, self.config.seed);

        let timer = StageTimer::start("compare");
        let comparator = StructuralComparator::new(self.config.comparison);
        let table = comparator.compare(&self.graph, &models.random, &models.lattice, Some(models.seed));
        timer.finish();

        (models, table)
    }

    /// Run every stage against `source`
    pub async fn run<S: RecordSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<(NullModels, ComparisonTable)> {
        self.ingest(source).await?;
        self.build();
        self.filter();

        info!(
            authors = self.corpus.authors.len(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            bound_reached = self.ingest.bound_reached(),
            "Graph ready for comparison"
        );

        Ok(self.compare())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::GraphLabel;
    use crate::ingest::StopReason;
    use crate::stats::UndefinedReason;
    use collabnet_common::{RawWork, StaticSource};

    fn config() -> PipelineConfig {
        PipelineConfig {
            filter: Some(DegreeArtifactFilter::new(100)),
            seed: Some(42),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_scenario_a_end_to_end() {
        let mut source = StaticSource::new(vec![
            vec![RawWork::new("W1", &["A", "B"]), RawWork::new("W2", &["B", "C"])],
            vec![RawWork::new("W3", &["A", "B", "C"])],
        ]);

        let mut context = PipelineContext::new(config());
        let (models, table) = context.run(&mut source).await.unwrap();

        assert_eq!(context.ingest.stop_reason, StopReason::SourceExhausted);
        assert_eq!(context.graph.node_count(), 3);
        assert_eq!(context.graph.edge_count(), 3);
        assert!(context.graph.degree_sequence().iter().all(|&d| d == 2));
        assert_eq!(context.filter.as_ref().unwrap().removed_nodes.len(), 0);

        assert_eq!(models.seed, 42);
        let reference = table.row(GraphLabel::Reference).unwrap();
        assert_eq!(reference.clustering.value(), Some(&1.0));
        assert_eq!(reference.average_path_length.value(), Some(&1.0));
        assert_eq!(
            reference.power_law.reason(),
            Some(UndefinedReason::InsufficientDataForFit)
        );
    }

    #[tokio::test]
    async fn test_scenario_b_end_to_end() {
        let mut source = StaticSource::new(vec![vec![RawWork::new("W", &["X", "X"])]]);

        let mut context = PipelineContext::new(config());
        let (models, table) = context.run(&mut source).await.unwrap();

        let x = context.corpus.authors.lookup("X").unwrap();
        assert_eq!(context.graph.node_count(), 1);
        assert_eq!(context.graph.degree(x), 0);

        assert!(models.random.is_err());
        assert!(models.lattice.is_err());
        for row in &table.rows {
            assert_eq!(
                row.average_path_length.reason(),
                Some(UndefinedReason::DegenerateGraph)
            );
        }
    }

    #[test]
    fn test_filter_can_be_disabled() {
        let mut app = AppConfig::default();
        app.graph.filter_enabled = false;
        app.analysis.seed = Some(3);

        let config = PipelineConfig::from(&app);
        assert!(config.filter.is_none());
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.bounds.max_authors, Some(40_000));

        let mut context = PipelineContext::new(config);
        assert!(context.filter().is_none());
    }

    #[test]
    fn test_stages_run_independently() {
        let mut context = PipelineContext::new(config());
        context.corpus.observe_work(&RawWork::new("W1", &["A", "B", "C"]));
        context.corpus.observe_work(&RawWork::new("W2", &["C", "D"]));

        let graph = context.build();
        assert_eq!(graph.edge_count(), 4);

        let (models, table) = context.compare();
        assert!(models.random.is_ok());
        assert_eq!(table.rows.len(), 3);
    }
}
