//! Pipeline driver: source selection and artifact output

use anyhow::Context;
use collabnet_common::config::{AppConfig, OutputConfig};
use collabnet_common::sink::{read_edge_list, OutputSink};
use collabnet_common::{OpenAlexSource, RecordSource, StaticSource};
use collabnet_network::compare::{
    ComparisonConfig, COMPARISON_CSV_HEADER, DEGREE_DISTRIBUTION_HEADER,
};
use collabnet_network::pipeline::generate_null_models;
use collabnet_network::{
    CoauthorGraph, ComparisonTable, IngestOutcome, PipelineConfig, PipelineContext,
    StructuralComparator,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a run produced
#[derive(Debug)]
pub struct RunSummary {
    /// Ingestion outcome; `None` when an edge list was analysed
    pub ingest: Option<IngestOutcome>,
    pub nodes: usize,
    pub edges: usize,
    pub artifacts: Vec<PathBuf>,
}

/// Live API or replay file, per configuration
async fn open_source(config: &AppConfig) -> anyhow::Result<Box<dyn RecordSource>> {
    match &config.source.replay_path {
        Some(path) => {
            info!(path = %path.display(), "Replaying recorded pages");
            let source = StaticSource::from_json_file(path)
                .await
                .with_context(|| format!("Failed to load replay file {}", path.display()))?;
            Ok(Box::new(source))
        }
        None => Ok(Box::new(OpenAlexSource::new(config.source.clone())?)),
    }
}

/// Comparison JSON, comparison CSV and degree distribution CSV
fn write_comparison(
    sink: &OutputSink,
    output: &OutputConfig,
    table: &ComparisonTable,
) -> anyhow::Result<Vec<PathBuf>> {
    Ok(vec![
        sink.json(&output.comparison_json_file, table)?,
        sink.csv(&output.comparison_csv_file, &COMPARISON_CSV_HEADER, table.csv_rows())?,
        sink.csv(
            &output.degree_distribution_file,
            &DEGREE_DISTRIBUTION_HEADER,
            table.degree_distribution_rows(),
        )?,
    ])
}

/// Ingest, build, filter, compare, and write every artifact
pub async fn run(config: &AppConfig) -> anyhow::Result<RunSummary> {
    let sink = OutputSink::create(&config.output.directory)
        .with_context(|| format!("Cannot create {}", config.output.directory.display()))?;

    let mut source = open_source(config).await?;
    let mut context = PipelineContext::new(PipelineConfig::from(config));
    let (_, table) = context
        .run(source.as_mut())
        .await
        .with_context(|| format!("Ingestion from {} failed", source.name()))?;

    let output = &config.output;
    let mut artifacts = vec![
        sink.edge_list(&output.edge_list_file, context.graph.edges())?,
        sink.author_table(&output.author_table_file, context.corpus.authors.author_rows())?,
        sink.work_table(&output.work_table_file, context.corpus.work_rows())?,
    ];
    artifacts.extend(write_comparison(&sink, output, &table)?);

    Ok(RunSummary {
        ingest: Some(context.ingest.clone()),
        nodes: context.graph.node_count(),
        edges: context.graph.edge_count(),
        artifacts,
    })
}

/// Compare a persisted edge list against its null models
pub fn analyze_edge_list(config: &AppConfig, path: &Path) -> anyhow::Result<RunSummary> {
    let sink = OutputSink::create(&config.output.directory)?;
    let file = File::open(path)
        .with_context(|| format!("Failed to open edge list {}", path.display()))?;
    let edges = read_edge_list(BufReader::new(file))?;

    let graph = CoauthorGraph::from_edges(edges);
    info!(nodes = graph.node_count(), edges = graph.edge_count(), "Edge list loaded");

    let models = generate_null_models(&graph, config.analysis.seed);
    let comparator = StructuralComparator::new(ComparisonConfig::from(&config.analysis));
    let table = comparator.compare(&graph, &models.random, &models.lattice, Some(models.seed));

    let artifacts = write_comparison(&sink, &config.output, &table)?;

    Ok(RunSummary {
        ingest: None,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        artifacts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REPLAY: &str = r#"[
        [
            {"title": "W1", "authorships": [
                {"author": {"id": "A1", "display_name": "Ada"}},
                {"author": {"id": "A2", "display_name": "Grace"}}
            ]},
            {"title": "W2", "authorships": [
                {"author": {"display_name": "Grace"}},
                {"author": {"display_name": "Edsger"}},
                {"author": null}
            ]}
        ],
        {"meta": {"next_cursor": null}, "results": [
            {"title": null, "authorships": [
                {"author": {"display_name": "Ada"}},
                {"author": {"display_name": "Grace"}},
                {"author": {"display_name": "Edsger"}}
            ]}
        ]}
    ]"#;

    fn test_config(dir: &Path) -> AppConfig {
        let replay = dir.join("replay.json");
        let mut file = std::fs::File::create(&replay).unwrap();
        file.write_all(REPLAY.as_bytes()).unwrap();

        let mut config = AppConfig::default();
        config.source.replay_path = Some(replay);
        config.output.directory = dir.join("out");
        config.analysis.seed = Some(1);
        config
    }

    #[tokio::test]
    async fn test_replay_run_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let summary = run(&config).await.unwrap();
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.edges, 3);
        assert_eq!(summary.artifacts.len(), 6);
        assert!(summary.artifacts.iter().all(|p| p.exists()));

        let ingest = summary.ingest.unwrap();
        assert_eq!(ingest.pages, 2);
        assert_eq!(ingest.authorships_skipped, 1);

        let out = dir.path().join("out");
        let edges = std::fs::read_to_string(out.join(&config.output.edge_list_file)).unwrap();
        assert_eq!(edges, "0 1\n0 2\n1 2\n");

        let authors = std::fs::read_to_string(out.join(&config.output.author_table_file)).unwrap();
        let lines: Vec<&str> = authors.lines().collect();
        assert_eq!(lines[0], "author_id,display_name,work_title");
        assert_eq!(lines[1], "0,Ada,W1");
        assert_eq!(lines[2], "0,Ada,N/A");
        assert_eq!(lines.len(), 1 + 7);

        let comparison = std::fs::read_to_string(out.join(&config.output.comparison_csv_file)).unwrap();
        assert!(comparison.starts_with("graph,nodes,edges"));
        assert!(comparison.contains("reference,3,3"));
    }

    #[tokio::test]
    async fn test_missing_replay_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.source.replay_path = Some(dir.path().join("missing.json"));
        config.output.directory = dir.path().join("out");

        assert!(run(&config).await.is_err());
    }

    #[test]
    fn test_analyze_edge_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.edgelist");
        std::fs::write(&path, "0 1\n1 2\n2 0\n2 3\n").unwrap();

        let mut config = AppConfig::default();
        config.output.directory = dir.path().join("out");
        config.analysis.seed = Some(4);

        let summary = analyze_edge_list(&config, &path).unwrap();
        assert!(summary.ingest.is_none());
        assert_eq!(summary.nodes, 4);
        assert_eq!(summary.edges, 4);
        assert_eq!(summary.artifacts.len(), 3);
    }
}
