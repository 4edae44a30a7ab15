//! Metrics and observability utilities
//!
//! Provides Prometheus-style metrics with standardized naming conventions
//! for the ingestion and analysis stages.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all CollabNet metrics
pub const METRICS_PREFIX: &str = "collabnet";

/// Buckets for record source page latency (in seconds)
pub const PAGE_FETCH_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
];

/// Name of the record source page latency histogram
pub fn page_fetch_metric() -> String {
    format!("{}_page_fetch_duration_seconds", METRICS_PREFIX)
}

/// Register all metric descriptions
pub fn register_metrics() {
    // Record source metrics
    describe_counter!(
        format!("{}_pages_fetched_total", METRICS_PREFIX),
        Unit::Count,
        "Total pages fetched from the record source"
    );

    describe_histogram!(
        page_fetch_metric(),
        Unit::Seconds,
        "Record source page latency in seconds"
    );

    describe_counter!(
        format!("{}_source_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total failed record source requests"
    );

    // Ingestion metrics
    describe_counter!(
        format!("{}_works_ingested_total", METRICS_PREFIX),
        Unit::Count,
        "Total works ingested"
    );

    describe_counter!(
        format!("{}_authorships_skipped_total", METRICS_PREFIX),
        Unit::Count,
        "Authorship entries skipped for missing author data"
    );

    describe_counter!(
        format!("{}_authors_registered_total", METRICS_PREFIX),
        Unit::Count,
        "Distinct author identities registered"
    );

    // Graph metrics
    describe_counter!(
        format!("{}_edges_built_total", METRICS_PREFIX),
        Unit::Count,
        "Co-authorship edges created"
    );

    describe_counter!(
        format!("{}_nodes_filtered_total", METRICS_PREFIX),
        Unit::Count,
        "Nodes removed by the degree artifact filter"
    );

    describe_gauge!(
        format!("{}_graph_nodes", METRICS_PREFIX),
        Unit::Count,
        "Node count per graph"
    );

    describe_gauge!(
        format!("{}_graph_edges", METRICS_PREFIX),
        Unit::Count,
        "Edge count per graph"
    );

    // Stage metrics
    describe_histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Pipeline stage latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to time one pipeline stage
pub struct StageTimer {
    start: Instant,
    stage: &'static str,
}

impl StageTimer {
    /// Start timing a stage
    pub fn start(stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    /// Record stage completion, returning the elapsed seconds
    pub fn finish(self) -> f64 {
        let duration = self.start.elapsed().as_secs_f64();

        histogram!(
            format!("{}_stage_duration_seconds", METRICS_PREFIX),
            "stage" => self.stage
        )
        .record(duration);

        duration
    }
}

/// Helper to record a fetched page
pub fn record_page(duration_secs: f64, works: usize, success: bool) {
    if success {
        counter!(format!("{}_pages_fetched_total", METRICS_PREFIX)).increment(1);

        histogram!(page_fetch_metric()).record(duration_secs);

        tracing::trace!(works, duration_secs, "Page fetched");
    } else {
        counter!(format!("{}_source_errors_total", METRICS_PREFIX)).increment(1);
    }
}

/// Helper to record ingestion progress for one page
pub fn record_ingestion(works: usize, skipped_authorships: usize, new_authors: usize) {
    counter!(format!("{}_works_ingested_total", METRICS_PREFIX)).increment(works as u64);

    counter!(format!("{}_authorships_skipped_total", METRICS_PREFIX))
        .increment(skipped_authorships as u64);

    counter!(format!("{}_authors_registered_total", METRICS_PREFIX))
        .increment(new_authors as u64);
}

/// Helper to record graph size
pub fn record_graph(label: &str, nodes: usize, edges: usize) {
    gauge!(
        format!("{}_graph_nodes", METRICS_PREFIX),
        "graph" => label.to_string()
    )
    .set(nodes as f64);

    gauge!(
        format!("{}_graph_edges", METRICS_PREFIX),
        "graph" => label.to_string()
    )
    .set(edges as f64);
}

/// Helper to record edges created by clique expansion
pub fn record_edges_built(edges: usize) {
    counter!(format!("{}_edges_built_total", METRICS_PREFIX)).increment(edges as u64);
}

/// Helper to record nodes removed by the artifact filter
pub fn record_nodes_filtered(nodes: usize) {
    counter!(format!("{}_nodes_filtered_total", METRICS_PREFIX)).increment(nodes as u64);
}
