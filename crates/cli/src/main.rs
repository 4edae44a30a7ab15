//! CollabNet command-line driver
//!
//! 1. Loads configuration (file or layered defaults) and applies flags
//! 2. Initializes logging and, optionally, the Prometheus exporter
//! 3. Runs ingestion, graph construction, filtering and comparison
//! 4. Writes every artifact to the output directory

mod args;
mod runner;

use anyhow::Context;
use args::Cli;
use clap::Parser;
use collabnet_common::config::ObservabilityConfig;
use collabnet_common::{metrics, AppConfig, VERSION};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;
use validator::Validate;

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Exporter with the page latency buckets applied
fn prometheus_builder() -> anyhow::Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(metrics::page_fetch_metric()),
            metrics::PAGE_FETCH_BUCKETS,
        )
        .context("Invalid histogram buckets")
}

fn init_metrics(config: &ObservabilityConfig) -> anyhow::Result<()> {
    metrics::register_metrics();

    if config.metrics_port == 0 {
        return Ok(());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    prometheus_builder()?
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(&path.to_string_lossy()),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.observability);
    info!(
        service = %config.observability.service_name,
        "Starting CollabNet v{}", VERSION
    );

    init_metrics(&config.observability)?;

    let summary = match &cli.edge_list {
        Some(path) => runner::analyze_edge_list(&config, path)?,
        None => runner::run(&config).await?,
    };

    if let Some(ingest) = &summary.ingest {
        info!(
            pages = ingest.pages,
            works = ingest.works,
            authors = ingest.authors,
            bound_reached = ingest.bound_reached(),
            stop_reason = ?ingest.stop_reason,
            "Ingestion summary"
        );
    }

    info!(
        nodes = summary.nodes,
        edges = summary.edges,
        artifacts = summary.artifacts.len(),
        output = %config.output.directory.display(),
        "CollabNet run complete"
    );

    Ok(())
}
