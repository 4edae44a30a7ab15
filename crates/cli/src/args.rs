//! Command-line arguments

use clap::Parser;
use collabnet_common::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "collabnet")]
#[command(version)]
#[command(about = "Build a co-authorship network and compare it against null models")]
#[command(
    long_about = "Fetches works from OpenAlex (or replays recorded pages), deduplicates authors \
                  by display name, builds the co-authorship graph, drops degree artifacts and \
                  compares the result against random and ring-lattice null models."
)]
pub struct Cli {
    /// Configuration file; layered config/ files and APP__ variables otherwise
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Replay recorded pages from a JSON file instead of calling the API
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Analyse an existing edge list instead of ingesting works
    #[arg(long, value_name = "FILE", conflicts_with = "replay")]
    pub edge_list: Option<PathBuf>,

    /// Title search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Seed for the null models
    #[arg(long)]
    pub seed: Option<u64>,

    /// Distinct-author cap
    #[arg(long)]
    pub max_authors: Option<usize>,

    /// Work cap
    #[arg(long)]
    pub max_works: Option<usize>,

    /// Page cap
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Keep nodes whose degree equals the artifact threshold
    #[arg(long)]
    pub no_filter: bool,

    /// Skip the all-pairs average path length
    #[arg(long)]
    pub skip_path_length: bool,
}

impl Cli {
    /// Overlay command-line values on a loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.replay {
            config.source.replay_path = Some(path.clone());
        }
        if let Some(query) = &self.query {
            config.source.title_search = query.clone();
        }
        if let Some(output) = &self.output {
            config.output.directory = output.clone();
        }
        if self.seed.is_some() {
            config.analysis.seed = self.seed;
        }
        if let Some(max_authors) = self.max_authors {
            config.ingestion.max_authors = max_authors;
        }
        if self.max_works.is_some() {
            config.ingestion.max_works = self.max_works;
        }
        if self.max_pages.is_some() {
            config.ingestion.max_pages = self.max_pages;
        }
        if self.no_filter {
            config.graph.filter_enabled = false;
        }
        if self.skip_path_length {
            config.analysis.compute_path_length = false;
        }
    }
}
