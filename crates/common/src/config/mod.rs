//! Configuration management for CollabNet
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values
//!
//! The ingestion caps and the degree artifact threshold are named values
//! here instead of literals in the pipeline. The artifact threshold is tied
//! to the record source page size: authors whose listing was truncated at a
//! page boundary show up with exactly that many co-authors.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Works requested per page from the record source
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Degree treated as a pagination artifact; equal to the page size
pub const DEFAULT_ARTIFACT_DEGREE: usize = DEFAULT_PAGE_SIZE as usize;

/// Distinct-author cap for bounded ingestion
pub const DEFAULT_MAX_AUTHORS: usize = 40_000;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_artifact_degree"))]
pub struct AppConfig {
    /// Record source configuration
    #[serde(default)]
    #[validate(nested)]
    pub source: SourceConfig,

    /// Ingestion bounds
    #[serde(default)]
    #[validate(nested)]
    pub ingestion: IngestionConfig,

    /// Graph construction and filtering
    #[serde(default)]
    pub graph: GraphConfig,

    /// Null models and statistics
    #[serde(default)]
    #[validate(nested)]
    pub analysis: AnalysisConfig,

    /// Output artifacts
    #[serde(default)]
    pub output: OutputConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SourceConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Title search filter; empty matches every work
    #[serde(default)]
    pub title_search: String,

    /// Works per page
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 200))]
    pub per_page: u32,

    /// Contact address for the polite pool
    pub mailto: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures
    #[serde(default = "default_max_retries")]
    #[validate(range(max = 10))]
    pub max_retries: u32,

    /// Request rate towards the API
    #[serde(default = "default_requests_per_second")]
    #[validate(range(min = 1))]
    pub requests_per_second: u32,

    /// Recorded pages to replay instead of calling the API
    pub replay_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct IngestionConfig {
    /// Stop once this many distinct authors are registered
    #[serde(default = "default_max_authors")]
    #[validate(range(min = 1))]
    pub max_authors: usize,

    /// Stop once this many works are ingested
    pub max_works: Option<usize>,

    /// Stop after this many pages
    pub max_pages: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphConfig {
    /// Nodes with exactly this degree are dropped after construction;
    /// must equal `source.per_page` while the filter is enabled
    #[serde(default = "default_artifact_degree")]
    pub artifact_degree: usize,

    /// Run the degree artifact filter
    #[serde(default = "default_enabled")]
    pub filter_enabled: bool,

    /// Keep authors without co-authors as isolated nodes
    #[serde(default = "default_enabled")]
    pub isolated_authors: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AnalysisConfig {
    /// Seed for both null models; random when absent
    pub seed: Option<u64>,

    /// Positive degree observations required for a power-law fit
    #[serde(default = "default_fit_min_observations")]
    #[validate(range(min = 2))]
    pub fit_min_observations: usize,

    /// Distinct degree values required for a power-law fit
    #[serde(default = "default_fit_min_distinct")]
    #[validate(range(min = 2))]
    pub fit_min_distinct: usize,

    /// Compute all-pairs average path length (quadratic in node count)
    #[serde(default = "default_enabled")]
    pub compute_path_length: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory receiving every artifact
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    #[serde(default = "default_edge_list_file")]
    pub edge_list_file: String,

    #[serde(default = "default_author_table_file")]
    pub author_table_file: String,

    #[serde(default = "default_work_table_file")]
    pub work_table_file: String,

    #[serde(default = "default_comparison_json_file")]
    pub comparison_json_file: String,

    #[serde(default = "default_comparison_csv_file")]
    pub comparison_csv_file: String,

    #[serde(default = "default_degree_distribution_file")]
    pub degree_distribution_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Prometheus exporter port (0 to disable)
    #[serde(default)]
    pub metrics_port: u16,

    /// Service name attached to logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_base_url() -> String { "https://api.openalex.org".to_string() }
fn default_per_page() -> u32 { DEFAULT_PAGE_SIZE }
fn default_timeout() -> u64 { 30 }
fn default_max_retries() -> u32 { 3 }
fn default_requests_per_second() -> u32 { 10 }
fn default_max_authors() -> usize { DEFAULT_MAX_AUTHORS }
fn default_artifact_degree() -> usize { DEFAULT_ARTIFACT_DEGREE }
fn default_enabled() -> bool { true }
fn default_fit_min_observations() -> usize { 10 }
fn default_fit_min_distinct() -> usize { 2 }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_edge_list_file() -> String { "co_authorship_graph.edgelist".to_string() }
fn default_author_table_file() -> String { "authors_works_unique.csv".to_string() }
fn default_work_table_file() -> String { "works_authors.csv".to_string() }
fn default_comparison_json_file() -> String { "comparison.json".to_string() }
fn default_comparison_csv_file() -> String { "comparison.csv".to_string() }
fn default_degree_distribution_file() -> String { "degree_distribution.csv".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "collabnet".to_string() }

/// The artifact threshold only means something when it matches the page size
fn validate_artifact_degree(config: &AppConfig) -> Result<(), ValidationError> {
    let per_page = config.source.per_page as usize;
    if config.graph.filter_enabled && config.graph.artifact_degree != per_page {
        return Err(ValidationError::new("artifact_degree_mismatch").with_message(
            format!(
                "graph.artifact_degree ({}) must equal source.per_page ({}) while the filter is enabled",
                config.graph.artifact_degree, per_page
            )
            .into(),
        ));
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__INGESTION__MAX_AUTHORS=1000
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

}

impl SourceConfig {
    /// Per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            ingestion: IngestionConfig::default(),
            graph: GraphConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            title_search: String::new(),
            per_page: default_per_page(),
            mailto: None,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
            replay_path: None,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_authors: default_max_authors(),
            max_works: None,
            max_pages: None,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            artifact_degree: default_artifact_degree(),
            filter_enabled: default_enabled(),
            isolated_authors: default_enabled(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: None,
            fit_min_observations: default_fit_min_observations(),
            fit_min_distinct: default_fit_min_distinct(),
            compute_path_length: default_enabled(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            edge_list_file: default_edge_list_file(),
            author_table_file: default_author_table_file(),
            work_table_file: default_work_table_file(),
            comparison_json_file: default_comparison_json_file(),
            comparison_csv_file: default_comparison_csv_file(),
            degree_distribution_file: default_degree_distribution_file(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: 0,
            service_name: default_service_name(),
        }
    }
}
