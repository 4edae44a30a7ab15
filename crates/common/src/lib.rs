//! CollabNet Common Library
//!
//! Shared code for the CollabNet crates including:
//! - Configuration management
//! - Error types and handling
//! - Metrics and observability
//! - Wire records of the bibliographic record source
//! - Paginated record source clients
//! - Persistence of graphs and tables

pub mod config;
pub mod errors;
pub mod metrics;
pub mod records;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use records::{RawAuthor, RawAuthorship, RawWork};
pub use source::{OpenAlexSource, RecordSource, StaticSource};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
