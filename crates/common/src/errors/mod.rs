//! Error types for CollabNet
//!
//! Provides a single error enum shared by every crate with:
//! - Distinct variants for each failure mode
//! - Machine-readable error codes
//! - Transient/permanent classification used by the retry layer
//!
//! Recoverable conditions (malformed records, undefined metrics, reaching an
//! ingestion bound) are not errors and never surface through this type; the
//! variants for degenerate graphs and insufficient fit data exist so that
//! individual stages can report them and the comparator can turn them into
//! undefined results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,

    // Analysis preconditions (5xxx)
    DegenerateGraph,
    InsufficientData,

    // Storage errors (7xxx)
    IoError,

    // Record source errors (8xxx)
    UpstreamError,
    UpstreamTimeout,
    RateLimited,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1003,

            ErrorCode::DegenerateGraph => 5001,
            ErrorCode::InsufficientData => 5002,

            ErrorCode::IoError => 7001,

            ErrorCode::UpstreamError => 8001,
            ErrorCode::UpstreamTimeout => 8002,
            ErrorCode::RateLimited => 8003,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Analysis preconditions
    #[error("Degenerate graph: {nodes} nodes, {edges} edges")]
    DegenerateGraph { nodes: usize, edges: usize },

    #[error(
        "Insufficient data for fit: {observations} observations ({distinct} distinct), \
         need {required_observations} ({required_distinct} distinct)"
    )]
    InsufficientData {
        observations: usize,
        distinct: usize,
        required_observations: usize,
        required_distinct: usize,
    },

    // Record source errors
    #[error("Record source error ({status}): {message}")]
    RecordSource { status: u16, message: String },

    #[error("Record source timeout after {timeout_ms}ms")]
    RecordSourceTimeout { timeout_ms: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Storage errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::DegenerateGraph { .. } => ErrorCode::DegenerateGraph,
            AppError::InsufficientData { .. } => ErrorCode::InsufficientData,
            AppError::RecordSource { status: 429, .. } => ErrorCode::RateLimited,
            AppError::RecordSource { .. } => ErrorCode::UpstreamError,
            AppError::RecordSourceTimeout { .. } => ErrorCode::UpstreamTimeout,
            AppError::HttpClient(e) if e.is_timeout() => ErrorCode::UpstreamTimeout,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::RecordSource { status, .. } => *status == 429 || *status >= 500,
            AppError::RecordSourceTimeout { .. } => true,
            AppError::HttpClient(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Whether this error describes input the analysis cannot use,
    /// as opposed to a failure of the system itself
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AppError::DegenerateGraph { .. } | AppError::InsufficientData { .. }
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation {
            message: err.to_string(),
            field: err.field_errors().keys().next().map(|k| k.to_string()),
        }
    }
}
