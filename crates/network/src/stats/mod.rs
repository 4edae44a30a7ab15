//! Structural statistics of co-authorship graphs
//!
//! Each statistic either yields a value or an explicit [`Metric::Undefined`]
//! with the reason it could not be computed. A metric that is undefined for
//! a graph never prevents the others from being computed.

pub mod clustering;
pub mod degree;
pub mod paths;
pub mod powerlaw;

pub use clustering::{transitivity, triangle_count};
pub use degree::DegreeDistribution;
pub use paths::average_shortest_path_length;
pub use powerlaw::{hurwitz_zeta, FitConfig, PowerLawFit, PowerLawFitter};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a metric has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    /// Fewer than 2 nodes or no edges
    DegenerateGraph,
    /// Path length over a graph with more than one component
    DisconnectedGraph,
    /// Degree sequence too small for a power-law fit
    InsufficientDataForFit,
    /// Disabled by configuration
    Skipped,
    /// Null model generation failed for a reason other than the reference shape
    GenerationFailed,
}

impl UndefinedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UndefinedReason::DegenerateGraph => "degenerate_graph",
            UndefinedReason::DisconnectedGraph => "disconnected_graph",
            UndefinedReason::InsufficientDataForFit => "insufficient_data_for_fit",
            UndefinedReason::Skipped => "skipped",
            UndefinedReason::GenerationFailed => "generation_failed",
        }
    }
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric value or the reason it is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric<T> {
    Defined { value: T },
    Undefined { reason: UndefinedReason },
}

impl<T> Metric<T> {
    pub fn defined(value: T) -> Self {
        Metric::Defined { value }
    }

    pub fn undefined(reason: UndefinedReason) -> Self {
        Metric::Undefined { reason }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Defined { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Defined { value } => Some(value),
            Metric::Undefined { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<UndefinedReason> {
        match self {
            Metric::Defined { .. } => None,
            Metric::Undefined { reason } => Some(*reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Metric<U> {
        match self {
            Metric::Defined { value } => Metric::Defined { value: f(value) },
            Metric::Undefined { reason } => Metric::Undefined { reason },
        }
    }

    /// Render for flat tables; undefined values become `undefined:<reason>`
    pub fn render<F: FnOnce(&T) -> String>(&self, f: F) -> String {
        match self {
            Metric::Defined { value } => f(value),
            Metric::Undefined { reason } => format!("undefined:{}", reason),
        }
    }
}
