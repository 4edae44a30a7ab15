//! Discrete power-law fit of a degree sequence
//!
//! Clauset, Shalizi and Newman style estimation:
//! 1. Zero degrees are discarded.
//! 2. For every candidate lower bound `xmin` among the distinct observed
//!    values (the largest excluded), the exponent is estimated with the
//!    discrete MLE approximation `alpha = 1 + n / Σ ln(x / (xmin - 1/2))`
//!    over the tail `x >= xmin`.
//! 3. The Kolmogorov–Smirnov distance between the empirical tail CDF and
//!    the exact discrete power-law CDF (Hurwitz zeta normalized) is
//!    computed for that candidate.
//! 4. The candidate with the smallest distance wins.
//!
//! The fit needs a minimum number of positive observations and of distinct
//! values; both are configuration, not constants.

use collabnet_common::config::AnalysisConfig;
use collabnet_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Terms summed directly before the Euler–Maclaurin tail
const ZETA_DIRECT_TERMS: usize = 9;

/// B2, B4, ..., B12
const BERNOULLI_EVEN: [f64; 6] = [
    1.0 / 6.0,
    -1.0 / 30.0,
    1.0 / 42.0,
    -1.0 / 30.0,
    5.0 / 66.0,
    -691.0 / 2730.0,
];

/// Hurwitz zeta `ζ(s, q) = Σ_{k>=0} (q + k)^-s` for `s > 1`, `q > 0`
pub fn hurwitz_zeta(s: f64, q: f64) -> f64 {
    let mut sum: f64 = (0..ZETA_DIRECT_TERMS)
        .map(|k| (q + k as f64).powf(-s))
        .sum();

    let a = q + ZETA_DIRECT_TERMS as f64;
    sum += a.powf(1.0 - s) / (s - 1.0);
    sum += 0.5 * a.powf(-s);

    // Correction terms B_2j / (2j)! * s(s+1)...(s+2j-2) * a^(-s-2j+1)
    let mut rising = s * a.powf(-s - 1.0);
    let mut factorial = 2.0;
    for (j, bernoulli) in BERNOULLI_EVEN.iter().enumerate() {
        sum += bernoulli / factorial * rising;

        let order = 2.0 * (j + 1) as f64;
        rising *= (s + order - 1.0) * (s + order) / (a * a);
        factorial *= (order + 1.0) * (order + 2.0);
    }

    sum
}

/// Fitted power-law parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLawFit {
    /// Exponent
    pub alpha: f64,

    /// KS distance between empirical and fitted tail CDFs
    pub ks_distance: f64,

    /// Lower bound of the fitted tail
    pub xmin: usize,

    /// Observations at or above `xmin`
    pub tail_observations: usize,
}

/// Fit preconditions
#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    /// Positive observations required
    pub min_observations: usize,

    /// Distinct positive values required
    pub min_distinct: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_observations: 10,
            min_distinct: 2,
        }
    }
}

impl From<&AnalysisConfig> for FitConfig {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            min_observations: config.fit_min_observations,
            min_distinct: config.fit_min_distinct,
        }
    }
}

/// Discrete power-law fitter
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerLawFitter {
    config: FitConfig,
}

impl PowerLawFitter {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    /// Fit a degree sequence; zeros are ignored
    pub fn fit(&self, degrees: &[usize]) -> Result<PowerLawFit> {
        let mut data: Vec<usize> = degrees.iter().copied().filter(|&d| d > 0).collect();
        data.sort_unstable();

        let mut distinct = data.clone();
        distinct.dedup();

        if data.len() < self.config.min_observations || distinct.len() < self.config.min_distinct.max(2) {
            return Err(AppError::InsufficientData {
                observations: data.len(),
                distinct: distinct.len(),
                required_observations: self.config.min_observations,
                required_distinct: self.config.min_distinct,
            });
        }

        let mut best: Option<PowerLawFit> = None;
        let candidates = &distinct[..distinct.len() - 1];

        for &xmin in candidates {
            let start = data.partition_point(|&x| x < xmin);
            let fit = fit_tail(&data[start..], xmin);

            if best.map_or(true, |b| fit.ks_distance < b.ks_distance) {
                best = Some(fit);
            }
        }

        // At least two distinct values guarantee one candidate
        let fit = best.ok_or_else(|| AppError::Internal {
            message: "power-law fit produced no candidate".to_string(),
        })?;

        debug!(
            alpha = fit.alpha,
            ks = fit.ks_distance,
            xmin = fit.xmin,
            tail = fit.tail_observations,
            "Power-law fit"
        );
        Ok(fit)
    }
}

/// Fit the sorted tail `x >= xmin`
fn fit_tail(tail: &[usize], xmin: usize) -> PowerLawFit {
    let n = tail.len() as f64;
    let shift = xmin as f64 - 0.5;
    let log_sum: f64 = tail.iter().map(|&x| (x as f64 / shift).ln()).sum();
    let alpha = 1.0 + n / log_sum;

    PowerLawFit {
        alpha,
        ks_distance: ks_distance(tail, xmin, alpha),
        xmin,
        tail_observations: tail.len(),
    }
}

/// KS distance between the empirical CDF of a sorted tail and the discrete
/// power-law CDF `1 - ζ(α, x+1) / ζ(α, xmin)`, evaluated at observed values
fn ks_distance(tail: &[usize], xmin: usize, alpha: f64) -> f64 {
    let n = tail.len() as f64;
    let normalization = hurwitz_zeta(alpha, xmin as f64);
    let mut distance: f64 = 0.0;
    let mut i = 0;

    while i < tail.len() {
        let x = tail[i];
        let end = i + tail[i..].partition_point(|&v| v == x);
        let empirical = end as f64 / n;
        let fitted = 1.0 - hurwitz_zeta(alpha, x as f64 + 1.0) / normalization;

        distance = distance.max((empirical - fitted).abs());
        i = end;
    }

    distance
}
