// =============================================================================
// Hurst Exponent: Rescaled Range (R/S) Analysis
// =============================================================================
//
// The Hurst exponent H characterises the long-term memory of a time series:
//
//   H > 0.55  =>  trending / persistent
//   H ~ 0.50  =>  random walk
//   H < 0.45  =>  mean-reverting / anti-persistent
//
// Algorithm:
//   1. Convert prices to log returns (n values).
//   2. Admissible chunk sizes are the distinct n / k (k >= 2) at or above the
//      minimum chunk size. At least 3 are required.
//   3. For each size compute the mean R/S statistic over its chunks.
//   4. Ordinary least-squares regression of ln(R/S) on ln(size). The slope is
//      the Hurst exponent, since R/S ~ size^H.
//   5. Clamp to [0.01, 0.99] and round to 4 decimals.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::hurst::rescaled_range::{chunk_sizes, rs_points, RsPoint};
use crate::hurst::returns::log_returns;
use crate::stats::{linear_fit, mean, round_to, LinearFit};

/// Default floor on chunk length.
pub const DEFAULT_MIN_CHUNK: usize = 20;

/// Default rounding applied to the reported exponent.
pub const DEFAULT_PRECISION: u32 = 4;

/// A regression needs at least this many (size, R/S) pairs.
const MIN_REGRESSION_POINTS: usize = 3;

/// Random-walk reference slope drawn alongside the fitted line.
const RANDOM_WALK_SLOPE: f64 = 0.5;

/// Range the reported exponent is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurstBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for HurstBounds {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 0.99,
        }
    }
}

/// Everything needed to draw the log-log R/S plot for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsDiagnostics {
    pub chunk_sizes: Vec<usize>,
    pub mean_rs: Vec<f64>,
    /// Clamped and rounded, identical to [`HurstEstimator::estimate`].
    pub hurst: f64,
    /// Raw regression slope before clamping.
    pub slope: f64,
    pub intercept: f64,
    /// `exp(slope * ln(size) + intercept)` per chunk size.
    pub fitted_rs: Vec<f64>,
    /// Slope-0.5 line through the centroid of the log-log points.
    pub random_walk_rs: Vec<f64>,
}

/// R/S Hurst estimator with its tunable constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HurstEstimator {
    pub min_chunk: usize,
    pub bounds: HurstBounds,
    pub precision: u32,
}

impl Default for HurstEstimator {
    fn default() -> Self {
        Self {
            min_chunk: DEFAULT_MIN_CHUNK,
            bounds: HurstBounds::default(),
            precision: DEFAULT_PRECISION,
        }
    }
}

impl HurstEstimator {
    pub fn new(min_chunk: usize) -> Self {
        Self {
            min_chunk,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: HurstBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Mean R/S per admissible chunk size.
    ///
    /// Returns `None` when fewer than 3 chunk sizes exist or fewer than 3 of
    /// them produce a valid observation.
    pub fn rs_points(&self, prices: &[f64]) -> Option<Vec<RsPoint>> {
        let returns = log_returns(prices);
        let sizes = chunk_sizes(returns.len(), self.min_chunk);
        if sizes.len() < MIN_REGRESSION_POINTS {
            trace!(
                returns = returns.len(),
                sizes = sizes.len(),
                min_chunk = self.min_chunk,
                "Hurst: insufficient data"
            );
            return None;
        }

        let points = rs_points(&returns, &sizes);
        if points.len() < MIN_REGRESSION_POINTS {
            trace!(
                valid = points.len(),
                "Hurst: insufficient valid chunk sizes for regression"
            );
            return None;
        }
        Some(points)
    }

    /// Estimate H for a price series, or `None` for insufficient data.
    pub fn estimate(&self, prices: &[f64]) -> Option<f64> {
        let points = self.rs_points(prices)?;
        let fit = fit_log_log(&points)?;
        let hurst = self.finalize(fit.slope);

        trace!(
            hurst = format!("{:.4}", hurst),
            points = points.len(),
            "Hurst exponent computed"
        );
        Some(hurst)
    }

    /// Full regression detail for plotting.
    pub fn diagnostics(&self, prices: &[f64]) -> Option<RsDiagnostics> {
        let points = self.rs_points(prices)?;
        let fit = fit_log_log(&points)?;

        let log_n: Vec<f64> = points.iter().map(|p| (p.chunk_size as f64).ln()).collect();
        let log_rs: Vec<f64> = points.iter().map(|p| p.mean_rs.ln()).collect();

        let rw_intercept = mean(&log_rs)? - RANDOM_WALK_SLOPE * mean(&log_n)?;

        Some(RsDiagnostics {
            chunk_sizes: points.iter().map(|p| p.chunk_size).collect(),
            mean_rs: points.iter().map(|p| p.mean_rs).collect(),
            hurst: self.finalize(fit.slope),
            slope: fit.slope,
            intercept: fit.intercept,
            fitted_rs: log_n.iter().map(|&x| fit.predict(x).exp()).collect(),
            random_walk_rs: log_n
                .iter()
                .map(|&x| (RANDOM_WALK_SLOPE * x + rw_intercept).exp())
                .collect(),
        })
    }

    fn finalize(&self, slope: f64) -> f64 {
        // max/min rather than clamp: clamp panics on inverted bounds.
        let within = |h: f64| h.max(self.bounds.min).min(self.bounds.max);
        // Rounding can step over a bound (0.99 -> 1.0 at one decimal).
        within(round_to(within(slope), self.precision))
    }
}

fn fit_log_log(points: &[RsPoint]) -> Option<LinearFit> {
    let log_n: Vec<f64> = points.iter().map(|p| (p.chunk_size as f64).ln()).collect();
    let log_rs: Vec<f64> = points.iter().map(|p| p.mean_rs.ln()).collect();

    let fit = linear_fit(&log_n, &log_rs);
    if fit.is_none() {
        trace!("Hurst: degenerate regression");
    }
    fit
}

/// Estimate H with the default estimator (minimum chunk 20).
pub fn estimate_hurst(prices: &[f64]) -> Option<f64> {
    HurstEstimator::default().estimate(prices)
}

/// R/S regression detail with the default estimator.
pub fn rs_diagnostics(prices: &[f64]) -> Option<RsDiagnostics> {
    HurstEstimator::default().diagnostics(prices)
}
