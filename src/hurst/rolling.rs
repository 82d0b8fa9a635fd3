// =============================================================================
// Rolling Hurst series
// =============================================================================
//
// Slides the estimator over the price history: for i = W, W + stride, ... the
// exponent is computed over prices[i - W ..= i] (W + 1 prices, W returns).
// Positions where the window is inconclusive are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hurst::estimator::HurstEstimator;
use crate::types::PriceSeries;

/// Default distance between successive rolling estimates.
pub const DEFAULT_STRIDE: usize = 3;

/// One rolling estimate, keyed by the index of the window's last price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub index: usize,
    pub hurst: f64,
}

/// Rolling estimate keyed by the timestamp of the window's last price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedHurst {
    pub timestamp: DateTime<Utc>,
    pub hurst: f64,
}

/// Lazy iterator over rolling estimates. Nothing is carried between
/// iterators: a new one over the same slice recomputes every window.
#[derive(Debug, Clone)]
pub struct RollingHurst<'a> {
    prices: &'a [f64],
    estimator: HurstEstimator,
    window: usize,
    stride: usize,
    next: usize,
}

impl<'a> RollingHurst<'a> {
    /// A stride of zero is treated as one.
    pub fn new(prices: &'a [f64], estimator: HurstEstimator, window: usize, stride: usize) -> Self {
        Self {
            prices,
            estimator,
            window,
            stride: stride.max(1),
            next: window,
        }
    }
}

impl Iterator for RollingHurst<'_> {
    type Item = RollingPoint;

    fn next(&mut self) -> Option<RollingPoint> {
        while self.next < self.prices.len() {
            let index = self.next;
            self.next = self.next.saturating_add(self.stride);

            let window = &self.prices[index - self.window..=index];
            if let Some(hurst) = self.estimator.estimate(window) {
                return Some(RollingPoint { index, hurst });
            }
        }
        None
    }
}

impl HurstEstimator {
    pub fn rolling<'a>(&self, prices: &'a [f64], window: usize, stride: usize) -> RollingHurst<'a> {
        RollingHurst::new(prices, *self, window, stride)
    }
}

/// Rolling H with the default estimator.
pub fn rolling_hurst(prices: &[f64], window: usize, stride: usize) -> RollingHurst<'_> {
    RollingHurst::new(prices, HurstEstimator::default(), window, stride)
}

/// Rolling H over a dated series, indices mapped to timestamps.
pub fn rolling_hurst_dated(
    series: &PriceSeries,
    estimator: &HurstEstimator,
    window: usize,
    stride: usize,
) -> Vec<DatedHurst> {
    let closes = series.closes();
    estimator
        .rolling(&closes, window, stride)
        .filter_map(|p| {
            series.timestamp_at(p.index).map(|timestamp| DatedHurst {
                timestamp,
                hurst: p.hurst,
            })
        })
        .collect()
}
