// =============================================================================
// Hurst Exponent Module
// =============================================================================
//
// Rescaled-range estimation of the Hurst exponent, leaves first:
// - log returns
// - R/S statistic per chunk size
// - log-log regression estimator and its diagnostics
// - rolling estimates over a sliding window

pub mod estimator;
pub mod rescaled_range;
pub mod returns;
pub mod rolling;

pub use estimator::{
    estimate_hurst, rs_diagnostics, HurstBounds, HurstEstimator, RsDiagnostics, DEFAULT_MIN_CHUNK,
};
pub use rescaled_range::{chunk_sizes, rescaled_range, RsPoint};
pub use returns::log_returns;
pub use rolling::{
    rolling_hurst, rolling_hurst_dated, DatedHurst, RollingHurst, RollingPoint, DEFAULT_STRIDE,
};
