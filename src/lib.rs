// =============================================================================
// Fractal Markets: Hurst R/S analysis and fractal volatility bands
// =============================================================================
//
// Library layout, leaves first:
//   stats / types / error    numeric helpers, dated price series, error enum
//   hurst                    log returns, R/S statistic, estimator, rolling H
//   regime                   H -> mean-reverting / random walk / persistent
//   bands                    fractal bands, signals, classical comparison
//   report / cache           composed analysis and its TTL memo
//   runtime_config / api     service configuration and REST surface
// =============================================================================

pub mod api;
pub mod app_state;
pub mod bands;
pub mod cache;
pub mod error;
pub mod hurst;
pub mod regime;
pub mod report;
pub mod runtime_config;
pub mod stats;
pub mod types;

pub use bands::{classify_signal, compute_bands, BandSet, BandSignal, ExponentMode, Horizon};
pub use error::{AnalysisError, Result};
pub use hurst::{estimate_hurst, rolling_hurst, rs_diagnostics, HurstEstimator, RsDiagnostics};
pub use regime::{classify_regime, HurstRegime};
pub use report::{analyze, AnalysisReport};
pub use runtime_config::AnalysisConfig;
pub use types::{PricePoint, PriceSeries};
