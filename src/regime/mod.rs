// =============================================================================
// Regime Classification Module
// =============================================================================
//
// Hurst-based market regime: persistence vs mean-reversion.

pub mod classifier;

pub use classifier::{classify_regime, HurstRegime, RegimeThresholds};
