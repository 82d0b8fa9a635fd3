// =============================================================================
// Fractal Band Module
// =============================================================================
//
// Pure, side-effect-free support/resistance bands scaled by a fractal exponent,
// the signal read-out at the latest close, and the comparison against
// classical square-root-of-time bands.

pub mod comparison;
pub mod fractal;
pub mod signal;

pub use comparison::{compare_to_classical, scale_ratio, HorizonComparison, WidthDifference};
pub use fractal::{
    compute_bands, scale_factor, BandPoint, BandSet, ExponentMode, Horizon, HorizonBands,
    HorizonLevels, CLASSICAL_EXPONENT, TRADING_DAYS_PER_YEAR,
};
pub use signal::{classify_signal, BandSignal};
