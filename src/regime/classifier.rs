// =============================================================================
// Hurst Regime Classifier
// =============================================================================
//
// Maps a Hurst exponent onto one of three regimes:
//
//   1. MEAN-REVERTING   H <  0.45
//   2. RANDOM WALK      0.45 <= H < 0.55
//   3. PERSISTENT       H >= 0.55
//
// The thresholds are fixed design constants, exposed through
// `RegimeThresholds` so integrators can retune them.

use serde::{Deserialize, Serialize};
use tracing::trace;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HurstRegime {
    /// Prices tend to reverse prior moves.
    MeanReverting,
    /// No detectable memory.
    RandomWalk,
    /// Past trends tend to continue.
    Persistent,
}

impl std::fmt::Display for HurstRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeanReverting => write!(f, "Mean-Reverting"),
            Self::RandomWalk => write!(f, "Random Walk"),
            Self::Persistent => write!(f, "Persistent / Trending"),
        }
    }
}

impl HurstRegime {
    pub fn description(self) -> &'static str {
        match self {
            Self::MeanReverting => {
                "Prices tend to reverse prior moves. Consistent with a range-bound market."
            }
            Self::RandomWalk => {
                "No detectable memory. Consistent with the Efficient Market Hypothesis."
            }
            Self::Persistent => {
                "Past trends tend to continue. The market exhibits long memory."
            }
        }
    }

    /// How fractal band widths compare with sqrt(T) bands. Below one year the
    /// scale factor (N / 252)^H shrinks as H grows; beyond one year it grows.
    pub fn band_note(self) -> &'static str {
        match self {
            Self::MeanReverting => {
                "Bands widen more slowly with horizon than sqrt(T): wider than classical below one year, narrower beyond."
            }
            Self::RandomWalk => {
                "No detectable memory. Classical and fractal bands are near-identical."
            }
            Self::Persistent => {
                "Bands widen faster with horizon than sqrt(T): narrower than classical below one year, wider beyond."
            }
        }
    }
}

/// Regime boundaries on the Hurst exponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeThresholds {
    /// H strictly below this is mean-reverting.
    pub mean_reverting_below: f64,
    /// H at or above this is persistent.
    pub persistent_from: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            mean_reverting_below: 0.45,
            persistent_from: 0.55,
        }
    }
}

// =============================================================================
// Classification logic
// =============================================================================

impl RegimeThresholds {
    pub fn classify(&self, hurst: f64) -> HurstRegime {
        let regime = if hurst < self.mean_reverting_below {
            HurstRegime::MeanReverting
        } else if hurst < self.persistent_from {
            HurstRegime::RandomWalk
        } else {
            HurstRegime::Persistent
        };
        trace!(hurst = format!("{:.4}", hurst), regime = %regime, "Regime classified");
        regime
    }
}

/// Classify with the default 0.45 / 0.55 thresholds.
pub fn classify_regime(hurst: f64) -> HurstRegime {
    RegimeThresholds::default().classify(hurst)
}
