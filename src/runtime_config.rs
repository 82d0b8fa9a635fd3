// =============================================================================
// Runtime Configuration: analysis parameters with atomic save
// =============================================================================
//
// Every tunable of the estimator, the rolling series and the band calculator
// lives here so that the service can be reconfigured without a restart.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bands::{ExponentMode, Horizon};
use crate::error::AnalysisError;
use crate::hurst::{HurstBounds, HurstEstimator, DEFAULT_MIN_CHUNK, DEFAULT_STRIDE};
use crate::regime::RegimeThresholds;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_min_chunk() -> usize {
    DEFAULT_MIN_CHUNK
}

fn default_rolling_window() -> usize {
    252
}

fn default_stride() -> usize {
    DEFAULT_STRIDE
}

fn default_horizons() -> Vec<Horizon> {
    Horizon::defaults()
}

fn default_precision() -> u32 {
    4
}

/// Fewest decimals that still resolve the default clamp bounds.
pub const MIN_PRECISION: u32 = 2;

/// Beyond this, f64 carries no further decimal digits for H.
pub const MAX_PRECISION: u32 = 15;

fn default_min_history() -> usize {
    100
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

// =============================================================================
// AnalysisConfig
// =============================================================================

/// Top-level configuration for Hurst and band analysis.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    // --- Estimator ----------------------------------------------------------

    /// Smallest admissible chunk length for R/S.
    #[serde(default = "default_min_chunk")]
    pub min_chunk: usize,

    /// Range the estimated H is clamped to.
    #[serde(default)]
    pub hurst_bounds: HurstBounds,

    /// Decimal places H is rounded to.
    #[serde(default = "default_precision")]
    pub precision: u32,

    // --- Rolling series -----------------------------------------------------

    /// Returns per rolling window (W; each window holds W + 1 prices).
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,

    /// Distance between successive rolling estimates.
    #[serde(default = "default_stride")]
    pub stride: usize,

    // --- Bands --------------------------------------------------------------

    /// Named lookback windows in trading days.
    #[serde(default = "default_horizons")]
    pub horizons: Vec<Horizon>,

    /// Fractal (H) or classical (0.5) band scaling.
    #[serde(default)]
    pub exponent_mode: ExponentMode,

    // --- Interpretation -----------------------------------------------------

    #[serde(default)]
    pub regime_thresholds: RegimeThresholds,

    // --- Service ------------------------------------------------------------

    /// Minimum number of prices before a full report is attempted.
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// Lifetime of cached reports, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_chunk: default_min_chunk(),
            hurst_bounds: HurstBounds::default(),
            precision: default_precision(),
            rolling_window: default_rolling_window(),
            stride: default_stride(),
            horizons: default_horizons(),
            exponent_mode: ExponentMode::default(),
            regime_thresholds: RegimeThresholds::default(),
            min_history: default_min_history(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analysis config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analysis config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid analysis config in {}", path.display()))?;

        info!(
            path = %path.display(),
            min_chunk = config.min_chunk,
            rolling_window = config.rolling_window,
            exponent_mode = %config.exponent_mode,
            "analysis config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise analysis config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "analysis config saved (atomic)");
        Ok(())
    }

    /// Reject parameter combinations the estimator cannot work with.
    pub fn validate(&self) -> std::result::Result<(), AnalysisError> {
        let invalid = |name: &'static str, reason: &str| AnalysisError::InvalidParameter {
            name,
            reason: reason.to_string(),
        };

        if self.min_chunk < 2 {
            return Err(invalid("min_chunk", "must be at least 2"));
        }
        if self.stride == 0 {
            return Err(invalid("stride", "must be positive"));
        }
        // Three distinct chunk sizes need n / 4 >= min_chunk.
        if self.rolling_window < self.min_chunk.saturating_mul(4) {
            return Err(invalid(
                "rolling_window",
                "must hold at least four minimum chunks",
            ));
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return Err(invalid("precision", "must be between 2 and 15 decimals"));
        }
        let b = self.hurst_bounds;
        if !(b.min.is_finite() && b.max.is_finite() && b.min < b.max) {
            return Err(invalid("hurst_bounds", "min must be below max"));
        }
        let t = self.regime_thresholds;
        if !(t.mean_reverting_below.is_finite()
            && t.persistent_from.is_finite()
            && t.mean_reverting_below <= t.persistent_from)
        {
            return Err(invalid(
                "regime_thresholds",
                "mean_reverting_below must not exceed persistent_from",
            ));
        }
        if self.horizons.is_empty() {
            return Err(invalid("horizons", "at least one horizon is required"));
        }
        if self.horizons.iter().any(|h| h.window < 2) {
            return Err(invalid("horizons", "windows must be at least 2"));
        }
        Ok(())
    }

    /// Estimator built from this configuration.
    pub fn estimator(&self) -> HurstEstimator {
        HurstEstimator::new(self.min_chunk)
            .with_bounds(self.hurst_bounds)
            .with_precision(self.precision)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
