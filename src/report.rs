// =============================================================================
// Analysis Report
// =============================================================================
//
// Composes the building blocks into one result for a dated price series:
//
//   1. full-period H and its regime
//   2. rolling H over the configured window
//   3. R/S regression detail
//   4. bands at the effective exponent, the levels table and, in fractal
//      mode, the width difference against classical bands
//
// An absent H is reported as absent. In fractal mode that leaves the band
// section empty instead of quietly substituting 0.5.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bands::{
    compare_to_classical, compute_bands, BandSet, ExponentMode, HorizonComparison, HorizonLevels,
    CLASSICAL_EXPONENT,
};
use crate::error::{AnalysisError, Result};
use crate::hurst::{rolling_hurst_dated, DatedHurst, RsDiagnostics};
use crate::regime::HurstRegime;
use crate::runtime_config::AnalysisConfig;
use crate::stats::safe_pct;
use crate::types::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub data_points: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub first_close: f64,
    pub last_close: f64,
    pub total_return_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub period: PeriodSummary,
    pub hurst: Option<f64>,
    pub regime: Option<HurstRegime>,
    pub regime_description: Option<String>,
    pub band_note: Option<String>,
    pub rolling: Vec<DatedHurst>,
    pub diagnostics: Option<RsDiagnostics>,
    pub exponent_mode: ExponentMode,
    /// Exponent the bands were computed with.
    pub exponent: Option<f64>,
    pub bands: Option<BandSet>,
    /// Fractal vs classical width, empty in classical mode.
    pub comparison: Vec<HorizonComparison>,
    pub levels: Vec<HorizonLevels>,
    pub notes: Vec<String>,
}

impl AnalysisReport {
    pub fn latest_rolling(&self) -> Option<&DatedHurst> {
        self.rolling.last()
    }
}

/// Run the full analysis of `series` under `config`.
///
/// Fails when the configuration is invalid or the series is shorter than
/// `config.min_history`. Every other degenerate condition shows up as an
/// absent field plus an explanatory note.
pub fn analyze(series: &PriceSeries, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    if series.len() < config.min_history {
        return Err(AnalysisError::InsufficientHistory {
            required: config.min_history,
            actual: series.len(),
        });
    }
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(AnalysisError::EmptySeries);
    };

    let closes = series.closes();
    let estimator = config.estimator();
    let mut notes = Vec::new();

    // --- Hurst --------------------------------------------------------------
    let diagnostics = estimator.diagnostics(&closes);
    let hurst = diagnostics.as_ref().map(|d| d.hurst);
    let regime = hurst.map(|h| config.regime_thresholds.classify(h));
    if hurst.is_none() {
        notes.push(format!(
            "Hurst exponent unavailable: fewer than 3 usable chunk sizes with min_chunk {}",
            config.min_chunk
        ));
    }

    let rolling = rolling_hurst_dated(series, &estimator, config.rolling_window, config.stride);
    if rolling.is_empty() {
        notes.push(format!(
            "Rolling Hurst unavailable: needs more than {} prices",
            config.rolling_window
        ));
    }

    // --- Bands --------------------------------------------------------------
    let exponent = config.exponent_mode.resolve(hurst);
    let bands = exponent.map(|e| compute_bands(series.points(), e, &config.horizons));
    let comparison = match (&bands, config.exponent_mode) {
        (Some(fractal), ExponentMode::Fractal) => {
            let classical = compute_bands(series.points(), CLASSICAL_EXPONENT, &config.horizons);
            compare_to_classical(fractal, &classical)
        }
        _ => Vec::new(),
    };
    let levels = bands.as_ref().map(BandSet::levels).unwrap_or_default();
    if bands.is_none() {
        notes.push("Fractal bands unavailable without a Hurst exponent".to_string());
    }
    for row in levels.iter().filter(|r| r.support.is_none()) {
        notes.push(format!(
            "Horizon {} ({} days) needs more history for bands",
            row.horizon, row.window
        ));
    }

    debug!(
        points = series.len(),
        hurst = ?hurst,
        rolling = rolling.len(),
        exponent = ?exponent,
        horizons = levels.len(),
        "analysis report composed"
    );

    Ok(AnalysisReport {
        period: PeriodSummary {
            data_points: series.len(),
            start: first.timestamp,
            end: last.timestamp,
            first_close: first.close,
            last_close: last.close,
            total_return_pct: safe_pct(last.close - first.close, first.close),
        },
        hurst,
        regime,
        regime_description: regime.map(|r| r.description().to_string()),
        band_note: regime.map(|r| r.band_note().to_string()),
        rolling,
        diagnostics,
        exponent_mode: config.exponent_mode,
        exponent,
        bands,
        comparison,
        levels,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::BandSignal;
    use crate::types::PricePoint;
    use chrono::{Duration, TimeZone};

    fn series_from(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::close_only(start + Duration::days(i as i64), c))
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn walk(len: usize, seed: u64) -> Vec<f64> {
        let mut state = seed.max(1);
        let mut price = 100.0;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let u = (state as f64) / (u64::MAX as f64) - 0.5;
                price *= 1.0 + u * 0.02;
                price
            })
            .collect()
    }

    #[test]
    fn rejects_short_history() {
        let series = series_from(&walk(50, 3));
        let err = analyze(&series, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientHistory {
                required: 100,
                actual: 50
            }
        );
    }

    #[test]
    fn rejects_invalid_config() {
        let series = series_from(&walk(200, 3));
        let mut cfg = AnalysisConfig::default();
        cfg.stride = 0;
        assert!(matches!(
            analyze(&series, &cfg),
            Err(AnalysisError::InvalidParameter { name: "stride", .. })
        ));
    }

    #[test]
    fn full_report_on_long_walk() {
        let series = series_from(&walk(400, 11));
        let report = analyze(&series, &AnalysisConfig::default()).unwrap();

        let h = report.hurst.unwrap();
        assert!((0.01..=0.99).contains(&h));
        assert_eq!(report.diagnostics.as_ref().unwrap().hurst, h);
        assert!(report.regime.is_some());
        assert_eq!(report.exponent, Some(h));

        // Windows end at 252, 255, ..., 399.
        assert_eq!(report.rolling.len(), 50);
        assert_eq!(report.rolling[0].timestamp, series.timestamp_at(252).unwrap());

        let bands = report.bands.as_ref().unwrap();
        assert_eq!(bands.horizons.len(), 3);
        assert_eq!(report.comparison.len(), 3);
        assert_eq!(report.levels.len(), 3);
        assert!(report.levels.iter().all(|r| r.signal != BandSignal::NoData));

        assert_eq!(report.period.data_points, 400);
        assert_eq!(report.period.start, series.first().unwrap().timestamp);
        assert!(report.notes.is_empty());
    }

    #[test]
    fn classical_mode_skips_comparison() {
        let series = series_from(&walk(300, 5));
        let mut cfg = AnalysisConfig::default();
        cfg.exponent_mode = ExponentMode::Classical;
        let report = analyze(&series, &cfg).unwrap();
        assert_eq!(report.exponent, Some(0.5));
        assert!(report.bands.is_some());
        assert!(report.comparison.is_empty());
    }

    #[test]
    fn flat_series_has_no_hurst_and_no_fractal_bands() {
        let series = series_from(&[100.0; 150]);
        let report = analyze(&series, &AnalysisConfig::default()).unwrap();
        assert!(report.hurst.is_none());
        assert!(report.regime.is_none());
        assert!(report.bands.is_none());
        assert!(report.levels.is_empty());
        assert!(report.rolling.is_empty());
        assert!(!report.notes.is_empty());
    }

    #[test]
    fn short_series_notes_missing_long_horizon() {
        let series = series_from(&walk(150, 9));
        let mut cfg = AnalysisConfig::default();
        cfg.exponent_mode = ExponentMode::Classical;
        let report = analyze(&series, &cfg).unwrap();
        let long = report.levels.iter().find(|r| r.horizon == "long").unwrap();
        assert_eq!(long.signal, BandSignal::NoData);
        assert!(report.notes.iter().any(|n| n.contains("long")));
        assert!(report.rolling.is_empty());
    }
}
