// =============================================================================
// Fractal vs classical band width
// =============================================================================
//
// Both band sets share ma and hvol, so the width difference reduces to the
// ratio of the horizon scale factors:
//
//   ratio = (N / 252)^H / (N / 252)^0.5
//
// Positive differences mean the fractal model sees more risk than sqrt(T).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bands::fractal::{scale_factor, BandSet, CLASSICAL_EXPONENT};
use crate::stats::safe_pct;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthDifference {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// `(fractal_width - classical_width) / classical_width * 100`.
    pub diff_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonComparison {
    pub horizon: String,
    pub window: usize,
    pub scale_ratio: f64,
    pub latest_diff_pct: Option<f64>,
    pub points: Vec<WidthDifference>,
}

/// Width multiplier of the fractal band relative to the classical one.
pub fn scale_ratio(window: usize, hurst: f64) -> f64 {
    scale_factor(window, hurst) / scale_factor(window, CLASSICAL_EXPONENT)
}

/// Compare two band sets horizon by horizon (matched by name). Points where
/// either width is missing or the classical width is zero are left out.
pub fn compare_to_classical(fractal: &BandSet, classical: &BandSet) -> Vec<HorizonComparison> {
    fractal
        .horizons
        .iter()
        .filter_map(|fh| {
            let ch = classical.get(&fh.horizon.name)?;
            let points: Vec<WidthDifference> = fh
                .points
                .iter()
                .zip(&ch.points)
                .filter_map(|(f, c)| {
                    let diff_pct = safe_pct(f.width()? - c.width()?, c.width()?)?;
                    Some(WidthDifference {
                        index: f.index,
                        timestamp: f.timestamp,
                        diff_pct,
                    })
                })
                .collect();

            let latest_index = fh.latest().map(|p| p.index);
            let latest_diff_pct = points
                .last()
                .filter(|p| Some(p.index) == latest_index)
                .map(|p| p.diff_pct);

            Some(HorizonComparison {
                horizon: fh.horizon.name.clone(),
                window: fh.horizon.window,
                scale_ratio: scale_ratio(fh.horizon.window, fractal.exponent),
                latest_diff_pct,
                points,
            })
        })
        .collect()
}
