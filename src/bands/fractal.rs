// =============================================================================
// Fractal Bands
// =============================================================================
//
// Volatility envelopes whose width scales with the horizon according to an
// exponent e instead of the fixed square-root-of-time rule. For a horizon of
// N trading days:
//
//   ma    = SMA(close, N)
//   hvol  = stdev(log returns over N) * sqrt(252)
//   sigma = hvol * close * (N / 252)^e
//   upper = ma + sigma,  lower = ma - sigma
//
// With e = 0.5 these are the classical volatility bands. With e = H the band
// follows the R/S scaling law R/S ~ n^H.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bands::signal::{classify_signal, BandSignal};
use crate::hurst::returns::log_returns;
use crate::stats::{mean, safe_pct, sample_std};
use crate::types::PricePoint;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Exponent of the classical square-root-of-time rule.
pub const CLASSICAL_EXPONENT: f64 = 0.5;

/// Which exponent drives the band scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExponentMode {
    /// Use the estimated Hurst exponent.
    #[default]
    Fractal,
    /// Use 0.5 regardless of H.
    Classical,
}

impl ExponentMode {
    /// Effective exponent. In fractal mode a missing H stays missing rather
    /// than falling back to 0.5.
    pub fn resolve(self, hurst: Option<f64>) -> Option<f64> {
        match self {
            Self::Fractal => hurst,
            Self::Classical => Some(CLASSICAL_EXPONENT),
        }
    }
}

impl std::fmt::Display for ExponentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fractal => write!(f, "H (fractal)"),
            Self::Classical => write!(f, "0.5 (classical)"),
        }
    }
}

/// A named lookback window in trading days.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Horizon {
    pub name: String,
    pub window: usize,
}

impl Horizon {
    pub fn new(name: impl Into<String>, window: usize) -> Self {
        Self {
            name: name.into(),
            window,
        }
    }

    /// Short (3 weeks), medium (3 months) and long (12 months).
    pub fn defaults() -> Vec<Horizon> {
        vec![
            Horizon::new("short", 21),
            Horizon::new("medium", 63),
            Horizon::new("long", 252),
        ]
    }
}

/// Band levels at one point of the series. Levels are `None` during warm-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub ma: Option<f64>,
    /// Annualised volatility of log returns.
    pub hvol: Option<f64>,
    /// Band half-width.
    pub sigma: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

impl BandPoint {
    pub fn width(&self) -> Option<f64> {
        Some(self.upper? - self.lower?)
    }

    pub fn signal(&self) -> BandSignal {
        classify_signal(self.close, self.upper, self.lower, self.ma)
    }
}

/// Support / resistance reference row for one horizon at the latest close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonLevels {
    pub horizon: String,
    pub window: usize,
    pub close: f64,
    pub support: Option<f64>,
    pub mid: Option<f64>,
    pub resistance: Option<f64>,
    pub signal: BandSignal,
    /// `(resistance - close) / close * 100`.
    pub to_resistance_pct: Option<f64>,
    /// `(close - support) / close * 100`.
    pub to_support_pct: Option<f64>,
}

/// Band time series for one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonBands {
    pub horizon: Horizon,
    pub points: Vec<BandPoint>,
}

impl HorizonBands {
    pub fn latest(&self) -> Option<&BandPoint> {
        self.points.last()
    }

    /// Trailing `count` points, for charting.
    pub fn tail(&self, count: usize) -> &[BandPoint] {
        let start = self.points.len().saturating_sub(count);
        &self.points[start..]
    }

    pub fn levels(&self) -> Option<HorizonLevels> {
        let last = self.latest()?;
        Some(HorizonLevels {
            horizon: self.horizon.name.clone(),
            window: self.horizon.window,
            close: last.close,
            support: last.lower,
            mid: last.ma,
            resistance: last.upper,
            signal: last.signal(),
            to_resistance_pct: last.upper.and_then(|u| safe_pct(u - last.close, last.close)),
            to_support_pct: last.lower.and_then(|l| safe_pct(last.close - l, last.close)),
        })
    }
}

/// Bands for every requested horizon, computed with one exponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSet {
    pub exponent: f64,
    pub horizons: Vec<HorizonBands>,
}

impl BandSet {
    pub fn get(&self, name: &str) -> Option<&HorizonBands> {
        self.horizons.iter().find(|h| h.horizon.name == name)
    }

    pub fn levels(&self) -> Vec<HorizonLevels> {
        self.horizons.iter().filter_map(HorizonBands::levels).collect()
    }
}

/// `(window / 252)^exponent`. The classical exponent goes through `sqrt` so
/// that classical widths come out bit-for-bit as `sqrt(N / 252)`.
pub fn scale_factor(window: usize, exponent: f64) -> f64 {
    let t = window as f64 / TRADING_DAYS_PER_YEAR;
    if exponent == CLASSICAL_EXPONENT {
        t.sqrt()
    } else {
        t.powf(exponent)
    }
}

/// Compute bands for every horizon over the full bar history.
pub fn compute_bands(bars: &[PricePoint], exponent: f64, horizons: &[Horizon]) -> BandSet {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let returns = log_returns(&closes);

    BandSet {
        exponent,
        horizons: horizons
            .iter()
            .map(|h| compute_horizon(bars, &closes, &returns, exponent, h))
            .collect(),
    }
}

fn compute_horizon(
    bars: &[PricePoint],
    closes: &[f64],
    returns: &[f64],
    exponent: f64,
    horizon: &Horizon,
) -> HorizonBands {
    let n = horizon.window;
    let scale = scale_factor(n, exponent);
    let annualise = TRADING_DAYS_PER_YEAR.sqrt();

    let points = bars
        .iter()
        .enumerate()
        .map(|(t, bar)| {
            let ma = (n > 0 && t + 1 >= n)
                .then(|| mean(&closes[t + 1 - n..=t]))
                .flatten();
            // returns[k] is the move from close k to close k + 1, so the N
            // returns ending at t are returns[t - N .. t].
            let hvol = (n > 0 && t >= n)
                .then(|| sample_std(&returns[t - n..t]))
                .flatten()
                .map(|s| s * annualise);
            let sigma = hvol
                .map(|v| v * bar.close * scale)
                .filter(|s| s.is_finite());

            let (upper, lower) = match (ma, sigma) {
                (Some(m), Some(s)) => (Some(m + s), Some(m - s)),
                _ => (None, None),
            };

            BandPoint {
                index: t,
                timestamp: bar.timestamp,
                close: bar.close,
                ma,
                hvol,
                sigma,
                upper,
                lower,
            }
        })
        .collect();

    HorizonBands {
        horizon: horizon.clone(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bars(closes: &[f64]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::close_only(start + Duration::days(i as i64), c))
            .collect()
    }

    fn oscillating(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.05)
            .collect()
    }

    #[test]
    fn exponent_mode_resolution() {
        assert_eq!(ExponentMode::Fractal.resolve(Some(0.62)), Some(0.62));
        assert_eq!(ExponentMode::Fractal.resolve(None), None);
        assert_eq!(ExponentMode::Classical.resolve(None), Some(0.5));
        assert_eq!(ExponentMode::Classical.resolve(Some(0.62)), Some(0.5));
    }

    #[test]
    fn warm_up_is_none() {
        let data = bars(&oscillating(40));
        let set = compute_bands(&data, 0.5, &[Horizon::new("short", 21)]);
        let points = &set.horizons[0].points;
        assert_eq!(points.len(), 40);
        assert!(points[19].ma.is_none());
        assert!(points[20].ma.is_some());
        // ma is ready at 20 but hvol needs 21 returns.
        assert!(points[20].upper.is_none());
        assert!(points[21].upper.is_some());
    }

    #[test]
    fn classical_exponent_reproduces_sqrt_of_time_exactly() {
        let data = bars(&oscillating(300));
        let set = compute_bands(&data, CLASSICAL_EXPONENT, &Horizon::defaults());
        for hb in &set.horizons {
            let n = hb.horizon.window as f64;
            for p in hb.points.iter().filter(|p| p.sigma.is_some()) {
                let expected = p.hvol.unwrap() * p.close * (n / 252.0).sqrt();
                assert_eq!(p.sigma.unwrap(), expected);
            }
        }
    }

    #[test]
    fn band_values_match_manual_computation() {
        let closes = oscillating(30);
        let data = bars(&closes);
        let set = compute_bands(&data, 0.7, &[Horizon::new("h", 10)]);
        let p = set.horizons[0].points[25];

        let ma: f64 = closes[16..=25].iter().sum::<f64>() / 10.0;
        let rets: Vec<f64> = (16..=25).map(|k| (closes[k] / closes[k - 1]).ln()).collect();
        let m = rets.iter().sum::<f64>() / 10.0;
        let sd = (rets.iter().map(|r| (r - m).powi(2)).sum::<f64>() / 9.0).sqrt();
        let sigma = sd * 252.0_f64.sqrt() * closes[25] * (10.0_f64 / 252.0).powf(0.7);

        assert!((p.ma.unwrap() - ma).abs() < 1e-9);
        assert!((p.sigma.unwrap() - sigma).abs() < 1e-9);
        assert!((p.upper.unwrap() - (ma + sigma)).abs() < 1e-9);
        assert!((p.lower.unwrap() - (ma - sigma)).abs() < 1e-9);
    }

    #[test]
    fn higher_exponent_narrows_short_horizons() {
        // N / 252 < 1, so a larger exponent shrinks the band.
        let data = bars(&oscillating(100));
        let horizon = [Horizon::new("short", 21)];
        let persistent = compute_bands(&data, 0.7, &horizon);
        let classical = compute_bands(&data, 0.5, &horizon);
        let wp = persistent.horizons[0].latest().unwrap().width().unwrap();
        let wc = classical.horizons[0].latest().unwrap().width().unwrap();
        assert!(wp < wc);
    }

    #[test]
    fn full_year_horizon_is_exponent_invariant() {
        let data = bars(&oscillating(300));
        let horizon = [Horizon::new("long", 252)];
        let a = compute_bands(&data, 0.3, &horizon);
        let b = compute_bands(&data, 0.8, &horizon);
        assert_eq!(
            a.horizons[0].latest().unwrap().sigma,
            b.horizons[0].latest().unwrap().sigma
        );
    }

    #[test]
    fn flat_prices_collapse_bands() {
        let data = bars(&[100.0; 30]);
        let set = compute_bands(&data, 0.5, &[Horizon::new("h", 10)]);
        let last = set.horizons[0].latest().unwrap();
        assert_eq!(last.upper, Some(100.0));
        assert_eq!(last.lower, Some(100.0));
    }

    #[test]
    fn degenerate_windows() {
        let data = bars(&oscillating(30));
        let set = compute_bands(&data, 0.5, &[Horizon::new("zero", 0), Horizon::new("one", 1)]);
        assert!(set.horizons[0].points.iter().all(|p| p.upper.is_none()));
        assert!(set.horizons[1].points.iter().all(|p| p.upper.is_none()));
        assert!(set.horizons[1].points.iter().all(|p| p.ma.is_some()));
    }

    #[test]
    fn levels_and_distances() {
        let data = bars(&oscillating(100));
        let set = compute_bands(&data, 0.5, &[Horizon::new("short", 21)]);
        let levels = set.levels();
        assert_eq!(levels.len(), 1);
        let row = &levels[0];
        let close = row.close;
        let expected = (row.resistance.unwrap() - close) / close * 100.0;
        assert!((row.to_resistance_pct.unwrap() - expected).abs() < 1e-12);
        assert!(row.support.unwrap() < row.resistance.unwrap());
        assert_ne!(row.signal, BandSignal::NoData);
    }

    #[test]
    fn levels_without_history_are_no_data() {
        let data = bars(&oscillating(5));
        let set = compute_bands(&data, 0.5, &[Horizon::new("short", 21)]);
        let row = &set.levels()[0];
        assert_eq!(row.signal, BandSignal::NoData);
        assert!(row.to_support_pct.is_none());
    }

    #[test]
    fn lookup_and_tail() {
        let data = bars(&oscillating(50));
        let set = compute_bands(&data, 0.5, &Horizon::defaults());
        assert!(set.get("medium").is_some());
        assert!(set.get("missing").is_none());
        assert_eq!(set.get("short").unwrap().tail(10).len(), 10);
        assert_eq!(set.get("short").unwrap().tail(500).len(), 50);
    }
}
