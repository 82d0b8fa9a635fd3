// =============================================================================
// Shared numeric helpers
// =============================================================================
//
// Small building blocks reused by the R/S estimator and the band calculator.
// Everything returns `Option` instead of NaN so that callers never have to
// special-case non-finite values.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (denominator n - 1).
///
/// Returns `None` for fewer than two observations or a non-finite result.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let std_dev = variance.sqrt();
    std_dev.is_finite().then_some(std_dev)
}

/// Result of an ordinary least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least-squares: slope = Σ((x-x̄)(y-ȳ)) / Σ((x-x̄)²).
///
/// Returns `None` when the inputs differ in length, hold fewer than two
/// points, all x-values coincide, or the fit is non-finite.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let x_mean = mean(x)?;
    let y_mean = mean(y)?;

    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        numerator += dx * (yi - y_mean);
        denominator += dx * dx;
    }

    if denominator.abs() < f64::EPSILON {
        return None;
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;
    (slope.is_finite() && intercept.is_finite()).then_some(LinearFit { slope, intercept })
}

/// Round to a fixed number of decimal places. Values that cannot be scaled
/// without overflowing are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals.min(i32::MAX as u32) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// `numerator / denominator * 100`, or `None` when the ratio is undefined.
pub fn safe_pct(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let pct = numerator / denominator * 100.0;
    pct.is_finite().then_some(pct)
}
