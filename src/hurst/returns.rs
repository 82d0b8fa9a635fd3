/// Prices at or below zero (or non-finite) are lifted to this floor before the
/// logarithm is taken.
pub const PRICE_FLOOR: f64 = 1e-12;

/// Convert a price sequence into log returns: `r[i] = ln(p[i+1] / p[i])`.
///
/// Fewer than two prices yields an empty vector.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| floored(w[1]).ln() - floored(w[0]).ln())
        .collect()
}

fn floored(price: f64) -> f64 {
    if price.is_finite() {
        price.max(PRICE_FLOOR)
    } else {
        PRICE_FLOOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_empty() {
        assert!(log_returns(&[]).is_empty());
        assert!(log_returns(&[100.0]).is_empty());
    }

    #[test]
    fn returns_length_and_values() {
        let r = log_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - (1.1_f64).ln()).abs() < 1e-12);
        assert!((r[1] - (99.0_f64 / 110.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn non_positive_prices_are_clamped() {
        let r = log_returns(&[100.0, 0.0, -5.0, 100.0]);
        assert_eq!(r.len(), 3);
        assert!(r.iter().all(|v| v.is_finite()));
        // Both 0 and -5 collapse to the floor, so the middle return is zero.
        assert_eq!(r[1], 0.0);
    }

    #[test]
    fn nan_price_is_clamped() {
        let r = log_returns(&[100.0, f64::NAN, 100.0]);
        assert!(r.iter().all(|v| v.is_finite()));
    }
}
