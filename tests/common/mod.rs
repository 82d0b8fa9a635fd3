// Shared generators for the integration tests.
#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use fractal_markets::{PricePoint, PriceSeries};

/// AR(1) log-return walk driven by xorshift64. `phi = 0` is a random walk,
/// positive `phi` trends, negative `phi` mean-reverts.
pub fn pseudorandom_walk(len: usize, seed: u64, phi: f64) -> Vec<f64> {
    let mut v = Vec::with_capacity(len);
    let mut price = 100.0_f64;
    let mut state = seed;
    let mut prev = 0.0_f64;
    v.push(price);
    for _ in 1..len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let noise = ((state as f64 / u64::MAX as f64) - 0.5) * 0.01;
        let r = phi * prev + noise;
        prev = r;
        price *= r.exp();
        v.push(price);
    }
    v
}

/// Daily series starting 2020-01-01.
pub fn dated_series(closes: &[f64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let points = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::close_only(start + Duration::days(i as i64), c))
        .collect();
    PriceSeries::new(points).unwrap()
}
