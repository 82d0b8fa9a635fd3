// =============================================================================
// Rescaled Range (R/S) statistic
// =============================================================================
//
// For a chunk size s the return series is split into non-overlapping chunks of
// exactly s values (any incomplete tail is dropped). For each chunk:
//
//   - deviation series = cumulative sum of (x - mean)
//   - R = max(deviation) - min(deviation)
//   - S = sample standard deviation (n - 1)
//   - R/S is recorded when S > 0
//
// The statistic for s is the mean of the recorded R/S values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::stats::{mean, sample_std};

/// Smallest chunk size that still admits a sample standard deviation.
const MIN_ADMISSIBLE_CHUNK: usize = 2;

/// Mean rescaled range observed at one chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsPoint {
    pub chunk_size: usize,
    pub mean_rs: f64,
}

/// Admissible chunk sizes for `n` returns: the distinct values of `n / k` for
/// `k = 2..=n` that are at least `min_chunk`, in ascending order.
pub fn chunk_sizes(n: usize, min_chunk: usize) -> Vec<usize> {
    let floor = min_chunk.max(MIN_ADMISSIBLE_CHUNK);
    // n / k is non-increasing in k, so the first size below the floor ends it.
    (2..=n)
        .map(|k| n / k)
        .take_while(|&size| size >= floor)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Rescaled range of a single chunk, or `None` for a zero-variance chunk.
fn chunk_rs(chunk: &[f64]) -> Option<f64> {
    let m = mean(chunk)?;
    let std_dev = sample_std(chunk)?;
    if std_dev <= f64::EPSILON {
        return None;
    }

    let (lo, hi, _) = chunk.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64),
        |(lo, hi, running), &x| {
            let running = running + (x - m);
            (lo.min(running), hi.max(running), running)
        },
    );

    let rs = (hi - lo) / std_dev;
    rs.is_finite().then_some(rs)
}

/// Mean R/S over every complete chunk of `size` returns.
///
/// Returns `None` when `size` is below two or above the series length, or when
/// every chunk is degenerate.
pub fn rescaled_range(returns: &[f64], size: usize) -> Option<f64> {
    if size < MIN_ADMISSIBLE_CHUNK || size > returns.len() {
        return None;
    }

    let observations: Vec<f64> = returns.chunks_exact(size).filter_map(chunk_rs).collect();
    mean(&observations)
}

/// R/S points for every admissible chunk size, dropping sizes with no valid
/// observation.
pub fn rs_points(returns: &[f64], sizes: &[usize]) -> Vec<RsPoint> {
    sizes
        .iter()
        .filter_map(|&chunk_size| {
            rescaled_range(returns, chunk_size).map(|mean_rs| RsPoint {
                chunk_size,
                mean_rs,
            })
        })
        .collect()
}
