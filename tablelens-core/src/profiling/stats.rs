//! Numeric statistics primitives.
//!
//! All functions operate on finite values; callers filter unparsable input
//! before reaching here.

use super::models::NumericStats;

/// Number of equal-width histogram bins.
pub const HISTOGRAM_BINS: usize = 5;

/// Rounds to `decimals` decimal places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Returns `part / whole` as a percentage rounded to one decimal, or 0 for
/// an empty whole.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}

/// Arithmetic mean. Zero for an empty slice.
///
/// Falls back to a scaled sum when the plain sum overflows.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return sum / n;
    }
    let scale = max_magnitude(values);
    values.iter().map(|v| v / scale).sum::<f64>() / n * scale
}

/// Median of an ascending slice. Zero for an empty slice.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    if n % 2 == 0 {
        midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Population standard deviation (divides by n, not n-1).
pub fn population_stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if variance.is_finite() {
        return variance.sqrt();
    }
    let scale = max_magnitude(values).max(mean.abs());
    let scaled = values
        .iter()
        .map(|v| (v / scale - mean / scale).powi(2))
        .sum::<f64>()
        / n;
    scaled.sqrt() * scale
}

/// Builds an equal-width histogram over `[min, max]`.
///
/// Returns `None` for a degenerate range. Values landing past the last bin,
/// notably `max` itself, are counted in the last bin.
pub fn histogram(values: &[f64], min: f64, max: f64) -> Option<Vec<u64>> {
    if max <= min {
        return None;
    }

    let bin_count = HISTOGRAM_BINS as f64;
    let range = max - min;
    let width = range / bin_count;
    let mut bins = vec![0u64; HISTOGRAM_BINS];
    for value in values {
        let position = if range.is_finite() {
            (value - min) / width
        } else {
            // Halving keeps both differences finite
            (value / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0) * bin_count
        };
        let index = if position.is_finite() && position < bin_count {
            (position.floor().max(0.0) as usize).min(HISTOGRAM_BINS - 1)
        } else {
            HISTOGRAM_BINS - 1
        };
        bins[index] += 1;
    }
    Some(bins)
}

fn midpoint(a: f64, b: f64) -> f64 {
    if a.is_sign_negative() == b.is_sign_negative() {
        a + (b - a) / 2.0
    } else {
        (a + b) / 2.0
    }
}

fn max_magnitude(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Computes the full statistics block for a column's numeric values.
///
/// `values` need not be sorted. Returns `None` when there are no values.
pub fn numeric_stats(mut values: Vec<f64>) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let min = values[0];
    let max = values[values.len() - 1];
    // Rounding in the scaled paths may step just outside the range
    let mean = mean(&values).clamp(min, max);

    Some(NumericStats {
        min,
        max,
        mean,
        median: median(&values).clamp(min, max),
        stddev: population_stddev(&values, mean),
        histogram: histogram(&values, min, max),
    })
}
