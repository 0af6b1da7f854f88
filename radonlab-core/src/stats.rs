//! Statistic formulas: pure functions shared by campaigns and population distributions.
//!
//! Every function is a pure function: values in, scalar out. Quantiles use the
//! non-interpolated empirical convention `floor(N * p / 100) - 1`, clamped to
//! `[0, N - 1]`, so results stay comparable with earlier protocol evaluations.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (denominator N, not N - 1).
pub fn population_deviation(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / values.len() as f64).sqrt()
}

/// Natural log with zero substitution: non-positive inputs map to 0.0.
///
/// Zero and negative concentrations are not errors; they contribute a
/// neutral term to logarithmic means.
pub fn log_or_zero(value: f64) -> f64 {
    if value > 0.0 {
        value.ln()
    } else {
        0.0
    }
}

/// Geometric mean via the log transform: `exp(mean(ln v))`, with `ln v = 0` for `v <= 0`.
pub fn geometric_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = values.iter().map(|&v| log_or_zero(v)).sum();
    (log_sum / values.len() as f64).exp()
}

/// Index of the p-th quantile in a sorted sequence of length `n`.
///
/// `floor(n * p / 100) - 1`, clamped to `[0, n - 1]`. Returns 0 for `n == 0`.
pub fn quantile_index(n: usize, p: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let raw = (n as f64 * p / 100.0).floor() as i64 - 1;
    raw.clamp(0, n as i64 - 1) as usize
}

/// Index of the median in a sorted sequence of length `n`: `floor(n / 2) - 1`, clamped.
pub fn median_index(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    (n / 2).saturating_sub(1).min(n - 1)
}

/// p-th quantile of an ascending-sorted slice. Returns 0.0 for an empty slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted[quantile_index(sorted.len(), p)]
}

/// Median of an ascending-sorted slice. Returns 0.0 for an empty slice.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted[median_index(sorted.len())]
}

/// Sort ascending in place by IEEE total order, the same order population
/// distributions use.
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}

/// Coefficient of variation: deviation / mean. Returns 0.0 when the mean is zero.
pub fn calculate_cv(mean: f64, deviation: f64) -> f64 {
    if mean == 0.0 {
        return 0.0;
    }
    deviation / mean
}

/// Quantile deviation: (Q95 - Q5) / Q50. Returns 0.0 when the median is zero.
pub fn calculate_qd(q05: f64, median: f64, q95: f64) -> f64 {
    if median == 0.0 {
        return 0.0;
    }
    (q95 - q05) / median
}

/// Geometric standard deviation over the original values and their geometric mean.
///
/// `exp(sqrt(mean((ln v - ln gm)^2)))`, population denominator, zero substitution
/// for non-positive values and a non-positive geometric mean.
pub fn calculate_gsd(values: &[f64], geometric_mean: f64) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let log_gm = log_or_zero(geometric_mean);
    let sum_sq: f64 = values
        .iter()
        .map(|&v| (log_or_zero(v) - log_gm).powi(2))
        .sum();
    (sum_sq / values.len() as f64).sqrt().exp()
}

/// n!, saturating at `u128::MAX` (n > 34).
pub fn calculate_factorial(n: u32) -> u128 {
    (1..=n as u128).fold(1u128, |acc, k| acc.saturating_mul(k))
}

/// Binomial coefficient C(n, k). Returns 0 for k > n.
pub fn binomial(n: u64, k: u64) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    // Multiplicative form keeps intermediates exact: each prefix is itself a binomial.
    (0..k).fold(1u128, |acc, i| {
        acc.saturating_mul((n - i) as u128) / (i + 1) as u128
    })
}

/// Stirling number of the second kind S(n, k): partitions of n items into k non-empty blocks.
pub fn stirling_second(n: u32, k: u32) -> u128 {
    if k > n {
        return 0;
    }
    // row[j] holds S(i, j) for the current i.
    let mut row = vec![0u128; k as usize + 1];
    row[0] = 1;
    for _ in 0..n {
        for j in (1..=k as usize).rev() {
            row[j] = (j as u128).saturating_mul(row[j]).saturating_add(row[j - 1]);
        }
        row[0] = 0;
    }
    row[k as usize]
}

/// Number of surjections from `slots` positions onto `k` labelled values: `k! * S(slots, k)`.
pub fn surjections(slots: u32, k: u32) -> u128 {
    calculate_factorial(k).saturating_mul(stirling_second(slots, k))
}
