//! Statistical utilities for quantitative analysis.
//!
//! Slice-level helpers shared by the indicator library and the pair
//! analyzer. Functions that have no meaningful answer for short or
//! degenerate input return `None`; callers pick the fallback.

use std::cmp::Ordering;

/// Standard deviation, relative to the data's magnitude, treated as zero.
///
/// Constant inputs rarely give an exact 0 after the mean subtraction; the
/// residue is a few ulps of the mean and must not be divided by.
pub const DISPERSION_TOLERANCE: f64 = 1e-12;

/// True when `std` is zero or rounding residue for data centred on `mean`.
/// NaN counts as negligible.
pub fn negligible_dispersion(std: f64, mean: f64) -> bool {
    !(std > DISPERSION_TOLERANCE * mean.abs().max(1.0))
}

/// Mean of a slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance.
pub fn variance(values: &[f64]) -> Option<f64> {
    let mean_val = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean_val).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Sample variance (n-1 denominator).
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean_val = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean_val).powi(2)).sum();
    Some(sum_sq / (n - 1) as f64)
}

/// Sample standard deviation (n-1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Simple returns `(p[i] - p[i-1]) / p[i-1]`, length N-1.
///
/// A zero previous price yields a 0 return so the output stays aligned.
pub fn returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Log returns `ln(p[i] / p[i-1])`, length N-1; 0 where either price is non-positive.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| safe_ln_ratio(w[1], w[0]))
        .collect()
}

/// `ln(num / den)`, or 0 when either side is non-positive.
#[inline]
pub fn safe_ln_ratio(num: f64, den: f64) -> f64 {
    if num > 0.0 && den > 0.0 {
        (num / den).ln()
    } else {
        0.0
    }
}

/// `num / den`, or 0 when `den` is 0.
#[inline]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

/// Population covariance between two equally long series.
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;
    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    Some(sum / x.len() as f64)
}

/// Pearson correlation; `None` when either side is constant.
pub fn correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let cov = covariance(x, y)?;
    let std_x = std_dev(x)?;
    let std_y = std_dev(y)?;
    if negligible_dispersion(std_x, mean(x)?) || negligible_dispersion(std_y, mean(y)?) {
        return None;
    }
    Some(cov / (std_x * std_y))
}

/// Fractional ranks (1-based); ties share the average rank.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut out = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            out[idx] = avg;
        }
        i = j + 1;
    }
    out
}

/// Kendall tau-a: (concordant - discordant) / (n(n-1)/2). 0 below two points.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mut score = 0i64;
    for i in 0..n {
        for j in i + 1..n {
            let p = (x[j] - x[i]) * (y[j] - y[i]);
            if p > 0.0 {
                score += 1;
            } else if p < 0.0 {
                score -= 1;
            }
        }
    }
    score as f64 / (n * (n - 1) / 2) as f64
}

/// Population skewness; 0 when the standard deviation is 0.
pub fn skewness(values: &[f64]) -> f64 {
    let (Some(m), Some(sd)) = (mean(values), std_dev(values)) else {
        return 0.0;
    };
    if negligible_dispersion(sd, m) {
        return 0.0;
    }
    values.iter().map(|v| ((v - m) / sd).powi(3)).sum::<f64>() / values.len() as f64
}

/// Population excess kurtosis; 0 when the standard deviation is 0.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    let (Some(m), Some(sd)) = (mean(values), std_dev(values)) else {
        return 0.0;
    };
    if negligible_dispersion(sd, m) {
        return 0.0;
    }
    values.iter().map(|v| ((v - m) / sd).powi(4)).sum::<f64>() / values.len() as f64 - 3.0
}

/// Closed-form OLS slope of `y` against the index `0..n`.
pub fn index_slope(y: &[f64]) -> f64 {
    let n = y.len() as f64;
    if y.len() < 2 {
        return 0.0;
    }
    let sum_x = n * (n - 1.0) / 2.0;
    let sum_x2 = (n - 1.0) * n * (2.0 * n - 1.0) / 6.0;
    let (sum_y, sum_xy) = y
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sy, sxy), (i, &v)| (sy + v, sxy + i as f64 * v));
    let denom = n * sum_x2 - sum_x * sum_x;
    safe_div(n * sum_xy - sum_x * sum_y, denom)
}

/// Percentile of a sorted slice with linear interpolation, `pct` in [0, 1].
pub fn percentile(sorted_values: &[f64], pct: f64) -> Option<f64> {
    if sorted_values.is_empty() || !(0.0..=1.0).contains(&pct) {
        return None;
    }
    let n = sorted_values.len();
    if n == 1 {
        return Some(sorted_values[0]);
    }

    let idx = pct * (n - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if upper >= n {
        Some(sorted_values[n - 1])
    } else {
        Some(sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac)
    }
}

/// Sort a copy ascending, with NaNs treated as equal.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = std_dev(&values).unwrap();
        assert!((std - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_returns_keep_alignment() {
        let prices = [100.0, 110.0, 0.0, 121.0];
        let rets = returns(&prices);
        assert_eq!(rets.len(), 3);
        assert!((rets[0] - 0.1).abs() < 1e-12);
        assert_eq!(rets[2], 0.0);
        assert_eq!(log_returns(&[1.0, -1.0, 2.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((correlation(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!(correlation(&x, &[1.0; 5]).is_none());
    }

    #[test]
    fn test_ranks_average_ties() {
        assert_eq!(ranks(&[10.0, 30.0, 20.0, 20.0]), vec![1.0, 4.0, 2.5, 2.5]);
    }

    #[test]
    fn test_kendall_tau() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((kendall_tau(&x, &x) - 1.0).abs() < 1e-12);
        assert!((kendall_tau(&x, &[4.0, 3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_moments_of_constant_series() {
        assert_eq!(skewness(&[3.0; 10]), 0.0);
        assert_eq!(excess_kurtosis(&[3.0; 10]), 0.0);
        let symmetric = [-2.0, -1.0, 0.0, 1.0, 2.0];
        assert!(skewness(&symmetric).abs() < 1e-12);
    }

    #[test]
    fn test_rounding_residue_is_not_dispersion() {
        for c in [0.01, 0.013, 0.1, 1e-4] {
            let flat = vec![c; 30];
            let sd = std_dev(&flat).unwrap();
            assert!(negligible_dispersion(sd, c), "{c}: {sd}");
            assert_eq!(skewness(&flat), 0.0);
            assert_eq!(correlation(&flat, &(0..30).map(|i| i as f64).collect::<Vec<_>>()), None);
        }
        assert!(negligible_dispersion(0.0, 0.0));
        assert!(negligible_dispersion(f64::NAN, 1.0));
        assert!(!negligible_dispersion(1e-6, 0.01));
        assert!(!negligible_dispersion(0.5, 100.0));
    }

    #[test]
    fn test_index_slope() {
        assert!((index_slope(&[1.0, 3.0, 5.0, 7.0]) - 2.0).abs() < 1e-12);
        assert_eq!(index_slope(&[5.0]), 0.0);
    }

    #[test]
    fn test_percentile() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert!((percentile(&sorted, 0.5).unwrap() - 5.5).abs() < 0.0001);
        assert!((percentile(&sorted, 0.0).unwrap() - 1.0).abs() < 0.0001);
        assert!((percentile(&sorted, 1.0).unwrap() - 10.0).abs() < 0.0001);
    }
}
