//! Distributional and time-series statistics over rolling windows.

use crate::rolling::window_apply;
use crate::stats::{self, safe_div, safe_ln_ratio};

/// Population skewness of each window.
pub fn rolling_skewness(values: &[f64], w: usize) -> Vec<f64> {
    window_apply(values, w, stats::skewness)
}

/// Population excess kurtosis of each window.
pub fn rolling_kurtosis(values: &[f64], w: usize) -> Vec<f64> {
    window_apply(values, w, stats::excess_kurtosis)
}

/// `ln(p[i] / p[i-lag])`, 0 when either price is non-positive. N-lag.
pub fn log_pct_change(prices: &[f64], lag: usize) -> Vec<f64> {
    window_apply(prices, lag + 1, |win| safe_ln_ratio(win[lag], win[0]))
}

/// Lag-`lag` autocorrelation inside each `w`-sample window; 0 when degenerate.
pub fn auto_correlation(values: &[f64], w: usize, lag: usize) -> Vec<f64> {
    if lag >= w {
        return Vec::new();
    }
    window_apply(values, w, |win| {
        stats::correlation(&win[..w - lag], &win[lag..]).unwrap_or(0.0)
    })
}

/// `(last - mean) / std` of each window (population std); 0 when std is 0.
pub fn z_score(values: &[f64], w: usize) -> Vec<f64> {
    window_apply(values, w, |win| {
        let mean = stats::mean(win).unwrap_or(0.0);
        let sd = stats::std_dev(win).unwrap_or(0.0);
        safe_div(win[win.len() - 1] - mean, sd)
    })
}

/// Share of the preceding window values strictly below the last, 0-100.
pub fn percentile_rank(values: &[f64], w: usize) -> Vec<f64> {
    window_apply(values, w, |win| {
        let last = win[win.len() - 1];
        let below = win[..win.len() - 1].iter().filter(|&&v| v < last).count();
        safe_div(100.0 * below as f64, (win.len() - 1) as f64)
    })
}

/// Population std over mean of each window; 0 when the mean is 0.
pub fn coefficient_of_variation(values: &[f64], w: usize) -> Vec<f64> {
    window_apply(values, w, |win| {
        let mean = stats::mean(win).unwrap_or(0.0);
        safe_div(stats::std_dev(win).unwrap_or(0.0), mean)
    })
}

/// Rescaled-range Hurst estimate over log prices, clamped to [0, 1].
///
/// Uses the log returns inside each `w`-price window: `H = ln(R/S) / ln(n)`
/// with `n = w - 1`. Degenerate windows (flat prices, `n < 2`) yield 0.
pub fn hurst_exponent(prices: &[f64], w: usize) -> Vec<f64> {
    window_apply(prices, w, |win| {
        let rets: Vec<f64> = win.windows(2).map(|p| safe_ln_ratio(p[1], p[0])).collect();
        let n = rets.len();
        if n < 2 {
            return 0.0;
        }
        let mean = rets.iter().sum::<f64>() / n as f64;
        let (mut cum, mut lo, mut hi) = (0.0f64, 0.0f64, 0.0f64);
        for r in &rets {
            cum += r - mean;
            lo = lo.min(cum);
            hi = hi.max(cum);
        }
        let range = hi - lo;
        let sd = stats::std_dev(&rets).unwrap_or(0.0);
        if range <= 0.0 || stats::negligible_dispersion(sd, mean) {
            return 0.0;
        }
        ((range / sd).ln() / (n as f64).ln()).clamp(0.0, 1.0)
    })
}

/// Shannon entropy (nats) of each window's volume shares; 0 for zero volume.
pub fn shannon_entropy(volume: &[f64], w: usize) -> Vec<f64> {
    window_apply(volume, w, |win| {
        let total: f64 = win.iter().filter(|v| **v > 0.0).sum();
        if total <= 0.0 {
            return 0.0;
        }
        -win.iter()
            .filter(|v| **v > 0.0)
            .map(|v| {
                let p = v / total;
                p * p.ln()
            })
            .sum::<f64>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_pct_change() {
        let p = [1.0, 2.0, 4.0, -1.0];
        let out = log_pct_change(&p, 1);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 2f64.ln()).abs() < 1e-12);
        assert_eq!(out[2], 0.0);
        assert_eq!(log_pct_change(&p, 5).len(), 0);
    }

    #[test]
    fn test_z_score_flat_window_is_zero() {
        assert_eq!(z_score(&[1.0; 5], 5), vec![0.0]);
        let out = z_score(&[1.0, 1.0, 1.0, 5.0], 4);
        assert!((out[0] - 3.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_rank_bounds() {
        let rising: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(percentile_rank(&rising, 5), vec![100.0; 6]);
        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert_eq!(percentile_rank(&falling, 5), vec![0.0; 6]);
    }

    #[test]
    fn test_entropy_uniform_volume() {
        let out = shannon_entropy(&[10.0; 10], 10);
        assert!((out[0] - 10f64.ln()).abs() < 1e-12);
        assert_eq!(shannon_entropy(&[0.0; 10], 10), vec![0.0]);
    }

    #[test]
    fn test_hurst_degenerate_and_bounded() {
        assert_eq!(hurst_exponent(&[100.0; 100], 100), vec![0.0]);
        let prices: Vec<f64> = (0..150)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let out = hurst_exponent(&prices, 100);
        assert_eq!(out.len(), 51);
        assert!(out.iter().all(|h| (0.0..=1.0).contains(h)));
    }

    #[test]
    fn test_autocorrelation_of_alternating_series() {
        let alt: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let out = auto_correlation(&alt, 50, 1);
        assert_eq!(out.len(), 11);
        assert!((out[0] + 1.0).abs() < 1e-12);
        assert!(auto_correlation(&alt, 10, 10).is_empty());
    }
}
