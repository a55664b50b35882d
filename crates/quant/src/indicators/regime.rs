//! Regime and structural-break indicators.

use crate::rolling::window_apply;
use crate::stats::{self, safe_div};

/// Percent GARCH volatility above which a bar is flagged high-volatility.
pub const HIGH_VOLATILITY_THRESHOLD: f64 = 2.0;

/// Mean return per bar separating bull/bear from sideways.
pub const TREND_RETURN_THRESHOLD: f64 = 0.0005;

/// Two-state volatility regime from a GARCH series: 1 while the conditional
/// volatility is above its running mean, else 0. Same length as the input.
pub fn two_state_volatility_regime(garch: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    garch
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            sum += v;
            let running_mean = sum / (i + 1) as f64;
            if v > running_mean { 1.0 } else { 0.0 }
        })
        .collect()
}

/// 1 where the GARCH volatility exceeds `threshold` percent, else 0.
pub fn threshold_flag(garch: &[f64], threshold: f64) -> Vec<f64> {
    garch
        .iter()
        .map(|&v| if v > threshold { 1.0 } else { 0.0 })
        .collect()
}

/// Three-state price/volatility regime over each window of returns:
/// 2 = bull, 0 = bear, 1 = sideways. A bull or bear window whose
/// volatility exceeds `max_vol` is demoted to sideways.
pub fn three_state_regime(returns: &[f64], w: usize, max_vol: f64) -> Vec<f64> {
    window_apply(returns, w, |win| {
        let mean = stats::mean(win).unwrap_or(0.0);
        let vol = stats::std_dev(win).unwrap_or(0.0);
        if vol > max_vol {
            1.0
        } else if mean > TREND_RETURN_THRESHOLD {
            2.0
        } else if mean < -TREND_RETURN_THRESHOLD {
            0.0
        } else {
            1.0
        }
    })
}

/// Chow F-statistic for a break at the middle of each window of a linear
/// trend fit. 0 when the pooled residual is 0 or the window is too short.
pub fn chow_statistic(values: &[f64], w: usize) -> Vec<f64> {
    const K: f64 = 2.0;
    if w < 6 {
        return Vec::new();
    }
    window_apply(values, w, |win| {
        let half = w / 2;
        let pooled = trend_rss(win);
        let split = trend_rss(&win[..half]) + trend_rss(&win[half..]);
        let dof = w as f64 - 2.0 * K;
        safe_div((pooled - split) / K, split / dof)
    })
}

/// Residual sum of squares of an OLS line against the index.
fn trend_rss(y: &[f64]) -> f64 {
    let slope = stats::index_slope(y);
    let n = y.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = y.iter().sum::<f64>() / n;
    let intercept = mean_y - slope * mean_x;
    y.iter()
        .enumerate()
        .map(|(i, v)| (v - intercept - slope * i as f64).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_state_and_threshold() {
        let g = [1.0, 3.0, 1.0, 2.5];
        assert_eq!(two_state_volatility_regime(&g), vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(threshold_flag(&g, 2.0), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_three_state_regime() {
        assert_eq!(three_state_regime(&[0.001; 20], 20, 0.05), vec![2.0]);
        assert_eq!(three_state_regime(&[-0.001; 20], 20, 0.05), vec![0.0]);
        assert_eq!(three_state_regime(&[0.0; 20], 20, 0.05), vec![1.0]);
    }

    #[test]
    fn test_chow_detects_break() {
        let noise = |i: usize| ((i * 7 % 5) as f64) * 0.1;
        let mut y: Vec<f64> = (0..25).map(|i| i as f64 + noise(i)).collect();
        y.extend((25..50).map(|i| 100.0 - 2.0 * i as f64 + noise(i)));
        let with_break = chow_statistic(&y, 50)[0];
        let line: Vec<f64> = (0..50).map(|i| i as f64 + noise(i)).collect();
        let without = chow_statistic(&line, 50)[0];
        assert!(with_break > 100.0);
        assert!(without < with_break);
    }
}
