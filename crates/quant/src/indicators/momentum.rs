//! Momentum and oscillator indicators.

use crate::rolling::{rolling_max, rolling_min, window_apply};
use crate::stats::safe_div;

/// First difference `p[i] - p[i-1]`, N-1.
pub fn velocity(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Second difference, N-2 (window of three prices).
pub fn acceleration(prices: &[f64]) -> Vec<f64> {
    window_apply(prices, 3, |w| w[2] - 2.0 * w[1] + w[0])
}

/// Price ratio `p[i] / p[i-lag]`, 0 when the divisor is 0. N-lag.
pub fn momentum(prices: &[f64], lag: usize) -> Vec<f64> {
    window_apply(prices, lag + 1, |w| safe_div(w[lag], w[0]))
}

/// Rate of change in percent, `(p[i] / p[i-lag] - 1) * 100`. N-lag.
pub fn rate_of_change(prices: &[f64], lag: usize) -> Vec<f64> {
    window_apply(prices, lag + 1, |w| {
        if w[0] == 0.0 {
            0.0
        } else {
            (w[lag] / w[0] - 1.0) * 100.0
        }
    })
}

/// Chande momentum oscillator over `period` changes, in [-100, 100].
pub fn chande_momentum(prices: &[f64], period: usize) -> Vec<f64> {
    window_apply(prices, period + 1, |w| {
        let (up, down) = w.windows(2).fold((0.0, 0.0), |(u, d), pair| {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                (u + change, d)
            } else {
                (u, d - change)
            }
        });
        safe_div(100.0 * (up - down), up + down)
    })
}

/// Stochastic %K: position of the close in the `period`-bar high/low range.
pub fn stochastic_k(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);
    let closes = close.get(period.saturating_sub(1)..).unwrap_or_default();
    closes
        .iter()
        .zip(hh.iter().zip(&ll))
        .map(|(&c, (&h, &l))| safe_div(100.0 * (c - l), h - l))
        .collect()
}

/// Williams %R in [-100, 0].
pub fn williams_r(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let hh = rolling_max(high, period);
    let ll = rolling_min(low, period);
    let closes = close.get(period.saturating_sub(1)..).unwrap_or_default();
    closes
        .iter()
        .zip(hh.iter().zip(&ll))
        .map(|(&c, (&h, &l))| safe_div(-100.0 * (h - c), h - l))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_differences() {
        let p = [1.0, 2.0, 4.0, 7.0];
        assert_eq!(velocity(&p), vec![1.0, 2.0, 3.0]);
        assert_eq!(acceleration(&p), vec![1.0, 1.0]);
    }

    #[test]
    fn test_momentum_zero_divisor() {
        let p = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(momentum(&p, 2), vec![0.0, 3.0]);
        assert!((rate_of_change(&[100.0, 110.0], 1)[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_chande_extremes() {
        let up: Vec<f64> = (0..20).map(f64::from).collect();
        assert!(chande_momentum(&up, 14).iter().all(|&v| v == 100.0));
        assert_eq!(chande_momentum(&[3.0; 20], 14)[0], 0.0);
    }

    #[test]
    fn test_stochastic_and_williams() {
        let high = [10.0, 12.0, 11.0];
        let low = [8.0, 9.0, 9.0];
        let close = [9.0, 11.0, 10.0];
        let k = stochastic_k(&high, &low, &close, 3);
        assert_eq!(k.len(), 1);
        assert!((k[0] - 50.0).abs() < 1e-12);
        let r = williams_r(&high, &low, &close, 3);
        assert!((r[0] + 50.0).abs() < 1e-12);
        assert!(stochastic_k(&high, &low, &close, 4).is_empty());
    }
}
