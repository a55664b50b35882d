//! Risk metrics over return series and equity curves.
//!
//! These back the Risk-category indicators (applied per rolling window) and
//! the trade-simulation summary of the pair analyzer.

use crate::stats;

/// Largest peak-to-trough decline as a fraction of the peak.
///
/// Suited to price or NAV curves; non-positive peaks contribute nothing.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut max_dd: f64 = 0.0;
    let mut peak = first;

    for &value in equity_curve {
        if value > peak {
            peak = value;
        }
        let dd = if peak > 0.0 {
            (peak - value) / peak
        } else {
            0.0
        };
        max_dd = max_dd.max(dd);
    }
    max_dd
}

/// Largest peak-to-trough decline in absolute units.
///
/// Suited to cumulative-sum curves that start at 0, such as summed per-trade
/// returns.
pub fn max_drawdown_abs(curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd: f64 = 0.0;
    for &value in curve {
        peak = peak.max(value);
        max_dd = max_dd.max(peak - value);
    }
    max_dd
}

/// Mean over sample standard deviation, not annualised.
///
/// `None` with fewer than two returns or no dispersion beyond rounding.
pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    let mean_return = stats::mean(returns)?;
    let std = stats::sample_std_dev(returns)?;
    if stats::negligible_dispersion(std, mean_return) {
        return None;
    }
    Some(mean_return / std)
}

/// Mean over downside deviation (root mean square of negative returns).
///
/// `None` when there are no losses or fewer than two returns.
pub fn sortino_ratio(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let mean_return = stats::mean(returns)?;
    let downside: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    let downside_dev = (downside / returns.len() as f64).sqrt();
    if stats::negligible_dispersion(downside_dev, mean_return) {
        return None;
    }
    Some(mean_return / downside_dev)
}

/// Historical Value at Risk as a positive loss at `confidence` (e.g. 0.95).
pub fn historical_var(returns: &[f64], confidence: f64) -> Option<f64> {
    if returns.is_empty() || !(0.0..1.0).contains(&confidence) {
        return None;
    }
    let sorted = stats::sorted(returns);
    let var = stats::percentile(&sorted, 1.0 - confidence)?;
    Some(-var.min(0.0))
}

/// Slack absorbed before rounding a tail size up; `(1 - 0.95) * 20` is
/// `1.0000000000000009` in binary floating point.
const TAIL_SLACK: f64 = 1e-9;

/// Number of returns in the `1 - confidence` tail of `n`: `ceil((1 - c) * n)`,
/// at least 1 and at most `n`.
pub fn tail_count(n: usize, confidence: f64) -> usize {
    let raw = (1.0 - confidence) * n as f64;
    ((raw - TAIL_SLACK).ceil().max(1.0) as usize).min(n)
}

/// Conditional VaR: mean of the worst [`tail_count`] returns.
///
/// Returned in return units (negative for losses), matching the window's raw
/// tail mean.
pub fn conditional_var(returns: &[f64], confidence: f64) -> Option<f64> {
    if returns.is_empty() || !(0.0..1.0).contains(&confidence) {
        return None;
    }
    let sorted = stats::sorted(returns);
    stats::mean(&sorted[..tail_count(sorted.len(), confidence)])
}

/// Ulcer index: root mean square fractional drawdown from the running peak,
/// in the same units as [`max_drawdown`].
pub fn ulcer_index(prices: &[f64]) -> f64 {
    let Some(&first) = prices.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut sum_sq = 0.0;
    for &p in prices {
        peak = peak.max(p);
        let dd = if peak > 0.0 { (p - peak) / peak } else { 0.0 };
        sum_sq += dd * dd;
    }
    (sum_sq / prices.len() as f64).sqrt()
}

/// Bars since the window's running peak at the final bar.
pub fn drawdown_duration(prices: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut since = 0usize;
    for &p in prices {
        if p >= peak {
            peak = p;
            since = 0;
        } else {
            since += 1;
        }
    }
    since as f64
}

/// Annualised volatility from periodic returns.
pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    let std = stats::sample_std_dev(returns)?;
    Some(std * periods_per_year.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_drawdown() {
        let equity = [100.0, 110.0, 105.0, 120.0, 100.0, 115.0];
        assert!((max_drawdown(&equity) - 20.0 / 120.0).abs() < 1e-12);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
    }

    #[test]
    fn test_max_drawdown_abs_on_cumulative_curve() {
        let curve = [0.01, 0.03, -0.01, 0.02];
        assert!((max_drawdown_abs(&curve) - 0.04).abs() < 1e-12);
        assert_eq!(max_drawdown_abs(&[]), 0.0);
    }

    #[test]
    fn test_sharpe_ratio() {
        let returns = [
            0.01, 0.02, -0.01, 0.015, 0.005, 0.02, -0.005, 0.01, 0.015, 0.02, 0.005, 0.01,
        ];
        assert!(sharpe_ratio(&returns).unwrap() > 0.0);
        assert!(sharpe_ratio(&[0.01; 5]).is_none());
        assert!(sortino_ratio(&[0.01, 0.02]).is_none());
    }

    #[test]
    fn test_constant_returns_have_no_ratio() {
        // Sums of these leave a residual std of a few ulps.
        for r in [0.01, 0.013, 0.1, -0.007, 1e-4] {
            for n in [5, 20, 30, 64] {
                let returns = vec![r; n];
                assert_eq!(sharpe_ratio(&returns), None, "sharpe r={r} n={n}");
            }
        }
        let tiny_spread = [0.02, 0.02 + 1e-17, 0.02, 0.02 - 1e-17, 0.02];
        assert_eq!(sharpe_ratio(&tiny_spread), None);
        assert_eq!(sortino_ratio(&[0.013; 30]), None);
    }

    #[test]
    fn test_real_dispersion_still_counts() {
        let returns = [0.010, 0.011, 0.009, 0.010];
        let sharpe = sharpe_ratio(&returns).unwrap();
        assert!(sharpe > 10.0 && sharpe < 100.0);
        let sortino = sortino_ratio(&[0.02, -0.01, 0.03, -0.02]).unwrap();
        assert!((sortino - 0.005 / (0.0005f64 / 4.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_tail_count() {
        assert_eq!(tail_count(20, 0.95), 1);
        assert_eq!(tail_count(10, 0.95), 1);
        assert_eq!(tail_count(21, 0.95), 2);
        assert_eq!(tail_count(40, 0.95), 2);
        assert_eq!(tail_count(100, 0.99), 1);
        assert_eq!(tail_count(3, 0.5), 2);
        assert_eq!(tail_count(1, 0.95), 1);
    }

    #[test]
    fn test_cvar_of_twenty_returns_is_the_worst_one() {
        let mut returns = vec![0.01; 20];
        returns[4] = -0.08;
        returns[11] = 0.01 - 0.005;
        returns[15] = 0.01 - 0.05;
        assert_eq!(conditional_var(&returns, 0.95), Some(-0.08));
    }

    #[test]
    fn test_value_at_risk() {
        let returns = [
            -0.05, -0.02, 0.01, 0.02, -0.01, 0.03, -0.03, 0.02, 0.01, -0.02,
        ];
        assert!(historical_var(&returns, 0.95).unwrap() > 0.0);
        // ceil(0.05 * 10) = 1 worst return
        assert_eq!(conditional_var(&returns, 0.95), Some(-0.05));
    }

    #[test]
    fn test_ulcer_and_duration() {
        assert_eq!(ulcer_index(&[1.0, 2.0, 3.0]), 0.0);
        let ui = ulcer_index(&[100.0, 90.0]);
        assert!((ui - (0.01f64 / 2.0).sqrt()).abs() < 1e-12);
        assert!((ulcer_index(&[100.0, 90.0]) - max_drawdown(&[100.0, 90.0]) / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(drawdown_duration(&[1.0, 3.0, 2.0, 2.5]), 2.0);
        assert_eq!(drawdown_duration(&[1.0, 2.0]), 0.0);
    }
}
