//! Rolling risk measures over returns and prices.

use crate::risk;
use crate::rolling::window_apply;

const CONFIDENCE_95: f64 = 0.95;

/// Conditional VaR at 95% of each return window (mean of the worst tail).
pub fn rolling_cvar(returns: &[f64], w: usize) -> Vec<f64> {
    window_apply(returns, w, |win| {
        risk::conditional_var(win, CONFIDENCE_95).unwrap_or(0.0)
    })
}

/// Historical VaR at 95% of each return window, as a positive loss.
pub fn rolling_var(returns: &[f64], w: usize) -> Vec<f64> {
    window_apply(returns, w, |win| {
        risk::historical_var(win, CONFIDENCE_95).unwrap_or(0.0)
    })
}

/// Per-bar Sharpe ratio of each return window; 0 when undefined.
pub fn rolling_sharpe(returns: &[f64], w: usize) -> Vec<f64> {
    window_apply(returns, w, |win| risk::sharpe_ratio(win).unwrap_or(0.0))
}

/// Per-bar Sortino ratio of each return window; 0 when undefined.
pub fn rolling_sortino(returns: &[f64], w: usize) -> Vec<f64> {
    window_apply(returns, w, |win| risk::sortino_ratio(win).unwrap_or(0.0))
}

/// Ulcer index of each price window.
pub fn rolling_ulcer(prices: &[f64], w: usize) -> Vec<f64> {
    window_apply(prices, w, risk::ulcer_index)
}

/// Bars since the window peak at each window's end.
pub fn rolling_drawdown_duration(prices: &[f64], w: usize) -> Vec<f64> {
    window_apply(prices, w, risk::drawdown_duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cvar_takes_worst_return() {
        let mut rets = vec![0.01; 20];
        rets[7] = -0.08;
        let out = rolling_cvar(&rets, 20);
        assert_eq!(out, vec![-0.08]);
    }

    #[test]
    fn test_undefined_ratios_are_zero() {
        assert_eq!(rolling_sharpe(&[0.01; 30], 30), vec![0.0]);
        assert_eq!(rolling_sortino(&[0.01; 30], 30), vec![0.0]);
    }

    #[test]
    fn test_price_window_measures() {
        let prices = [10.0, 12.0, 11.0, 10.5];
        assert_eq!(rolling_drawdown_duration(&prices, 4), vec![2.0]);
        // Drawdowns 0, 1/12, 1.5/12 from the 12.0 peak, as fractions.
        let expected = ((0.0 + 0.0 + (1.0f64 / 12.0).powi(2) + (1.5f64 / 12.0).powi(2)) / 4.0).sqrt();
        assert!((rolling_ulcer(&prices, 4)[0] - expected).abs() < 1e-12);
    }
}
