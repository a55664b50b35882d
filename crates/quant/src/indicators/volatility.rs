//! Range-based and conditional volatility estimators.

use crate::rolling::window_apply;

/// GARCH(1,1) parameters; fixed, never estimated.
pub const GARCH_OMEGA: f64 = 0.05;
pub const GARCH_ALPHA: f64 = 0.1;
pub const GARCH_BETA: f64 = 0.85;

/// Trading days used to annualise daily volatility.
pub const TRADING_DAYS: f64 = 252.0;

/// Parkinson estimator `sqrt(Σ ln(h/l)² / (4 ln2 · w))` per window.
///
/// Bars with a non-positive high or low contribute 0.
pub fn parkinson(high: &[f64], low: &[f64], w: usize) -> Vec<f64> {
    let sq = log_range_sq(high, low);
    let scale = 4.0 * std::f64::consts::LN_2 * w as f64;
    window_apply(&sq, w, |win| (win.iter().sum::<f64>() / scale).sqrt())
}

/// Garman-Klass estimator per window, floored at 0 before the root.
pub fn garman_klass(open: &[f64], high: &[f64], low: &[f64], close: &[f64], w: usize) -> Vec<f64> {
    let n = open.len().min(high.len()).min(low.len()).min(close.len());
    let k = 2.0 * std::f64::consts::LN_2 - 1.0;
    let terms: Vec<f64> = (0..n)
        .map(|i| {
            let hl = ln_ratio(high[i], low[i]);
            let co = ln_ratio(close[i], open[i]);
            0.5 * hl * hl - k * co * co
        })
        .collect();
    window_apply(&terms, w, |win| (win.iter().sum::<f64>() / w as f64).max(0.0).sqrt())
}

/// Conditional volatility of percent returns under GARCH(1,1).
///
/// Recursive over the returns it is given: the first output is `|r₀|`, then
/// `σ²ₜ = ω + α·r²ₜ₋₁ + β·σ²ₜ₋₁` with returns in percent.
pub fn garch_volatility(returns: &[f64]) -> Vec<f64> {
    let Some(&first) = returns.first() else {
        return Vec::new();
    };
    let mut var = (first * 100.0).powi(2);
    let mut out = Vec::with_capacity(returns.len());
    out.push(var.sqrt());
    for pair in returns.windows(2) {
        let prev = pair[0] * 100.0;
        var = GARCH_OMEGA + GARCH_ALPHA * prev * prev + GARCH_BETA * var;
        out.push(var.sqrt());
    }
    out
}

/// Annualise a per-period volatility series.
pub fn annualize(vol: &[f64]) -> Vec<f64> {
    let factor = TRADING_DAYS.sqrt();
    vol.iter().map(|v| v * factor).collect()
}

fn log_range_sq(high: &[f64], low: &[f64]) -> Vec<f64> {
    high.iter()
        .zip(low)
        .map(|(&h, &l)| {
            let r = ln_ratio(h, l);
            r * r
        })
        .collect()
}

#[inline]
fn ln_ratio(a: f64, b: f64) -> f64 {
    crate::stats::safe_ln_ratio(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parkinson_constant_range() {
        let high = vec![110.0; 25];
        let low = vec![100.0; 25];
        let out = parkinson(&high, &low, 20);
        assert_eq!(out.len(), 6);
        let expected = (1.1f64.ln().powi(2) / (4.0 * std::f64::consts::LN_2)).sqrt();
        assert!((out[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_garch_recursion() {
        let out = garch_volatility(&[0.01, 0.0, 0.0]);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 1.0).abs() < 1e-12);
        // 0.05 + 0.1 * 1 + 0.85 * 1
        assert!((out[1] - 1.0).abs() < 1e-12);
        assert!((out[2] - (0.05f64 + 0.85).sqrt()).abs() < 1e-12);
        assert!(garch_volatility(&[]).is_empty());
    }

    #[test]
    fn test_garman_klass_flat_bars() {
        let flat = vec![50.0; 20];
        assert_eq!(garman_klass(&flat, &flat, &flat, &flat, 20), vec![0.0]);
    }
}
