//! Augmented Dickey-Fuller unit-root test.
//!
//! The regression is `Δs[t] = a + b·s[t-1] + e` over the sample that the
//! chosen lag count leaves, with the lag count picked by AIC. The p-value
//! comes from a coarse ladder anchored at the asymptotic critical values,
//! which do not depend on sample size.

use crate::error::QuantResult;
use crate::kernels::Kernels;

/// 1% critical value.
pub const CRITICAL_1PCT: f64 = -3.43;
/// 5% critical value.
pub const CRITICAL_5PCT: f64 = -2.86;
/// 10% critical value.
pub const CRITICAL_10PCT: f64 = -2.57;

/// Shortest series the test runs on.
pub const MIN_OBSERVATIONS: usize = 20;

/// Outcome of one test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub lags: usize,
}

impl AdfOutcome {
    fn not_run() -> Self {
        Self {
            statistic: 0.0,
            p_value: 1.0,
            lags: 0,
        }
    }

    /// Unit root rejected at the 5% critical value and at `significance`.
    pub fn rejects_unit_root(&self, significance: f64) -> bool {
        self.statistic < CRITICAL_5PCT && self.p_value <= significance
    }
}

/// Run the test on `series` with at most `max_lags` augmentation lags.
pub fn adf_test(kernels: &Kernels, series: &[f64], max_lags: usize) -> QuantResult<AdfOutcome> {
    if series.len() < MIN_OBSERVATIONS {
        return Ok(AdfOutcome::not_run());
    }
    let lags = select_lags(kernels, series, max_lags);
    let statistic = t_statistic(kernels, series, lags)?;
    Ok(AdfOutcome {
        statistic,
        p_value: p_value(statistic),
        lags,
    })
}

/// Lag in `[1, min(max_lags, N/4)]` minimising `2(k + 2) + n·ln(RSS/n)`.
///
/// RSS is the residual sum of squares of the first differences around their
/// mean, and `n = N - k - 1`. Defaults to 1 when the range is empty.
fn select_lags(kernels: &Kernels, series: &[f64], max_lags: usize) -> usize {
    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    let rss = kernels.variance(&diffs) * diffs.len() as f64;

    let upper = max_lags.min(series.len() / 4);
    let mut best = (f64::INFINITY, 1);
    for k in 1..=upper {
        let n = series.len() - k - 1;
        if n < 10 {
            continue;
        }
        let n = n as f64;
        let aic = 2.0 * (k + 2) as f64 + n * (rss / n).ln();
        if aic < best.0 {
            best = (aic, k);
        }
    }
    best.1
}

/// t-statistic of `b`, with `SE = √(MSE / (var(x)·n))`; 0 when undefined.
fn t_statistic(kernels: &Kernels, series: &[f64], lags: usize) -> QuantResult<f64> {
    if series.len() < lags + 10 {
        return Ok(0.0);
    }
    let start = lags + 1;
    let dy: Vec<f64> = (start..series.len())
        .map(|i| series[i] - series[i - 1])
        .collect();
    let x = &series[start - 1..series.len() - 1];

    let (alpha, beta) = kernels.linear_regression(&dy, x)?;
    let rss: f64 = dy
        .iter()
        .zip(x)
        .map(|(y, x)| {
            let e = y - alpha - beta * x;
            e * e
        })
        .sum();

    let n = dy.len() as f64;
    let mse = rss / (n - 2.0);
    let se = (mse / (kernels.variance(x) * n)).sqrt();
    if se > 0.0 && se.is_finite() {
        Ok(beta / se)
    } else {
        Ok(0.0)
    }
}

/// Map a statistic onto the p-value ladder.
///
/// Below the critical values the ladder is flat (0.01, 0.05, 0.10); from
/// -2.57 to -2.0 it rises linearly to 0.30, then on to a cap of 0.99.
pub fn p_value(statistic: f64) -> f64 {
    if statistic < CRITICAL_1PCT {
        0.01
    } else if statistic < CRITICAL_5PCT {
        0.05
    } else if statistic < CRITICAL_10PCT {
        0.10
    } else if statistic < -2.0 {
        0.10 + (statistic - CRITICAL_10PCT) / (-2.0 - CRITICAL_10PCT) * 0.20
    } else {
        (0.30 + (statistic + 2.0) / 2.0 * 0.69).min(0.99)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_p_value_ladder() {
        assert_eq!(p_value(-5.0), 0.01);
        assert_eq!(p_value(-3.0), 0.05);
        assert_eq!(p_value(-2.7), 0.10);
        assert!((p_value(-2.57) - 0.10).abs() < 1e-12);
        assert!((p_value(-2.0) - 0.30).abs() < 1e-12);
        assert!((p_value(0.0) - 0.99).abs() < 1e-12);
        assert_eq!(p_value(10.0), 0.99);
        // Monotone above the flat steps.
        assert!(p_value(-2.3) < p_value(-2.1));
    }

    #[test]
    fn test_short_series_is_not_tested() {
        let out = adf_test(&Kernels::scalar(), &[1.0; 19], 10).unwrap();
        assert_eq!(out.statistic, 0.0);
        assert_eq!(out.p_value, 1.0);
        assert!(!out.rejects_unit_root(0.05));
    }

    #[test]
    fn test_alternating_series_rejects() {
        // Deterministic strong mean reversion around 0.
        let series: Vec<f64> = (0..200)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 } + (i as f64 * 0.37).sin() * 0.3)
            .collect();
        let out = adf_test(&Kernels::select(true), &series, 10).unwrap();
        assert!(out.statistic < CRITICAL_1PCT, "{}", out.statistic);
        assert_eq!(out.p_value, 0.01);
        assert!(out.rejects_unit_root(0.05));
        assert!((1..=10).contains(&out.lags));
    }

    #[test]
    fn test_lag_range_respects_length() {
        let series: Vec<f64> = (0..24).map(|i| (i as f64).sin()).collect();
        // N/4 = 6 caps the candidates; n = N - k - 1 stays >= 10 for all.
        assert!(select_lags(&Kernels::scalar(), &series, 50) <= 6);
        assert_eq!(select_lags(&Kernels::scalar(), &series, 0), 1);
    }
}
