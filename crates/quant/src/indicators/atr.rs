//! True range and Average True Range (ATR).

use super::ema::wilder;

/// True range per bar against the previous close, N-1 outputs aligned to
/// the later bar: max(H - L, |H - C₋₁|, |L - C₋₁|).
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    (1..n)
        .map(|i| {
            let prev_close = close[i - 1];
            (high[i] - low[i])
                .max((high[i] - prev_close).abs())
                .max((low[i] - prev_close).abs())
        })
        .collect()
}

/// Wilder-smoothed ATR, N-period outputs.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    wilder(&true_range(high, low, close), period)
}
