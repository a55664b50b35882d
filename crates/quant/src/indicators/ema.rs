//! Recursive smoothers: EMA, Wilder smoothing and Kaufman's adaptive MA.

/// Exponential moving average with multiplier `2 / (period + 1)`.
///
/// Recursive: N outputs, seeded with the first input.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let multiplier = 2.0 / (period.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = first;
    out.push(prev);
    for &v in &values[1..] {
        prev = (v - prev) * multiplier + prev;
        out.push(prev);
    }
    out
}

/// Wilder smoothing: the first output is the mean of the first `period`
/// values, then `s = (s * (period - 1) + x) / period`. N-period+1 outputs.
pub fn wilder(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let p = period as f64;
    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut s = values[..period].iter().sum::<f64>() / p;
    out.push(s);
    for &x in &values[period..] {
        s = (s * (p - 1.0) + x) / p;
        out.push(s);
    }
    out
}

/// Kaufman adaptive moving average.
///
/// Efficiency ratio over `er_len` bars, smoothing constant
/// `(ER * (fast - slow) + slow)²` with `fast = 2 / (fast_len + 1)` and
/// `slow = 2 / (slow_len + 1)`. Recursive: N outputs; the first `er_len`
/// outputs hold the first input.
pub fn kama(values: &[f64], er_len: usize, fast_len: usize, slow_len: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let fast = 2.0 / (fast_len as f64 + 1.0);
    let slow = 2.0 / (slow_len as f64 + 1.0);

    let mut out = Vec::with_capacity(values.len());
    let mut prev = first;
    for i in 0..values.len() {
        if i < er_len || er_len == 0 {
            out.push(first);
            continue;
        }
        let change = (values[i] - values[i - er_len]).abs();
        let noise: f64 = (i - er_len + 1..=i)
            .map(|j| (values[j] - values[j - 1]).abs())
            .sum();
        let er = if noise == 0.0 { 0.0 } else { change / noise };
        let sc = (er * (fast - slow) + slow).powi(2);
        prev += sc * (values[i] - prev);
        out.push(prev);
    }
    out
}
