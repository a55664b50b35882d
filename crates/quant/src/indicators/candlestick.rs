//! Single-bar candle shape features. Each output has one value per bar.

/// +1 for a rising candle, -1 for a falling one, 0 for a doji.
pub fn candle_way(open: &[f64], close: &[f64]) -> Vec<f64> {
    open.iter()
        .zip(close)
        .map(|(o, c)| {
            if c > o {
                1.0
            } else if c < o {
                -1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Body over range, 0 when the range is 0.
pub fn candle_filling(open: &[f64], high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..open.len().min(high.len()).min(low.len()).min(close.len()))
        .map(|i| {
            let range = high[i] - low[i];
            if range == 0.0 {
                0.0
            } else {
                (close[i] - open[i]).abs() / range
            }
        })
        .collect()
}

/// High minus low.
pub fn candle_amplitude(high: &[f64], low: &[f64]) -> Vec<f64> {
    high.iter().zip(low).map(|(h, l)| h - l).collect()
}

/// Internal bar strength `(close - low) / range`, 0.5 when the range is 0.
pub fn internal_bar_strength(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..high.len().min(low.len()).min(close.len()))
        .map(|i| {
            let range = high[i] - low[i];
            if range == 0.0 {
                0.5
            } else {
                (close[i] - low[i]) / range
            }
        })
        .collect()
}
