//! MACD (Moving Average Convergence Divergence).

use super::ema::ema;

/// The three MACD component series, each N long.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacdSeries {
    /// EMA(fast) - EMA(slow).
    pub line: Vec<f64>,
    /// EMA(signal) of the line.
    pub signal: Vec<f64>,
    /// line - signal.
    pub histogram: Vec<f64>,
}

/// MACD over `values` with recursive EMAs seeded at the first input.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema(&line, signal);
    let histogram = line.iter().zip(&signal_line).map(|(l, s)| l - s).collect();
    MacdSeries {
        line,
        signal: signal_line,
        histogram,
    }
}
