//! Bollinger Bands.

/// End-aligned band series, each N-period+1 long.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    /// Position of the close within the bands; 0 when the bands collapse.
    pub percent_b: Vec<f64>,
}

/// SMA(period) ± `k` population standard deviations.
pub fn bollinger(values: &[f64], period: usize, k: f64) -> BollingerSeries {
    let mut out = BollingerSeries::default();
    if period == 0 || values.len() < period {
        return out;
    }
    for window in values.windows(period) {
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / period as f64;
        let band = variance.sqrt() * k;
        let (upper, lower) = (mean + band, mean - band);
        let last = window[period - 1];

        out.upper.push(upper);
        out.middle.push(mean);
        out.lower.push(lower);
        out.percent_b.push(if upper == lower {
            0.0
        } else {
            (last - lower) / (upper - lower)
        });
    }
    out
}
