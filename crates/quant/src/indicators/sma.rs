//! Simple moving average.

/// Simple moving average over `period` values, N-period+1 outputs.
///
/// Uses a running sum; the first value is exact and later values may drift
/// in the last digits.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut sum: f64 = values[..period].iter().sum();
    out.push(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out.push(sum / period as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_calculation() {
        let prices = [10.0, 11.0, 12.0, 13.0, 14.0];
        assert_eq!(sma(&prices, 3), vec![11.0, 12.0, 13.0]);
        assert_eq!(sma(&prices, 5), vec![12.0]);
    }

    #[test]
    fn test_sma_insufficient_data() {
        assert!(sma(&[10.0, 11.0], 3).is_empty());
        assert!(sma(&[10.0], 0).is_empty());
    }
}
