//! Relative Strength Index (RSI).

/// RSI with Wilder smoothing, on a 0-100 scale.
///
/// Initial average gain/loss over the first `period` changes, then smoothed
/// with α = 1/period. When the average loss is 0 the RSI is 100. Window of
/// `period + 1` prices: N-period outputs.
pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return Vec::new();
    }
    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    let (mut avg_gain, mut avg_loss) =
        changes[..period]
            .iter()
            .fold((0.0, 0.0), |(g, l), &change| {
                if change > 0.0 {
                    (g + change, l)
                } else {
                    (g, l - change)
                }
            });
    avg_gain /= p;
    avg_loss /= p;

    let mut out = Vec::with_capacity(changes.len() - period + 1);
    out.push(rsi_value(avg_gain, avg_loss));

    for &change in &changes[period..] {
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out.push(rsi_value(avg_gain, avg_loss));
    }
    out
}

#[inline]
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_flat_prices_is_100() {
        let prices = [10.0; 15];
        let out = rsi(&prices, 14);
        assert_eq!(out, vec![100.0]);
    }

    #[test]
    fn test_rsi_all_losses_is_zero() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&prices, 14);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn test_rsi_bounded() {
        let prices = [44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.1, 45.9, 46.3, 46.0, 46.4, 46.2, 45.6];
        for v in rsi(&prices, 14) {
            assert!((0.0..=100.0).contains(&v));
        }
        assert!(rsi(&prices[..14], 14).is_empty());
    }
}
