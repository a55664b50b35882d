//! Cross-feature interaction terms.

use crate::rolling::tail;
use crate::stats::safe_div;

/// Volume-weighted mean return over each window of `w` returns.
///
/// `returns[i]` pairs with `volume[i + 1]`, the bar that produced it.
pub fn volume_weighted_return(returns: &[f64], volume: &[f64], w: usize) -> Vec<f64> {
    let vols = volume.get(1..).unwrap_or_default();
    let n = returns.len().min(vols.len());
    if w == 0 || w > n {
        return Vec::new();
    }
    (0..=n - w)
        .map(|start| {
            let end = start + w;
            let weighted: f64 = (start..end).map(|i| returns[i] * vols[i]).sum();
            let total: f64 = vols[start..end].iter().sum();
            safe_div(weighted, total)
        })
        .collect()
}

/// Elementwise product of two end-aligned series, trimmed to the shorter.
pub fn aligned_product(a: &[f64], b: &[f64], scale_b: f64) -> Vec<f64> {
    let len = a.len().min(b.len());
    tail(a, len)
        .iter()
        .zip(tail(b, len))
        .map(|(x, y)| x * y * scale_b)
        .collect()
}

/// Elementwise `a / b` over end-aligned series, 0 where `b` is 0.
pub fn aligned_ratio(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = a.len().min(b.len());
    tail(a, len)
        .iter()
        .zip(tail(b, len))
        .map(|(x, y)| safe_div(*x, *y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_weighted_return() {
        let out = volume_weighted_return(&[0.1, -0.1], &[0.0, 3.0, 1.0], 2);
        assert_eq!(out.len(), 1);
        assert!((out[0] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_alignment_trims_head() {
        assert_eq!(aligned_product(&[1.0, 2.0, 3.0], &[10.0, 10.0], 0.5), vec![10.0, 15.0]);
        assert_eq!(aligned_ratio(&[4.0, 6.0], &[2.0, 0.0]), vec![2.0, 0.0]);
    }
}
