//! Per-symbol evaluation context with memoized intermediates.

use std::cell::OnceCell;

use types::OhlcvSeries;

use super::{ema, volatility};
use crate::kernels::Kernels;
use crate::stats;

/// Borrowed view of one symbol's bars plus lazily computed shared series.
///
/// Intermediates used by many indicators (returns, SMA20, rolling
/// volatility, volume SMA20, typical price, GARCH volatility) are computed
/// on first use and reused for the rest of the evaluation.
pub struct FeatureContext<'a> {
    series: &'a OhlcvSeries,
    kernels: &'a Kernels,
    returns: OnceCell<Vec<f64>>,
    sma20: OnceCell<Vec<f64>>,
    volatility20: OnceCell<Vec<f64>>,
    volume_sma20: OnceCell<Vec<f64>>,
    typical: OnceCell<Vec<f64>>,
    garch: OnceCell<Vec<f64>>,
}

impl<'a> FeatureContext<'a> {
    pub fn new(series: &'a OhlcvSeries, kernels: &'a Kernels) -> Self {
        Self {
            series,
            kernels,
            returns: OnceCell::new(),
            sma20: OnceCell::new(),
            volatility20: OnceCell::new(),
            volume_sma20: OnceCell::new(),
            typical: OnceCell::new(),
            garch: OnceCell::new(),
        }
    }

    pub fn series(&self) -> &'a OhlcvSeries {
        self.series
    }

    pub fn kernels(&self) -> &'a Kernels {
        self.kernels
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn open(&self) -> &'a [f64] {
        &self.series.open
    }

    pub fn high(&self) -> &'a [f64] {
        &self.series.high
    }

    pub fn low(&self) -> &'a [f64] {
        &self.series.low
    }

    pub fn close(&self) -> &'a [f64] {
        &self.series.close
    }

    pub fn volume(&self) -> &'a [f64] {
        &self.series.volume
    }

    /// Simple close-to-close returns, N-1.
    pub fn returns(&self) -> &[f64] {
        self.returns.get_or_init(|| stats::returns(self.close()))
    }

    /// 20-bar SMA of close, N-19.
    pub fn sma20(&self) -> &[f64] {
        self.sma20
            .get_or_init(|| self.kernels.rolling_mean(self.close(), 20))
    }

    /// 20-return sample standard deviation of returns, N-20.
    pub fn volatility20(&self) -> &[f64] {
        self.volatility20
            .get_or_init(|| self.kernels.rolling_stddev(self.returns(), 20))
    }

    /// 20-bar SMA of volume, N-19.
    pub fn volume_sma20(&self) -> &[f64] {
        self.volume_sma20
            .get_or_init(|| self.kernels.rolling_mean(self.volume(), 20))
    }

    /// (high + low + close) / 3, N.
    pub fn typical_price(&self) -> &[f64] {
        self.typical.get_or_init(|| {
            self.high()
                .iter()
                .zip(self.low())
                .zip(self.close())
                .map(|((h, l), c)| (h + l + c) / 3.0)
                .collect()
        })
    }

    /// GARCH(1,1) conditional volatility of percent returns, N-1.
    pub fn garch_volatility(&self) -> &[f64] {
        self.garch
            .get_or_init(|| volatility::garch_volatility(self.returns()))
    }

    /// Recursive EMA of close; not memoized since periods vary.
    pub fn ema_close(&self, period: usize) -> Vec<f64> {
        ema::ema(self.close(), period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memoized_lengths() {
        let closes: Vec<f64> = (1..=40).map(|i| 100.0 + i as f64).collect();
        let series = OhlcvSeries::from_closes("ACME", &closes);
        let kernels = Kernels::scalar();
        let ctx = FeatureContext::new(&series, &kernels);

        assert_eq!(ctx.returns().len(), 39);
        assert_eq!(ctx.sma20().len(), 21);
        assert_eq!(ctx.volatility20().len(), 20);
        assert_eq!(ctx.volume_sma20().len(), 21);
        assert_eq!(ctx.typical_price().len(), 40);
        assert_eq!(ctx.garch_volatility().len(), 39);
        // Second call hits the cell.
        assert!(std::ptr::eq(ctx.returns(), ctx.returns()));
    }
}
