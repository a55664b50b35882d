//! Per-symbol feature pipeline.
//!
//! Turns one [`OhlcvSeries`] into a [`FeatureSet`]: every selected indicator
//! from the registry plus the scalar [`SymbolSummary`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │     FeaturePipeline      │
//! │  ┌────────────────────┐  │
//! │  │ IndicatorRegistry  │  │
//! │  │ + selection        │  │
//! │  └────────────────────┘  │
//! │            │             │
//! │            ▼             │
//! │  ┌────────────────────┐  │
//! │  │  FeatureContext    │  │
//! │  │ (memoized returns, │  │
//! │  │  SMA20, vol, ...)  │  │
//! │  └────────────────────┘  │
//! └──────────────────────────┘
//! ```
//!
//! Only a malformed series (empty or mismatched columns) is an error. An
//! indicator whose output breaks its alignment rule is logged and stored as
//! an empty sequence, leaving the other features intact.

use tracing::{debug, warn};
use types::{FeatureSet, OhlcvSeries, SymbolSummary};

use crate::error::QuantResult;
use crate::indicators::{FeatureContext, IndicatorRegistry, IndicatorSpec};
use crate::kernels::Kernels;
use crate::stats;

/// Mean traded value (close x volume) at or above which a symbol is "large".
pub const LARGE_CAP_TRADED_VALUE: f64 = 1e9;
/// Mean traded value at or above which a symbol is "mid".
pub const MID_CAP_TRADED_VALUE: f64 = 1e8;

/// Computes feature sets from a registry and an optional name selection.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    registry: IndicatorRegistry,
    /// `None` selects every registered indicator.
    selection: Option<Vec<String>>,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new(IndicatorRegistry::standard())
    }
}

impl FeaturePipeline {
    pub fn new(registry: IndicatorRegistry) -> Self {
        Self {
            registry,
            selection: None,
        }
    }

    /// Restrict computation to the named indicators. Unknown names are
    /// skipped with a warning at compute time.
    pub fn with_selection<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    /// Specs that will be evaluated, in selection (or registration) order.
    fn selected(&self) -> Vec<&IndicatorSpec> {
        match &self.selection {
            None => self.registry.iter().collect(),
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    let spec = self.registry.get(name);
                    if spec.is_none() {
                        warn!(indicator = %name, "unknown indicator requested, skipping");
                    }
                    spec
                })
                .collect(),
        }
    }

    /// Compute the feature set of one series.
    pub fn compute(&self, series: &OhlcvSeries, kernels: &Kernels) -> QuantResult<FeatureSet> {
        series.check_shape()?;

        let ctx = FeatureContext::new(series, kernels);
        let mut features = FeatureSet::new(series.symbol.clone());
        let n = series.len();

        for spec in self.selected() {
            let values = spec.compute(&ctx);
            let expected = spec.alignment.expected_len(n);
            if values.len() == expected {
                features.insert(spec.name, values);
            } else {
                warn!(
                    symbol = %series.symbol,
                    indicator = spec.name,
                    got = values.len(),
                    expected,
                    "indicator broke its alignment rule, storing empty sequence"
                );
                features.insert(spec.name, Vec::new());
            }
        }

        features.summary = summarize(series, ctx.returns());
        debug!(
            symbol = %series.symbol,
            bars = n,
            features = features.len(),
            "features computed"
        );
        Ok(features)
    }
}

/// Scalar summary of a series. Sector is left as "Unknown" for the caller.
pub fn summarize(series: &OhlcvSeries, returns: &[f64]) -> SymbolSummary {
    let close = &series.close;
    let (min_price, max_price) = close
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));

    let traded_value = stats::mean(
        &close
            .iter()
            .zip(&series.volume)
            .map(|(c, v)| c * v)
            .collect::<Vec<_>>(),
    )
    .unwrap_or(0.0);

    SymbolSummary {
        bar_count: series.len(),
        mean_price: stats::mean(close).unwrap_or(0.0),
        mean_return: stats::mean(returns).unwrap_or(0.0),
        volatility: stats::std_dev(returns).unwrap_or(0.0),
        min_price: if min_price.is_finite() { min_price } else { 0.0 },
        max_price: if max_price.is_finite() { max_price } else { 0.0 },
        last_price: series.last_close().unwrap_or(0.0),
        market_cap_bucket: market_cap_bucket(traded_value).to_string(),
        malformed_bars: series.malformed_bar_count(),
        ..SymbolSummary::default()
    }
}

/// "large", "mid" or "small" from mean traded value.
pub fn market_cap_bucket(traded_value: f64) -> &'static str {
    if traded_value >= LARGE_CAP_TRADED_VALUE {
        "large"
    } else if traded_value >= MID_CAP_TRADED_VALUE {
        "mid"
    } else {
        "small"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuantError;

    fn series(n: usize) -> OhlcvSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 * 0.2).sin() * 4.0 + i as f64 * 0.05)
            .collect();
        OhlcvSeries::from_closes("ACME", &closes)
    }

    #[test]
    fn test_all_features_follow_alignment() {
        let s = series(150);
        let kernels = Kernels::select(true);
        let pipeline = FeaturePipeline::default();
        let fs = pipeline.compute(&s, &kernels).unwrap();

        assert_eq!(fs.len(), pipeline.registry().len());
        for spec in pipeline.registry().iter() {
            let values = fs.get(spec.name).unwrap();
            assert_eq!(values.len(), spec.alignment.expected_len(150), "{}", spec.name);
        }
    }

    #[test]
    fn test_short_series_gives_empty_windows() {
        let s = series(10);
        let fs = FeaturePipeline::default()
            .compute(&s, &Kernels::scalar())
            .unwrap();
        assert!(fs.get("sma").unwrap().is_empty());
        assert!(fs.get("hurst_exponent_100").unwrap().is_empty());
        assert_eq!(fs.get("returns").unwrap().len(), 9);
        assert_eq!(fs.get("ema_12").unwrap().len(), 10);
    }

    #[test]
    fn test_selection_and_unknown_names() {
        let fs = FeaturePipeline::default()
            .with_selection(["rsi", "no_such_indicator", "returns"])
            .compute(&series(40), &Kernels::scalar())
            .unwrap();
        assert_eq!(fs.names().collect::<Vec<_>>(), vec!["returns", "rsi"]);
    }

    #[test]
    fn test_malformed_series_is_rejected() {
        let mut s = series(30);
        s.high.pop();
        let err = FeaturePipeline::default()
            .compute(&s, &Kernels::scalar())
            .unwrap_err();
        assert!(matches!(err, QuantError::Shape(_)));
        assert!(FeaturePipeline::default()
            .compute(&OhlcvSeries::new("EMPTY"), &Kernels::scalar())
            .is_err());
    }

    #[test]
    fn test_summary() {
        let s = OhlcvSeries::from_closes("ACME", &[10.0, 11.0, 9.0, 12.0]);
        let summary = summarize(&s, &stats::returns(&s.close));
        assert_eq!(summary.bar_count, 4);
        assert_eq!(summary.min_price, 9.0);
        assert_eq!(summary.max_price, 12.0);
        assert_eq!(summary.last_price, 12.0);
        assert_eq!(summary.sector, "Unknown");
        assert_eq!(summary.market_cap_bucket, "small");
        assert_eq!(market_cap_bucket(2e9), "large");
        assert_eq!(market_cap_bucket(1e8), "mid");
    }
}
