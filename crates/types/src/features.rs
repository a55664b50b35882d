//! Per-symbol feature containers and feature metadata enums.
//!
//! A [`FeatureSet`] maps feature names to sequences. Sequences follow the
//! indicator alignment contract: they may be shorter than the bar count
//! (window indicators lose `w - 1` head samples), and individual samples
//! may be `NaN` where a computation was invalid. Consumers mask `NaN`s
//! before use; [`FeatureSet::last_finite`] does that for the common
//! "latest value" lookup.

use crate::ids::{Symbol, UNKNOWN_SECTOR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Metadata Enums
// =============================================================================

/// Feature category used for grouping and default colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    Price,
    Technical,
    Statistical,
    Volume,
    Regime,
    Risk,
    Interaction,
    Candlestick,
    Momentum,
    Volatility,
}

impl FeatureCategory {
    /// All categories in display order.
    pub const ALL: [FeatureCategory; 10] = [
        FeatureCategory::Price,
        FeatureCategory::Technical,
        FeatureCategory::Statistical,
        FeatureCategory::Volume,
        FeatureCategory::Regime,
        FeatureCategory::Risk,
        FeatureCategory::Interaction,
        FeatureCategory::Candlestick,
        FeatureCategory::Momentum,
        FeatureCategory::Volatility,
    ];

    /// Human-readable group title.
    pub fn title(&self) -> &'static str {
        match self {
            FeatureCategory::Price => "Price Data",
            FeatureCategory::Technical => "Technical Indicators",
            FeatureCategory::Statistical => "Statistical Features",
            FeatureCategory::Volume => "Volume Analysis",
            FeatureCategory::Regime => "Regime Detection",
            FeatureCategory::Risk => "Risk Measures",
            FeatureCategory::Interaction => "Interaction Features",
            FeatureCategory::Candlestick => "Candlestick Patterns",
            FeatureCategory::Momentum => "Momentum Indicators",
            FeatureCategory::Volatility => "Volatility Measures",
        }
    }

    /// Default RGB colour (components in 0..=1).
    pub fn color(&self) -> [f32; 3] {
        match self {
            FeatureCategory::Price => [0.2, 0.6, 1.0],
            FeatureCategory::Technical => [1.0, 0.5, 0.0],
            FeatureCategory::Statistical => [0.8, 0.2, 0.8],
            FeatureCategory::Volume => [0.0, 0.8, 0.4],
            FeatureCategory::Regime => [0.9, 0.1, 0.1],
            FeatureCategory::Risk => [0.6, 0.0, 0.0],
            FeatureCategory::Interaction => [0.5, 0.5, 0.5],
            FeatureCategory::Candlestick => [1.0, 0.8, 0.0],
            FeatureCategory::Momentum => [0.0, 0.6, 0.8],
            FeatureCategory::Volatility => [0.8, 0.4, 0.0],
        }
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Preferred chart rendering for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    Line,
    Bar,
    Histogram,
    Area,
}

// =============================================================================
// Symbol Summary
// =============================================================================

/// Scalar summaries computed alongside a symbol's feature sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSummary {
    /// Number of bars the features were computed from.
    pub bar_count: usize,
    /// Mean closing price.
    pub mean_price: f64,
    /// Mean simple return per bar.
    pub mean_return: f64,
    /// Population standard deviation of simple returns.
    pub volatility: f64,
    /// Lowest close.
    pub min_price: f64,
    /// Highest close.
    pub max_price: f64,
    /// Most recent close.
    pub last_price: f64,
    /// Sector label.
    pub sector: String,
    /// "large", "mid" or "small" from average traded value.
    pub market_cap_bucket: String,
    /// Bars violating the low/high envelope.
    pub malformed_bars: usize,
}

impl Default for SymbolSummary {
    fn default() -> Self {
        Self {
            bar_count: 0,
            mean_price: 0.0,
            mean_return: 0.0,
            volatility: 0.0,
            min_price: 0.0,
            max_price: 0.0,
            last_price: 0.0,
            sector: UNKNOWN_SECTOR.to_string(),
            market_cap_bucket: "small".to_string(),
            malformed_bars: 0,
        }
    }
}

// =============================================================================
// Feature Set
// =============================================================================

/// Named feature sequences plus scalar summaries for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Symbol these features belong to.
    pub symbol: Symbol,
    /// Scalar summaries.
    pub summary: SymbolSummary,
    /// Feature name -> sequence, ordered by name.
    values: BTreeMap<String, Vec<f64>>,
}

impl FeatureSet {
    /// Create an empty feature set.
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Insert or replace a feature sequence.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.values.insert(name.into(), values);
    }

    /// Borrow a feature sequence.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Whether the named feature is present (possibly empty).
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Feature names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate over `(name, sequence)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of features stored.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no features are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Latest finite value of a feature, skipping trailing `NaN`s.
    pub fn last_finite(&self, name: &str) -> Option<f64> {
        self.get(name)?.iter().rev().copied().find(|v| v.is_finite())
    }

    /// Finite samples of a feature, with `NaN`/`inf` masked out.
    pub fn finite_values(&self, name: &str) -> Vec<f64> {
        self.get(name)
            .map(|v| v.iter().copied().filter(|x| x.is_finite()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_set_insert_and_lookup() {
        let mut fs = FeatureSet::new("ACME");
        fs.insert("rsi", vec![40.0, 55.0, f64::NAN]);
        fs.insert("returns", vec![0.01, -0.02]);

        assert_eq!(fs.len(), 2);
        assert_eq!(fs.names().collect::<Vec<_>>(), vec!["returns", "rsi"]);
        assert_eq!(fs.last_finite("rsi"), Some(55.0));
        assert_eq!(fs.finite_values("rsi"), vec![40.0, 55.0]);
        assert!(fs.get("missing").is_none());
    }

    #[test]
    fn test_category_titles_and_colors() {
        assert_eq!(FeatureCategory::Risk.title(), "Risk Measures");
        assert_eq!(FeatureCategory::Volume.color(), [0.0, 0.8, 0.4]);
        assert_eq!(FeatureCategory::ALL.len(), 10);
    }
}
