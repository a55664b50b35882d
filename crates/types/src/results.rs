//! Pair analysis result records.
//!
//! These are the three record shapes produced by an analysis run:
//! [`CorrelationResult`], [`CointegrationResult`] and the joined
//! [`ArbitrageOpportunity`]. Stock orientation always follows [`PairKey`]:
//! `stock1` is the lexicographically smaller symbol.

use crate::ids::{PairKey, Symbol};
use derive_more::Display;
use serde::{Deserialize, Serialize};

// =============================================================================
// Grades and Regimes
// =============================================================================

/// Coarse letter rating.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, Serialize, Deserialize,
)]
pub enum Grade {
    A,
    B,
    C,
    #[default]
    D,
}

impl Grade {
    /// Map a 0-100 score onto A (>= 80), B (>= 65), C (>= 50), else D.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Grade::A
        } else if score >= 65.0 {
            Grade::B
        } else if score >= 50.0 {
            Grade::C
        } else {
            Grade::D
        }
    }
}

/// Trend regime of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
pub enum MarketRegime {
    #[display("bull")]
    Bull,
    #[display("bear")]
    Bear,
    #[default]
    #[display("sideways")]
    Sideways,
}

/// Volatility regime of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
pub enum VolatilityRegime {
    #[display("low")]
    Low,
    #[default]
    #[display("medium")]
    Medium,
    #[display("high")]
    High,
}

// =============================================================================
// Correlation
// =============================================================================

/// Return-correlation statistics for a pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub stock1: Symbol,
    pub stock2: Symbol,
    /// Pearson correlation of simple returns.
    pub pearson: f64,
    /// Spearman rank correlation of simple returns.
    pub spearman: f64,
    /// Kendall tau-a of simple returns.
    pub kendall_tau: f64,
    /// Mean of the 30-bar rolling correlation.
    pub rolling_30: f64,
    /// Mean of the 60-bar rolling correlation.
    pub rolling_60: f64,
    /// 1 - stddev(rolling 30-bar correlation).
    pub stability: f64,
    /// Rolling 30-bar samples with |rho| below the breakdown threshold.
    pub breakdown_count: usize,
    /// Minimum rolling 30-bar correlation.
    pub min_correlation: f64,
    /// Maximum rolling 30-bar correlation.
    pub max_correlation: f64,
    pub grade: Grade,
    pub sector1: String,
    pub sector2: String,
    pub same_sector: bool,
    /// Last close of stock1.
    pub price1: f64,
    /// Last close of stock2.
    pub price2: f64,
    /// Both legs fit the price range and capital cap.
    pub affordable: bool,
}

impl CorrelationResult {
    /// Canonical key of this pair.
    pub fn key(&self) -> PairKey {
        PairKey::new(self.stock1.as_str(), self.stock2.as_str())
    }

    /// Ranking key: |pearson| scaled by stability.
    pub fn rank(&self) -> f64 {
        self.pearson.abs() * self.stability
    }

    /// Whether every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.pearson,
            self.spearman,
            self.kendall_tau,
            self.rolling_30,
            self.rolling_60,
            self.stability,
            self.min_correlation,
            self.max_correlation,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

// =============================================================================
// Cointegration
// =============================================================================

/// Engle-Granger cointegration statistics and spread-trading metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CointegrationResult {
    /// Regressor `P₁`.
    pub stock1: Symbol,
    /// Regressand `P₂`.
    pub stock2: Symbol,
    /// Slope of `P₂` on `P₁`.
    pub hedge_ratio: f64,
    /// Intercept of `P₂` on `P₁`.
    pub intercept: f64,
    pub adf_statistic: f64,
    pub p_value: f64,
    /// Augmentation lag chosen by AIC.
    pub adf_lags: usize,
    pub critical_1pct: f64,
    pub critical_5pct: f64,
    pub critical_10pct: f64,
    pub is_cointegrated: bool,
    pub spread_mean: f64,
    pub spread_std: f64,
    pub spread_min: f64,
    pub spread_max: f64,
    pub current_spread: f64,
    /// (current - mean) / std of the spread.
    pub z_score: f64,
    /// Bars for a deviation to halve; 0 when not mean reverting.
    pub half_life: f64,
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub stop_threshold: f64,
    /// Simulated round trips over the history.
    pub historical_trades: usize,
    /// Mean per-trade return proxy (unitless, z-units x 0.01).
    pub expected_return: f64,
    pub sharpe_ratio: f64,
    pub win_rate: f64,
    /// Largest drop of the cumulative simulated-trade equity curve.
    pub max_drawdown: f64,
    /// Bars used in the test.
    pub sample_size: usize,
    pub grade: Grade,
}

impl CointegrationResult {
    /// Canonical key of this pair.
    pub fn key(&self) -> PairKey {
        PairKey::new(self.stock1.as_str(), self.stock2.as_str())
    }

    /// Whether every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        [
            self.hedge_ratio,
            self.intercept,
            self.adf_statistic,
            self.p_value,
            self.spread_mean,
            self.spread_std,
            self.spread_min,
            self.spread_max,
            self.current_spread,
            self.z_score,
            self.half_life,
            self.expected_return,
            self.sharpe_ratio,
            self.win_rate,
            self.max_drawdown,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

// =============================================================================
// Opportunity
// =============================================================================

/// Joined cointegration + correlation view of a tradable pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub stock1: Symbol,
    pub stock2: Symbol,
    /// 0-100.
    pub cointegration_score: f64,
    /// 0-100.
    pub correlation_score: f64,
    /// Mean of the two scores.
    pub combined_score: f64,
    /// Expected return per trade x trades per year.
    pub profit_potential: f64,
    /// 0-100, higher is riskier.
    pub risk_score: f64,
    pub entry_z_score: f64,
    pub exit_z_score: f64,
    pub stop_loss_z_score: f64,
    /// Units of stock1 per spread unit.
    pub position_size_stock1: f64,
    /// Units of stock2 per spread unit (hedge ratio).
    pub position_size_stock2: f64,
    pub cash_required: f64,
    pub expected_sharpe: f64,
    pub max_drawdown: f64,
    pub expected_trades_per_year: f64,
    pub market_regime: MarketRegime,
    pub volatility_regime: VolatilityRegime,
    pub grade: Grade,
}

impl ArbitrageOpportunity {
    /// Canonical key of this pair.
    pub fn key(&self) -> PairKey {
        PairKey::new(self.stock1.as_str(), self.stock2.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_from_score_boundaries() {
        assert_eq!(Grade::from_score(80.0), Grade::A);
        assert_eq!(Grade::from_score(79.99), Grade::B);
        assert_eq!(Grade::from_score(65.0), Grade::B);
        assert_eq!(Grade::from_score(50.0), Grade::C);
        assert_eq!(Grade::from_score(49.0), Grade::D);
    }

    #[test]
    fn test_regime_display() {
        assert_eq!(MarketRegime::Bull.to_string(), "bull");
        assert_eq!(VolatilityRegime::High.to_string(), "high");
        assert_eq!(Grade::B.to_string(), "B");
    }

    #[test]
    fn test_result_key_is_canonical() {
        let r = CointegrationResult {
            stock1: "MSFT".into(),
            stock2: "AAPL".into(),
            ..Default::default()
        };
        assert_eq!(r.key().first(), "AAPL");
    }

    #[test]
    fn test_nan_fields_detected() {
        let mut r = CorrelationResult::default();
        assert!(r.is_finite());
        r.spearman = f64::NAN;
        assert!(!r.is_finite());
    }
}
