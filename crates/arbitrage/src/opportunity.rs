//! Opportunity assembly: join cointegration and correlation results on the
//! canonical pair key and score the joined pair.

use std::collections::HashMap;

use types::{
    ArbitrageOpportunity, CointegrationResult, CorrelationResult, Grade, MarketRegime, PairKey,
    SymbolSummary, VolatilityRegime,
};

/// Trading bars per year.
pub const BARS_PER_YEAR: f64 = 252.0;
/// Cointegration score of a cointegrated pair.
pub const COINTEGRATED_SCORE: f64 = 90.0;
/// Cointegration score of a pair that is not cointegrated.
pub const NOT_COINTEGRATED_SCORE: f64 = 50.0;
/// Mean per-bar return beyond which a pair trends.
pub const TREND_RETURN: f64 = 0.0005;
/// Mean per-bar volatility bounds of the low and medium regimes.
pub const LOW_VOLATILITY: f64 = 0.015;
pub const MEDIUM_VOLATILITY: f64 = 0.03;

/// Scoring knobs taken from the analysis config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyParams {
    /// Half-life at which the half-life risk component saturates.
    pub max_half_life: f64,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self { max_half_life: 100.0 }
    }
}

/// Join `cointegration` and `correlation` on pair key and score each match.
///
/// `summaries` supplies per-symbol mean return and volatility for the
/// regime tags; symbols without a summary get the neutral regimes.
/// Output is sorted by combined score (descending), ties by key.
pub fn assemble_opportunities(
    cointegration: &[CointegrationResult],
    correlation: &[CorrelationResult],
    summaries: &HashMap<String, SymbolSummary>,
    params: AssemblyParams,
) -> Vec<ArbitrageOpportunity> {
    let by_key: HashMap<PairKey, &CorrelationResult> =
        correlation.iter().map(|c| (c.key(), c)).collect();

    let mut opportunities: Vec<ArbitrageOpportunity> = cointegration
        .iter()
        .filter_map(|coint| {
            let corr = by_key.get(&coint.key())?;
            let s1 = summaries.get(&coint.stock1);
            let s2 = summaries.get(&coint.stock2);
            Some(build(coint, corr, s1, s2, params))
        })
        .collect();

    opportunities.sort_by(|a, b| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then_with(|| (&a.stock1, &a.stock2).cmp(&(&b.stock1, &b.stock2)))
    });
    opportunities
}

fn build(
    coint: &CointegrationResult,
    corr: &CorrelationResult,
    s1: Option<&SymbolSummary>,
    s2: Option<&SymbolSummary>,
    params: AssemblyParams,
) -> ArbitrageOpportunity {
    let cointegration_score = if coint.is_cointegrated {
        COINTEGRATED_SCORE
    } else {
        NOT_COINTEGRATED_SCORE
    };
    let correlation_score = (corr.pearson * 100.0).clamp(0.0, 100.0);
    let combined_score = (cointegration_score + correlation_score) / 2.0;

    let trades_per_year = trades_per_year(coint);
    let (market_regime, volatility_regime) = match (s1, s2) {
        (Some(a), Some(b)) => (
            market_regime((a.mean_return + b.mean_return) / 2.0),
            volatility_regime((a.volatility + b.volatility) / 2.0),
        ),
        _ => (MarketRegime::default(), VolatilityRegime::default()),
    };

    ArbitrageOpportunity {
        stock1: coint.stock1.clone(),
        stock2: coint.stock2.clone(),
        cointegration_score,
        correlation_score,
        combined_score,
        profit_potential: coint.expected_return * trades_per_year,
        risk_score: risk_score(coint, params),
        entry_z_score: coint.entry_threshold,
        exit_z_score: coint.exit_threshold,
        stop_loss_z_score: coint.stop_threshold,
        position_size_stock1: 1.0,
        position_size_stock2: coint.hedge_ratio,
        cash_required: corr.price1 + coint.hedge_ratio.abs() * corr.price2,
        expected_sharpe: coint.sharpe_ratio,
        max_drawdown: coint.max_drawdown,
        expected_trades_per_year: trades_per_year,
        market_regime,
        volatility_regime,
        grade: opportunity_grade(combined_score, coint.is_cointegrated),
    }
}

/// Simulated round trips scaled to a year of bars.
pub fn trades_per_year(coint: &CointegrationResult) -> f64 {
    if coint.sample_size == 0 {
        return 0.0;
    }
    coint.historical_trades as f64 * BARS_PER_YEAR / coint.sample_size as f64
}

/// 0-100 risk: 40 points for the loss rate, 30 for slow reversion and 30 for
/// how far the spread already sits toward the stop.
pub fn risk_score(coint: &CointegrationResult, params: AssemblyParams) -> f64 {
    let loss_rate = if coint.historical_trades > 0 {
        1.0 - coint.win_rate
    } else {
        1.0
    };
    let slowness = if coint.half_life > 0.0 && params.max_half_life > 0.0 {
        (coint.half_life / params.max_half_life).min(1.0)
    } else {
        1.0
    };
    let stretch = if coint.stop_threshold > 0.0 {
        (coint.z_score.abs() / coint.stop_threshold).min(1.0)
    } else {
        0.0
    };
    (40.0 * loss_rate + 30.0 * slowness + 30.0 * stretch).clamp(0.0, 100.0)
}

/// A needs a cointegrated pair; the rest follow the combined score.
pub fn opportunity_grade(combined_score: f64, is_cointegrated: bool) -> Grade {
    if combined_score >= 80.0 && is_cointegrated {
        Grade::A
    } else if combined_score >= 65.0 {
        Grade::B
    } else if combined_score >= 50.0 {
        Grade::C
    } else {
        Grade::D
    }
}

pub fn market_regime(mean_return: f64) -> MarketRegime {
    if mean_return > TREND_RETURN {
        MarketRegime::Bull
    } else if mean_return < -TREND_RETURN {
        MarketRegime::Bear
    } else {
        MarketRegime::Sideways
    }
}

pub fn volatility_regime(volatility: f64) -> VolatilityRegime {
    if volatility < LOW_VOLATILITY {
        VolatilityRegime::Low
    } else if volatility < MEDIUM_VOLATILITY {
        VolatilityRegime::Medium
    } else {
        VolatilityRegime::High
    }
}
