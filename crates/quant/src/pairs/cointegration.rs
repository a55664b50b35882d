//! Engle-Granger cointegration, half-life and spread-trade simulation.

use types::{CointegrationResult, Grade};

use super::PairSettings;
use super::adf::{self, CRITICAL_1PCT, CRITICAL_5PCT, CRITICAL_10PCT};
use crate::error::QuantResult;
use crate::kernels::Kernels;
use crate::risk;
use crate::stats::negligible_dispersion;

/// Bars below which no test is run.
pub const MIN_COINTEGRATION_BARS: usize = 50;
/// Spread points needed for a half-life estimate.
pub const MIN_HALF_LIFE_POINTS: usize = 10;
/// Spread points needed for a trade simulation.
pub const MIN_SIMULATION_POINTS: usize = 20;
/// Per-trade return per unit of z-score change.
pub const RETURN_PER_Z: f64 = 0.01;

/// Cointegration statistics with `p1` as regressor and `p2` as regressand.
///
/// Symbols are left empty for the caller to fill.
pub fn cointegration_stats(
    kernels: &Kernels,
    p1: &[f64],
    p2: &[f64],
    settings: &PairSettings,
) -> QuantResult<CointegrationResult> {
    let mut result = CointegrationResult {
        p_value: 1.0,
        critical_1pct: CRITICAL_1PCT,
        critical_5pct: CRITICAL_5PCT,
        critical_10pct: CRITICAL_10PCT,
        entry_threshold: settings.entry_z,
        exit_threshold: settings.exit_z,
        stop_threshold: settings.stop_z,
        sample_size: p1.len(),
        ..CointegrationResult::default()
    };
    if p1.len() < MIN_COINTEGRATION_BARS {
        return Ok(result);
    }

    let (intercept, hedge_ratio) = kernels.linear_regression(p2, p1)?;
    result.intercept = intercept;
    result.hedge_ratio = hedge_ratio;

    let spread: Vec<f64> = p1
        .iter()
        .zip(p2)
        .map(|(x, y)| y - hedge_ratio * x)
        .collect();
    fill_spread_stats(kernels, &spread, &mut result);

    let adf = adf::adf_test(kernels, &spread, settings.adf_max_lags)?;
    result.adf_statistic = adf.statistic;
    result.p_value = adf.p_value;
    result.adf_lags = adf.lags;
    result.is_cointegrated = adf.rejects_unit_root(settings.significance_level);

    result.half_life = half_life(kernels, &spread)?;

    let sim = simulate_trades(&spread, result.spread_mean, result.spread_std, settings);
    result.historical_trades = sim.trades.len();
    result.expected_return = sim.mean_return();
    result.win_rate = sim.win_rate();
    result.sharpe_ratio = sim.sharpe();
    result.max_drawdown = sim.max_drawdown();

    result.grade = cointegration_grade(&result);
    Ok(result)
}

fn fill_spread_stats(kernels: &Kernels, spread: &[f64], result: &mut CointegrationResult) {
    let Some(&current) = spread.last() else {
        return;
    };
    result.spread_mean = kernels.mean(spread);
    result.spread_std = kernels.variance(spread).sqrt();
    result.current_spread = current;
    result.z_score = if negligible_dispersion(result.spread_std, result.spread_mean) {
        0.0
    } else {
        (current - result.spread_mean) / result.spread_std
    };
    let (lo, hi) = spread
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    result.spread_min = lo;
    result.spread_max = hi;
}

/// AR(1) half-life `-ln 2 / ln γ` of `s[t] = c + γ·s[t-1]`; 0 unless `γ ∈ (0, 1)`.
pub fn half_life(kernels: &Kernels, spread: &[f64]) -> QuantResult<f64> {
    if spread.len() < MIN_HALF_LIFE_POINTS {
        return Ok(0.0);
    }
    let (_, gamma) = kernels.linear_regression(&spread[1..], &spread[..spread.len() - 1])?;
    if gamma <= 0.0 || gamma >= 1.0 {
        return Ok(0.0);
    }
    Ok(-std::f64::consts::LN_2 / gamma.ln())
}

// =============================================================================
// Trade Simulation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Spread rich: sell it and wait for z to fall.
    Short,
    /// Spread cheap: buy it and wait for z to rise.
    Long,
}

/// Per-trade returns of a z-score band strategy over the history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeSimulation {
    pub trades: Vec<f64>,
}

impl TradeSimulation {
    pub fn mean_return(&self) -> f64 {
        crate::stats::mean(&self.trades).unwrap_or(0.0)
    }

    pub fn win_rate(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }
        self.trades.iter().filter(|&&r| r > 0.0).count() as f64 / self.trades.len() as f64
    }

    /// Mean over sample std; 0 with fewer than two trades or no dispersion.
    pub fn sharpe(&self) -> f64 {
        risk::sharpe_ratio(&self.trades).unwrap_or(0.0)
    }

    /// Largest drop of the cumulative return curve, starting flat at 0.
    pub fn max_drawdown(&self) -> f64 {
        let curve: Vec<f64> = std::iter::once(0.0)
            .chain(self.trades.iter().scan(0.0_f64, |acc, r| {
                *acc += r;
                Some(*acc)
            }))
            .collect();
        risk::max_drawdown_abs(&curve)
    }
}

/// Walk the spread's z-score: enter at |z| >= entry, exit when z crosses back
/// inside the exit band, stop out when |z| > stop. A trade returns
/// `RETURN_PER_Z` per unit of favourable z movement.
pub fn simulate_trades(spread: &[f64], mean: f64, std: f64, settings: &PairSettings) -> TradeSimulation {
    let mut sim = TradeSimulation::default();
    if spread.len() < MIN_SIMULATION_POINTS || negligible_dispersion(std, mean) {
        return sim;
    }

    let mut open: Option<(Side, f64)> = None;
    for &s in &spread[1..] {
        let z = (s - mean) / std;
        match open {
            None => {
                if z >= settings.entry_z {
                    open = Some((Side::Short, z));
                } else if z <= -settings.entry_z {
                    open = Some((Side::Long, z));
                }
            }
            Some((side, entry)) => {
                let reverted = match side {
                    Side::Short => z <= settings.exit_z,
                    Side::Long => z >= -settings.exit_z,
                };
                if reverted || z.abs() > settings.stop_z {
                    let moved = match side {
                        Side::Short => entry - z,
                        Side::Long => z - entry,
                    };
                    sim.trades.push(moved * RETURN_PER_Z);
                    open = None;
                }
            }
        }
    }
    sim
}

// =============================================================================
// Grade
// =============================================================================

/// Points out of 100: significance 40/30/20, half-life 30/15, win rate
/// 20/15/10, expected return 10/5. Non-cointegrated pairs grade D.
pub fn cointegration_score(result: &CointegrationResult) -> f64 {
    let mut score = 0.0;

    score += if result.p_value < 0.01 {
        40.0
    } else if result.p_value < 0.05 {
        30.0
    } else if result.p_value < 0.10 {
        20.0
    } else {
        0.0
    };

    let hl = result.half_life;
    score += if (5.0..=50.0).contains(&hl) {
        30.0
    } else if hl > 0.0 && hl < 100.0 {
        15.0
    } else {
        0.0
    };

    score += if result.win_rate > 0.6 {
        20.0
    } else if result.win_rate > 0.5 {
        15.0
    } else if result.win_rate > 0.4 {
        10.0
    } else {
        0.0
    };

    score += if result.expected_return > 0.02 {
        10.0
    } else if result.expected_return > 0.01 {
        5.0
    } else {
        0.0
    };

    score
}

pub fn cointegration_grade(result: &CointegrationResult) -> Grade {
    if !result.is_cointegrated {
        return Grade::D;
    }
    Grade::from_score(cointegration_score(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::Normal;

    fn settings() -> PairSettings {
        PairSettings::default()
    }

    #[test]
    fn test_half_life_of_ar1() {
        let mut rng = StdRng::seed_from_u64(11);
        let noise = Normal::new(0.0_f64, 1.0).unwrap();
        let mut s = vec![0.0];
        for i in 1..2000 {
            s.push(0.5 * s[i - 1] + rng.sample(noise));
        }
        let hl = half_life(&Kernels::scalar(), &s).unwrap();
        assert!((hl - 1.0).abs() < 0.15, "{hl}");
    }

    #[test]
    fn test_half_life_degenerate() {
        let k = Kernels::scalar();
        assert_eq!(half_life(&k, &[1.0; 5]).unwrap(), 0.0);
        // Trending: gamma >= 1.
        let trend: Vec<f64> = (0..50).map(|i| 1.05f64.powi(i)).collect();
        assert_eq!(half_life(&k, &trend).unwrap(), 0.0);
        // Flipping sign: gamma < 0.
        let flip: Vec<f64> = (0..50).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert_eq!(half_life(&k, &flip).unwrap(), 0.0);
    }

    #[test]
    fn test_simulation_short_and_long_round_trips() {
        // mean 0, std 1 by construction of the caller arguments.
        let mut spread = vec![0.0; 25];
        spread[3] = 2.5; // short entry
        spread[4] = 1.0;
        spread[5] = 0.2; // exit: z <= 0.5, return (2.5 - 0.2) * 0.01
        spread[8] = -2.0; // long entry
        spread[9] = -3.5; // stop: return (-3.5 + 2.0) * 0.01
        let sim = simulate_trades(&spread, 0.0, 1.0, &settings());
        assert_eq!(sim.trades.len(), 2);
        assert!((sim.trades[0] - 0.023).abs() < 1e-12);
        assert!((sim.trades[1] + 0.015).abs() < 1e-12);
        assert_eq!(sim.win_rate(), 0.5);
        assert!((sim.max_drawdown() - 0.015).abs() < 1e-12);
        assert!(sim.sharpe().abs() > 0.0);
    }

    #[test]
    fn test_simulation_needs_history_and_dispersion() {
        assert!(simulate_trades(&[3.0; 10], 0.0, 1.0, &settings()).trades.is_empty());
        assert!(simulate_trades(&[3.0; 30], 3.0, 0.0, &settings()).trades.is_empty());
        let sim = TradeSimulation::default();
        assert_eq!(sim.sharpe(), 0.0);
        assert_eq!(sim.max_drawdown(), 0.0);
    }

    #[test]
    fn test_identical_trades_have_no_sharpe() {
        let sim = TradeSimulation {
            trades: vec![0.013; 5],
        };
        assert_eq!(sim.sharpe(), 0.0);
        assert_eq!(sim.win_rate(), 1.0);
    }

    #[test]
    fn test_flat_spread_has_no_z_score_or_trades() {
        let k = Kernels::scalar();
        let spread = vec![0.013; 30];
        let mut r = CointegrationResult::default();
        fill_spread_stats(&k, &spread, &mut r);
        assert_eq!(r.z_score, 0.0);
        assert_eq!(r.current_spread, 0.013);

        let sim = simulate_trades(&spread, r.spread_mean, r.spread_std, &settings());
        assert!(sim.trades.is_empty());
        // Residue-sized std is not a scale.
        assert!(simulate_trades(&spread, 0.013, 1e-18, &settings()).trades.is_empty());
    }

    #[test]
    fn test_short_history_is_not_tested() {
        let p: Vec<f64> = (0..49).map(|i| 100.0 + i as f64).collect();
        let r = cointegration_stats(&Kernels::scalar(), &p, &p, &settings()).unwrap();
        assert_eq!(r.p_value, 1.0);
        assert!(!r.is_cointegrated);
        assert_eq!(r.historical_trades, 0);
        assert_eq!(r.sharpe_ratio, 0.0);
        assert_eq!(r.grade, Grade::D);
    }

    #[test]
    fn test_score_components() {
        let r = CointegrationResult {
            is_cointegrated: true,
            p_value: 0.005,
            half_life: 10.0,
            win_rate: 0.7,
            expected_return: 0.03,
            ..Default::default()
        };
        assert_eq!(cointegration_score(&r), 100.0);
        assert_eq!(cointegration_grade(&r), Grade::A);

        let r = CointegrationResult {
            p_value: 0.04,
            half_life: 80.0,
            win_rate: 0.45,
            expected_return: 0.015,
            ..r
        };
        assert_eq!(cointegration_score(&r), 30.0 + 15.0 + 10.0 + 5.0);
        assert_eq!(cointegration_grade(&r), Grade::C);

        let r = CointegrationResult {
            is_cointegrated: false,
            ..r
        };
        assert_eq!(cointegration_grade(&r), Grade::D);
    }
}
