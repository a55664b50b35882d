//! Pair analysis: return correlation and Engle-Granger cointegration.
//!
//! [`PairAnalyzer::analyze`] is orientation-free. It puts the two legs in
//! [`PairKey`] order first, so the lexicographically smaller symbol is
//! always the regressor `P₁` and the hedge ratio is the slope of `P₂` on
//! `P₁`. Swapping the arguments therefore yields identical results.
//!
//! # Example
//! ```
//! use quant::kernels::Kernels;
//! use quant::pairs::{PairAnalyzer, PairSettings};
//!
//! let a: Vec<f64> = (0..120).map(|i| 50.0 + (i as f64 * 0.3).sin()).collect();
//! let b: Vec<f64> = a.iter().map(|p| 2.0 * p + 1.0).collect();
//!
//! let kernels = Kernels::select(true);
//! let analyzer = PairAnalyzer::new(&kernels, PairSettings::default());
//! let pair = analyzer.analyze("BBB", &b, "AAA", &a).unwrap();
//! assert_eq!(pair.cointegration.stock1, "AAA");
//! assert!((pair.cointegration.hedge_ratio - 2.0).abs() < 1e-9);
//! ```

pub mod adf;
pub mod cointegration;
pub mod correlation;

use tracing::trace;
use types::{AnalysisConfig, CointegrationResult, CorrelationResult, PairKey};

use crate::error::{QuantError, QuantResult, ensure_same_len};
use crate::kernels::Kernels;

pub use adf::{AdfOutcome, adf_test};
pub use cointegration::{TradeSimulation, half_life, simulate_trades};
pub use correlation::correlation_grade;

/// Tunables of the cointegration test and trade simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSettings {
    pub significance_level: f64,
    pub adf_max_lags: usize,
    pub entry_z: f64,
    pub exit_z: f64,
    pub stop_z: f64,
}

impl Default for PairSettings {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            adf_max_lags: 10,
            entry_z: 2.0,
            exit_z: 0.5,
            stop_z: 3.0,
        }
    }
}

impl PairSettings {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            significance_level: config.significance_level,
            adf_max_lags: config.adf_max_lags,
            entry_z: config.entry_z,
            exit_z: config.exit_z,
            stop_z: config.stop_z,
        }
    }
}

/// Both analyses of one canonical pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairAnalysis {
    pub correlation: CorrelationResult,
    pub cointegration: CointegrationResult,
}

impl PairAnalysis {
    pub fn key(&self) -> PairKey {
        self.cointegration.key()
    }

    /// Whether every numeric field of both results is finite.
    pub fn is_finite(&self) -> bool {
        self.correlation.is_finite() && self.cointegration.is_finite()
    }
}

/// Runs correlation and cointegration analysis on aligned price series.
#[derive(Debug, Clone, Copy)]
pub struct PairAnalyzer<'k> {
    kernels: &'k Kernels,
    settings: PairSettings,
}

impl<'k> PairAnalyzer<'k> {
    pub fn new(kernels: &'k Kernels, settings: PairSettings) -> Self {
        Self { kernels, settings }
    }

    pub fn settings(&self) -> &PairSettings {
        &self.settings
    }

    /// Analyse two aligned close series.
    ///
    /// Fails only on empty or differently sized inputs. Short histories give
    /// untested results (p-value 1, no trades) rather than errors.
    pub fn analyze(
        &self,
        symbol_a: &str,
        prices_a: &[f64],
        symbol_b: &str,
        prices_b: &[f64],
    ) -> QuantResult<PairAnalysis> {
        ensure_same_len(prices_a, prices_b)?;
        if prices_a.is_empty() {
            return Err(QuantError::EmptyInput("pair prices"));
        }

        let ((s1, p1), (s2, p2)) = if PairKey::is_canonical_order(symbol_a, symbol_b) {
            ((symbol_a, prices_a), (symbol_b, prices_b))
        } else {
            ((symbol_b, prices_b), (symbol_a, prices_a))
        };

        let mut correlation = correlation::correlation_stats(self.kernels, p1, p2)?;
        correlation.stock1 = s1.to_string();
        correlation.stock2 = s2.to_string();

        let mut cointegration = cointegration::cointegration_stats(self.kernels, p1, p2, &self.settings)?;
        cointegration.stock1 = s1.to_string();
        cointegration.stock2 = s2.to_string();

        trace!(
            pair = %format_args!("{s1}/{s2}"),
            pearson = correlation.pearson,
            adf = cointegration.adf_statistic,
            "pair analysed"
        );
        Ok(PairAnalysis {
            correlation,
            cointegration,
        })
    }
}
