//! Quantitative analysis crate for the stat-arb workspace.
//!
//! This crate provides the numeric kernels, the indicator library, the
//! per-symbol feature pipeline and the pair statistics used to scan a
//! universe of symbols for statistical-arbitrage candidates.
//!
//! # Modules
//!
//! - [`kernels`] - Runtime-dispatched vector primitives (AVX2, NEON, scalar)
//! - [`indicators`] - Indicator functions and the named registry
//! - [`pipeline`] - OHLCV series to feature set
//! - [`pairs`] - Correlation, ADF and cointegration analysis
//! - [`stats`] - Statistical utilities
//! - [`rolling`] - Rolling window helpers
//! - [`risk`] - Risk metrics (VaR, Sharpe, drawdown)
//!
//! # Example
//!
//! ```
//! use quant::{FeaturePipeline, Kernels};
//! use types::OhlcvSeries;
//!
//! let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.2).sin()).collect();
//! let series = OhlcvSeries::from_closes("ACME", &closes);
//!
//! let kernels = Kernels::select(true);
//! let features = FeaturePipeline::default().compute(&series, &kernels).unwrap();
//! assert_eq!(features.get("returns").unwrap().len(), 59);
//! ```
//!
//! # Design Notes
//!
//! - All calculations use `f64`
//! - Numeric primitives and indicators never fail; degenerate inputs map to
//!   documented fallback values and short inputs to empty sequences
//! - [`Kernels`] is `Send + Sync` and shared by reference across workers

pub mod error;
pub mod indicators;
pub mod kernels;
pub mod pairs;
pub mod pipeline;
pub mod risk;
pub mod rolling;
pub mod stats;

// Re-export main types at crate root for convenience
pub use error::{QuantError, QuantResult};
pub use indicators::{Alignment, FeatureContext, IndicatorRegistry, IndicatorSpec};
pub use kernels::{KernelStats, KernelVariant, Kernels};
pub use pairs::{PairAnalysis, PairAnalyzer, PairSettings};
pub use pipeline::FeaturePipeline;
pub use risk::{annualized_volatility, historical_var, max_drawdown, sharpe_ratio, sortino_ratio};
