//! Core types for the stat-arb workspace.
//!
//! This crate provides the shared data model used by every other crate:
//! OHLCV bar series, per-symbol feature sets, canonical symbol pairs, the
//! three pair-analysis result records, and the analysis configuration.
//!
//! # Modules
//!
//! - [`market_data`] - Column-oriented OHLCV series
//! - [`features`] - Feature sets, summaries and feature metadata enums
//! - [`ids`] - Symbols and canonical pair keys
//! - [`results`] - Correlation, cointegration and opportunity records
//! - [`config`] - Analysis configuration and portfolio constraints

pub mod config;
pub mod features;
pub mod ids;
pub mod market_data;
pub mod results;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AnalysisConfig, ConfigError, ConfigResult, PortfolioConstraints};
pub use features::{ChartType, FeatureCategory, FeatureSet, SymbolSummary};
pub use ids::{PairKey, Symbol, UNKNOWN_SECTOR};
pub use market_data::{Bar, OhlcvSeries, SeriesShapeError, Timestamp};
pub use results::{
    ArbitrageOpportunity, CointegrationResult, CorrelationResult, Grade, MarketRegime,
    VolatilityRegime,
};
