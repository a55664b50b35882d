//! Arbitrage crate: the pair-scanning engine.
//!
//! This crate turns loaded OHLCV series into ranked pair-trading
//! candidates:
//! - Per-symbol feature sets (via `quant::FeaturePipeline`)
//! - Parallel pair analysis over a fixed worker pool
//! - Pair-keyed result caching with persistence
//! - Opportunity scoring and letter grades
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              AnalysisEngine.run()             │
//! │                                               │
//! │  1. Load CSVs             (storage)           │
//! │  2. Compute features      (quant pipeline)    │
//! │  3. Filter universe       (scheduler)         │
//! │  4. Analyse pairs         (scheduler + cache) │
//! │  5. Assemble opportunities                    │
//! │  6. Export results        (storage)           │
//! │  7. Persist cache                             │
//! │                                               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Progress flows through a caller-supplied [`ProgressCallback`]; per-pair
//! failures are logged and dropped; only configuration and I/O errors reach
//! the caller as [`EngineError`].
//!
//! # Example
//!
//! ```
//! use arbitrage::AnalysisEngine;
//! use types::{AnalysisConfig, OhlcvSeries};
//!
//! let config = AnalysisConfig::default().with_min_data_points(2).with_num_threads(1);
//! let mut engine = AnalysisEngine::new(config).unwrap();
//! let series = vec![
//!     OhlcvSeries::from_closes("AAA", &[20.0, 21.0, 22.0]),
//!     OhlcvSeries::from_closes("BBB", &[40.0, 42.0, 44.0]),
//! ];
//! let report = engine.analyze(&series).unwrap();
//! assert_eq!(report.metrics.total_pairs_analyzed, 1);
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod opportunity;
pub mod progress;
pub mod scheduler;

pub use cache::{CacheSettings, CacheStats, ResultCache};
pub use engine::{AnalysisEngine, AnalysisReport};
pub use error::{CacheError, EngineError, EngineResult};
pub use metrics::AnalysisMetrics;
pub use opportunity::{AssemblyParams, assemble_opportunities};
pub use progress::{ProgressCallback, ProgressReporter, Stage};
pub use scheduler::{PairScheduler, ScheduleOutcome, SymbolEntry, enumerate_pairs, filter_universe, is_fresh};
