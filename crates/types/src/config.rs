//! Analysis configuration.
//!
//! [`AnalysisConfig`] holds every knob of an analysis run: input/output
//! locations, statistical thresholds, execution settings, export switches and
//! the [`PortfolioConstraints`] applied when choosing pairs. Both structs are
//! `#[serde(default)]`, so a TOML file only needs the keys it overrides.

use crate::ids::{Symbol, UNKNOWN_SECTOR};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value is outside its permitted range.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The TOML text could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The config file could not be read or written.
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Portfolio Constraints
// =============================================================================

/// Capital and universe constraints applied to candidate pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConstraints {
    /// Capital available for one spread position.
    pub max_capital: f64,
    /// Maximum concurrent positions.
    pub max_positions: usize,
    /// Lowest acceptable last close.
    pub min_stock_price: f64,
    /// Highest acceptable last close.
    pub max_stock_price: f64,
    /// Maximum fraction of capital at risk per position.
    pub max_position_risk: f64,
    /// Minimum expected annual return for an opportunity.
    pub min_expected_return: f64,
    /// Only pair stocks from the same sector.
    pub require_same_sector: bool,
    /// Sectors excluded from the universe.
    pub excluded_sectors: Vec<String>,
}

impl Default for PortfolioConstraints {
    fn default() -> Self {
        Self {
            max_capital: 5000.0,
            max_positions: 5,
            min_stock_price: 10.0,
            max_stock_price: 500.0,
            max_position_risk: 0.20,
            min_expected_return: 0.05,
            require_same_sector: false,
            excluded_sectors: Vec::new(),
        }
    }
}

impl PortfolioConstraints {
    /// Whether a last close lies inside `[min_stock_price, max_stock_price]`.
    pub fn price_in_range(&self, price: f64) -> bool {
        price >= self.min_stock_price && price <= self.max_stock_price
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

/// Master configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Locations
    // ─────────────────────────────────────────────────────────────────────────
    /// Directory holding one CSV per symbol.
    pub input_data_directory: PathBuf,
    /// Directory receiving result files.
    pub output_directory: PathBuf,

    // ─────────────────────────────────────────────────────────────────────────
    // Statistical Thresholds
    // ─────────────────────────────────────────────────────────────────────────
    /// Minimum |Pearson| for a correlation result to be kept.
    pub min_correlation_threshold: f64,
    /// Maximum ADF p-value for a cointegration result to be kept.
    pub max_cointegration_pvalue: f64,
    /// Significance level for the cointegration flag.
    pub significance_level: f64,
    /// Minimum bars per symbol.
    pub min_data_points: usize,
    /// Only pair stocks from the same sector.
    pub require_same_sector: bool,
    /// Half-life at or above which a cointegrated pair is dropped.
    pub max_half_life: f64,
    /// Upper bound of the ADF augmentation lag search.
    pub adf_max_lags: usize,
    /// |z| that opens a simulated trade.
    pub entry_z: f64,
    /// |z| that closes a simulated trade.
    pub exit_z: f64,
    /// |z| that stops out a simulated trade.
    pub stop_z: f64,

    // ─────────────────────────────────────────────────────────────────────────
    // Execution
    // ─────────────────────────────────────────────────────────────────────────
    /// Worker threads (0 = hardware concurrency).
    pub num_threads: usize,
    /// Use SIMD kernels when the CPU supports them.
    pub enable_simd: bool,
    /// Memoize per-pair results.
    pub enable_caching: bool,
    /// Cap on analysed pairs (0 = unlimited).
    pub max_pairs_to_analyze: usize,
    /// Persisted cache location, loaded before and saved after a run.
    pub cache_file: Option<PathBuf>,
    /// Report progress at least every this many pairs.
    pub progress_every_pairs: usize,
    /// Report progress at least this often.
    pub progress_interval_ms: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Universe
    // ─────────────────────────────────────────────────────────────────────────
    /// Restrict to these sectors (empty = all).
    pub focus_sectors: Vec<String>,
    /// Symbols never analysed.
    pub excluded_symbols: Vec<Symbol>,
    /// Symbol -> sector lookup.
    pub sector_map: HashMap<Symbol, String>,
    /// Capital and price constraints.
    pub portfolio_constraints: PortfolioConstraints,

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────
    /// Write the three CSV tables.
    pub export_csv: bool,
    /// Write a JSON document with all results.
    pub export_json: bool,
    /// File stem of the JSON export.
    pub output_filename: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            // Locations
            input_data_directory: PathBuf::from("data/input"),
            output_directory: PathBuf::from("data/output"),

            // Statistical Thresholds
            min_correlation_threshold: 0.7,
            max_cointegration_pvalue: 0.05,
            significance_level: 0.05,
            min_data_points: 100,
            require_same_sector: false,
            max_half_life: 100.0,
            adf_max_lags: 10,
            entry_z: 2.0,
            exit_z: 0.5,
            stop_z: 3.0,

            // Execution
            num_threads: 0,
            enable_simd: true,
            enable_caching: true,
            max_pairs_to_analyze: 0,
            cache_file: None,
            progress_every_pairs: 1000,
            progress_interval_ms: 500,

            // Universe
            focus_sectors: Vec::new(),
            excluded_symbols: Vec::new(),
            sector_map: HashMap::new(),
            portfolio_constraints: PortfolioConstraints::default(),

            // Export
            export_csv: true,
            export_json: false,
            output_filename: "statistical_arbitrage_opportunities".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Small capped run for smoke tests and demos.
    pub fn quick() -> Self {
        Self {
            max_pairs_to_analyze: 500,
            min_data_points: 60,
            ..Self::default()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder-style setters
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the input directory.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_data_directory = dir.into();
        self
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    /// Set the minimum correlation threshold.
    pub fn with_min_correlation(mut self, threshold: f64) -> Self {
        self.min_correlation_threshold = threshold;
        self
    }

    /// Set the maximum cointegration p-value.
    pub fn with_max_pvalue(mut self, pvalue: f64) -> Self {
        self.max_cointegration_pvalue = pvalue;
        self
    }

    /// Set the minimum number of bars per symbol.
    pub fn with_min_data_points(mut self, n: usize) -> Self {
        self.min_data_points = n;
        self
    }

    /// Set the worker count (0 = hardware concurrency).
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    /// Enable or disable SIMD kernels.
    pub fn with_simd(mut self, enabled: bool) -> Self {
        self.enable_simd = enabled;
        self
    }

    /// Enable or disable result caching.
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.enable_caching = enabled;
        self
    }

    /// Cap the number of analysed pairs (0 = unlimited).
    pub fn with_max_pairs(mut self, n: usize) -> Self {
        self.max_pairs_to_analyze = n;
        self
    }

    /// Assign a sector to a symbol.
    pub fn with_sector(mut self, symbol: impl Into<Symbol>, sector: impl Into<String>) -> Self {
        self.sector_map.insert(symbol.into(), sector.into());
        self
    }

    /// Replace the portfolio constraints.
    pub fn with_constraints(mut self, constraints: PortfolioConstraints) -> Self {
        self.portfolio_constraints = constraints;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Sector of a symbol, or [`UNKNOWN_SECTOR`].
    pub fn sector_of(&self, symbol: &str) -> &str {
        self.sector_map
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_SECTOR)
    }

    /// Whether pairs must share a sector (top-level flag or constraint).
    pub fn same_sector_required(&self) -> bool {
        self.require_same_sector || self.portfolio_constraints.require_same_sector
    }

    /// Reject out-of-range thresholds and a non-positive capital cap.
    pub fn validate(&self) -> ConfigResult<()> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.min_correlation_threshold) {
            return Err(ConfigError::Invalid(format!(
                "min_correlation_threshold must be in [0, 1], got {}",
                self.min_correlation_threshold
            )));
        }
        if !unit.contains(&self.max_cointegration_pvalue) {
            return Err(ConfigError::Invalid(format!(
                "max_cointegration_pvalue must be in [0, 1], got {}",
                self.max_cointegration_pvalue
            )));
        }
        if !unit.contains(&self.significance_level) {
            return Err(ConfigError::Invalid(format!(
                "significance_level must be in [0, 1], got {}",
                self.significance_level
            )));
        }
        if self.portfolio_constraints.max_capital.is_nan()
            || self.portfolio_constraints.max_capital <= 0.0
        {
            return Err(ConfigError::Invalid(format!(
                "max_capital must be > 0, got {}",
                self.portfolio_constraints.max_capital
            )));
        }
        if self.min_data_points < 2 {
            return Err(ConfigError::Invalid(format!(
                "min_data_points must be >= 2, got {}",
                self.min_data_points
            )));
        }
        if self.exit_z < 0.0 || self.entry_z <= self.exit_z || self.stop_z <= self.entry_z {
            return Err(ConfigError::Invalid(format!(
                "z thresholds must satisfy 0 <= exit < entry < stop, got {}/{}/{}",
                self.exit_z, self.entry_z, self.stop_z
            )));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // TOML persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            source,
        })
    }

    /// Load a config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the config as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config to a TOML file.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_correlation_threshold, 0.7);
        assert_eq!(config.portfolio_constraints.max_capital, 5000.0);
        assert_eq!(config.portfolio_constraints.max_positions, 5);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        assert!(AnalysisConfig::new().with_min_correlation(1.5).validate().is_err());
        assert!(AnalysisConfig::new().with_max_pvalue(-0.1).validate().is_err());

        let constraints = PortfolioConstraints {
            max_capital: 0.0,
            ..Default::default()
        };
        let err = AnalysisConfig::new()
            .with_constraints(constraints)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max_capital"));
    }

    #[test]
    fn test_partial_toml_overrides_only_named_keys() {
        let text = r#"
            min_correlation_threshold = 0.8
            num_threads = 4

            [portfolio_constraints]
            max_capital = 10000.0

            [sector_map]
            XOM = "Energy"
        "#;
        let config = AnalysisConfig::from_toml_str(text).unwrap();
        assert_eq!(config.min_correlation_threshold, 0.8);
        assert_eq!(config.num_threads, 4);
        assert_eq!(config.portfolio_constraints.max_capital, 10000.0);
        assert_eq!(config.portfolio_constraints.min_stock_price, 10.0);
        assert_eq!(config.sector_of("XOM"), "Energy");
        assert_eq!(config.sector_of("AAPL"), UNKNOWN_SECTOR);
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");
        let config = AnalysisConfig::quick()
            .with_num_threads(2)
            .with_sector("AAPL", "Technology");
        config.save_toml(&path).unwrap();

        let loaded = AnalysisConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AnalysisConfig::from_toml_file("/nonexistent/analysis.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
