//! Command-line configuration for the `stat-arb` binary.
//!
//! Precedence: CLI flag (or its `ARB_*` environment variable) over the TOML
//! file named by `--config`, over [`AnalysisConfig::default`].

use std::path::PathBuf;

use clap::Parser;
use types::{AnalysisConfig, ConfigResult};

/// Stat-Arb Lab - feature engineering and pair scanning over OHLCV CSVs
#[derive(Parser, Debug, Default)]
#[command(name = "stat-arb")]
#[command(about = "Scan a directory of OHLCV CSVs for statistical-arbitrage pairs")]
#[command(version)]
pub struct Args {
    /// TOML configuration file (partial files override only the keys they name)
    #[arg(long, env = "ARB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory of per-symbol OHLCV CSV files
    #[arg(long, env = "ARB_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory for exported result tables
    #[arg(long, env = "ARB_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Minimum absolute Pearson correlation to keep a pair
    #[arg(long, env = "ARB_MIN_CORRELATION")]
    pub min_correlation: Option<f64>,

    /// Maximum ADF p-value for a pair to count as cointegrated
    #[arg(long, env = "ARB_MAX_PVALUE")]
    pub max_pvalue: Option<f64>,

    /// Minimum bars a symbol needs to enter the universe
    #[arg(long, env = "ARB_MIN_DATA_POINTS")]
    pub min_data_points: Option<usize>,

    /// Worker threads (0 = all cores)
    #[arg(long, env = "ARB_THREADS")]
    pub threads: Option<usize>,

    /// Cap on the number of pairs analysed
    #[arg(long, env = "ARB_MAX_PAIRS")]
    pub max_pairs: Option<usize>,

    /// Force the scalar kernels
    #[arg(long, env = "ARB_NO_SIMD")]
    pub no_simd: bool,

    /// Disable the pair result cache
    #[arg(long, env = "ARB_NO_CACHE")]
    pub no_cache: bool,

    /// Load the pair cache from this file before the run and save it after
    #[arg(long, env = "ARB_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Also write the combined JSON document
    #[arg(long, env = "ARB_JSON")]
    pub json: bool,

    /// Time scalar vs dispatched kernels on synthetic data and exit
    #[arg(long, env = "ARB_BENCHMARK")]
    pub benchmark: bool,

    /// Write the effective configuration to this TOML file and exit
    #[arg(long, env = "ARB_WRITE_DEFAULT_CONFIG")]
    pub write_default_config: Option<PathBuf>,

    /// Debug-level logging for the workspace crates
    #[arg(short, long, env = "ARB_VERBOSE")]
    pub verbose: bool,
}

impl Args {
    /// Effective analysis configuration for this invocation.
    pub fn resolve(&self) -> ConfigResult<AnalysisConfig> {
        let base = match &self.config {
            Some(path) => AnalysisConfig::from_toml_file(path)?,
            None => AnalysisConfig::default(),
        };
        Ok(self.apply(base))
    }

    /// Overlay the flags that were given on `config`.
    pub fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(dir) = &self.input_dir {
            config.input_data_directory = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_directory = dir.clone();
        }
        if let Some(threshold) = self.min_correlation {
            config.min_correlation_threshold = threshold;
        }
        if let Some(pvalue) = self.max_pvalue {
            config.max_cointegration_pvalue = pvalue;
        }
        if let Some(n) = self.min_data_points {
            config.min_data_points = n;
        }
        if let Some(n) = self.threads {
            config.num_threads = n;
        }
        if let Some(n) = self.max_pairs {
            config.max_pairs_to_analyze = n;
        }
        if self.no_simd {
            config.enable_simd = false;
        }
        if self.no_cache {
            config.enable_caching = false;
        }
        if let Some(path) = &self.cache_file {
            config.cache_file = Some(path.clone());
        }
        if self.json {
            config.export_json = true;
        }
        config
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub fn log_directives(&self) -> &'static str {
        if self.verbose {
            "info,stat_arb=debug,arbitrage=debug,quant=debug,storage=debug,parallel=debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "stat-arb",
            "--input-dir",
            "prices",
            "--min-correlation",
            "0.8",
            "--threads",
            "2",
            "--no-simd",
            "--json",
        ]);
        let config = args.resolve().unwrap();
        assert_eq!(config.input_data_directory, PathBuf::from("prices"));
        assert_eq!(config.min_correlation_threshold, 0.8);
        assert_eq!(config.num_threads, 2);
        assert!(!config.enable_simd);
        assert!(config.export_json);
        assert_eq!(
            config.max_cointegration_pvalue,
            AnalysisConfig::default().max_cointegration_pvalue
        );
    }

    #[test]
    fn test_flags_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arb.toml");
        std::fs::write(&path, "min_data_points = 120\nmax_pairs_to_analyze = 50\n").unwrap();

        let args = Args {
            config: Some(path),
            max_pairs: Some(10),
            ..Args::default()
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.min_data_points, 120);
        assert_eq!(config.max_pairs_to_analyze, 10);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = Args {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Args::default()
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_verbose_raises_crate_levels() {
        let quiet = Args::default();
        assert_eq!(quiet.log_directives(), "info");
        let loud = Args {
            verbose: true,
            ..Args::default()
        };
        assert!(loud.log_directives().contains("arbitrage=debug"));
    }
}
