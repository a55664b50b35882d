//! Run-level metrics of an analysis.

use std::fmt;

use serde::Serialize;

use crate::cache::CacheStats;

/// Counts, timings and throughput of the last analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisMetrics {
    /// Symbols read from the input directory (or passed in).
    pub stocks_loaded: usize,
    /// Symbols left after the stock-level filters.
    pub stocks_filtered: usize,
    pub loading_time_seconds: f64,
    pub feature_time_seconds: f64,

    pub total_pairs_analyzed: usize,
    /// Pairs whose analysis failed or produced non-finite statistics.
    pub failed_pairs: usize,
    pub cointegrated_pairs_found: usize,
    pub high_correlation_pairs_found: usize,
    pub arbitrage_opportunities_found: usize,
    pub analysis_time_seconds: f64,
    pub pairs_per_second: f64,
    pub gflops_achieved: f64,
    /// Kernel variant name ("AVX2", "NEON" or "Scalar").
    pub simd_type_used: String,

    pub export_time_seconds: f64,
    pub export_successful: bool,
    pub total_time_seconds: f64,
    /// RFC 3339 time the run finished.
    pub analysis_timestamp: String,

    pub cache: CacheStats,
}

impl fmt::Display for AnalysisMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis summary ({})", self.analysis_timestamp)?;
        writeln!(
            f,
            "  stocks:        {} loaded, {} after filters ({:.2}s load, {:.2}s features)",
            self.stocks_loaded,
            self.stocks_filtered,
            self.loading_time_seconds,
            self.feature_time_seconds
        )?;
        writeln!(
            f,
            "  pairs:         {} analyzed, {} failed in {:.2}s ({:.0} pairs/s)",
            self.total_pairs_analyzed,
            self.failed_pairs,
            self.analysis_time_seconds,
            self.pairs_per_second
        )?;
        writeln!(
            f,
            "  kernels:       {} at {:.3} GFLOPS",
            self.simd_type_used, self.gflops_achieved
        )?;
        writeln!(
            f,
            "  results:       {} cointegrated, {} correlated, {} opportunities",
            self.cointegrated_pairs_found,
            self.high_correlation_pairs_found,
            self.arbitrage_opportunities_found
        )?;
        writeln!(
            f,
            "  cache:         {:.1}% hit rate, {} + {} entries ({:.2} MB)",
            self.cache.hit_rate * 100.0,
            self.cache.correlation_entries,
            self.cache.cointegration_entries,
            self.cache.memory_mb
        )?;
        write!(
            f,
            "  export:        {} in {:.2}s, total {:.2}s",
            if self.export_successful { "ok" } else { "skipped" },
            self.export_time_seconds,
            self.total_time_seconds
        )
    }
}
