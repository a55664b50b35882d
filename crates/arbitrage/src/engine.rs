//! The analysis engine: one value owning kernels, pipeline, cache and
//! progress reporting for a configured run.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quant::{FeaturePipeline, Kernels, PairSettings};
use serde::Serialize;
use storage::{ExportOptions, ExportSummary, ResultsDocument};
use tracing::{info, warn};
use types::{
    AnalysisConfig, ArbitrageOpportunity, CointegrationResult, CorrelationResult, FeatureSet,
    OhlcvSeries, SymbolSummary,
};

use crate::cache::{CacheSettings, ResultCache};
use crate::error::{EngineError, EngineResult};
use crate::metrics::AnalysisMetrics;
use crate::opportunity::{AssemblyParams, assemble_opportunities};
use crate::progress::{ProgressCallback, ProgressReporter, Stage};
use crate::scheduler::{PairScheduler, SymbolEntry, filter_universe};

/// Everything one run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub cointegration: Vec<CointegrationResult>,
    pub correlation: Vec<CorrelationResult>,
    pub opportunities: Vec<ArbitrageOpportunity>,
    pub metrics: AnalysisMetrics,
    #[serde(skip)]
    pub export: Option<ExportSummary>,
}

/// Runs feature computation, pair analysis and opportunity assembly under
/// one [`AnalysisConfig`].
///
/// # Example
///
/// ```ignore
/// let mut engine = AnalysisEngine::new(AnalysisConfig::quick().with_input_dir("data"))?;
/// let report = engine.run()?;
/// println!("{}", report.metrics);
/// ```
#[derive(Debug)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
    kernels: Kernels,
    pipeline: FeaturePipeline,
    cache: ResultCache,
    progress: ProgressReporter,
    metrics: AnalysisMetrics,
}

impl AnalysisEngine {
    /// Validate `config`, select kernels and restore the cache file if one
    /// is configured.
    pub fn new(config: AnalysisConfig) -> EngineResult<Self> {
        config.validate()?;
        let kernels = Kernels::select(config.enable_simd);
        info!(simd = %kernels.variant(), threads = parallel::resolve_threads(config.num_threads), "engine ready");

        let progress = Self::reporter(&config, None);
        let cache = ResultCache::with_settings(CacheSettings::from(&PairSettings::from_config(&config)));
        let engine = Self {
            config,
            kernels,
            pipeline: FeaturePipeline::default(),
            cache,
            progress,
            metrics: AnalysisMetrics::default(),
        };
        if let Some(path) = engine.config.cache_file.as_ref().filter(|_| engine.config.enable_caching) {
            engine.cache.load_from_file(path)?;
        }
        Ok(engine)
    }

    fn reporter(config: &AnalysisConfig, callback: Option<ProgressCallback>) -> ProgressReporter {
        ProgressReporter::new(
            callback,
            config.progress_every_pairs,
            Duration::from_millis(config.progress_interval_ms),
        )
    }

    /// Route progress updates to `callback`.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Self::reporter(&self.config, Some(callback));
        self
    }

    /// Replace the feature pipeline (e.g. a narrower selection).
    pub fn with_pipeline(mut self, pipeline: FeaturePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn kernels(&self) -> &Kernels {
        &self.kernels
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Metrics of the last completed run.
    pub fn last_metrics(&self) -> &AnalysisMetrics {
        &self.metrics
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stages
    // ─────────────────────────────────────────────────────────────────────────

    /// Feature sets for `series`, index-aligned; `None` where a symbol failed.
    pub fn compute_features(&self, series: &[OhlcvSeries]) -> EngineResult<Vec<Option<FeatureSet>>> {
        let threads = self.config.num_threads;
        let results = parallel::with_pool(threads, || {
            parallel::map_slice(
                series,
                |s| self.pipeline.compute(s, &self.kernels),
                parallel::resolve_threads(threads) == 1,
            )
        })?;

        Ok(series
            .iter()
            .zip(results)
            .map(|(s, result)| match result {
                Ok(mut features) => {
                    features.summary.sector = self.config.sector_of(&s.symbol).to_string();
                    Some(features)
                }
                Err(e) => {
                    warn!(symbol = %s.symbol, error = %e, "skipping symbol, features failed");
                    None
                }
            })
            .collect())
    }

    /// Analyse already-loaded series: features, pairs, opportunities.
    pub fn analyze(&mut self, series: &[OhlcvSeries]) -> EngineResult<AnalysisReport> {
        let mut metrics = AnalysisMetrics {
            stocks_loaded: series.len(),
            simd_type_used: self.kernels.variant().name().to_string(),
            ..AnalysisMetrics::default()
        };

        self.progress.report(Stage::ComputingFeatures, 0.0);
        let started = Instant::now();
        let features = self.compute_features(series)?;
        metrics.feature_time_seconds = started.elapsed().as_secs_f64();
        self.progress.report(Stage::ComputingFeatures, 100.0);

        let entries: Vec<SymbolEntry<'_>> = series
            .iter()
            .zip(&features)
            .filter_map(|(s, f)| f.as_ref().map(|f| SymbolEntry::new(s, f)))
            .collect();
        let universe = filter_universe(&self.config, &entries);
        metrics.stocks_filtered = universe.len();

        self.progress.report(Stage::AnalyzingPairs, 0.0);
        self.kernels.reset_stats();
        let started = Instant::now();
        let mut scheduler = PairScheduler::new(&self.config, &self.kernels).with_progress(&self.progress);
        if self.config.enable_caching {
            scheduler = scheduler.with_cache(&self.cache);
        }
        let outcome = scheduler.run(&universe)?;
        metrics.analysis_time_seconds = started.elapsed().as_secs_f64();
        metrics.gflops_achieved = self.kernels.stats().gflops(metrics.analysis_time_seconds);
        metrics.total_pairs_analyzed = outcome.pairs_analyzed;
        metrics.failed_pairs = outcome.failed_pairs;
        metrics.pairs_per_second = if metrics.analysis_time_seconds > 0.0 {
            outcome.pairs_analyzed as f64 / metrics.analysis_time_seconds
        } else {
            0.0
        };
        self.progress.report(Stage::AnalyzingPairs, 100.0);

        self.progress.report(Stage::GeneratingOpportunities, 0.0);
        let summaries: HashMap<String, SymbolSummary> = features
            .iter()
            .flatten()
            .map(|f| (f.symbol.clone(), f.summary.clone()))
            .collect();
        let params = AssemblyParams {
            max_half_life: self.config.max_half_life,
        };
        let opportunities =
            assemble_opportunities(&outcome.cointegration, &outcome.correlation, &summaries, params);
        self.progress.report(Stage::GeneratingOpportunities, 100.0);

        metrics.cointegrated_pairs_found = outcome.cointegration.len();
        metrics.high_correlation_pairs_found = outcome.correlation.len();
        metrics.arbitrage_opportunities_found = opportunities.len();
        metrics.cache = self.cache.stats();
        metrics.analysis_timestamp = chrono::Utc::now().to_rfc3339();

        info!(
            pairs = metrics.total_pairs_analyzed,
            failed = metrics.failed_pairs,
            cointegrated = metrics.cointegrated_pairs_found,
            correlated = metrics.high_correlation_pairs_found,
            opportunities = metrics.arbitrage_opportunities_found,
            "pair analysis finished"
        );
        self.metrics = metrics.clone();
        Ok(AnalysisReport {
            cointegration: outcome.cointegration,
            correlation: outcome.correlation,
            opportunities,
            metrics,
            export: None,
        })
    }

    /// Write the report to the output directory in the configured formats.
    pub fn export(&self, report: &AnalysisReport) -> EngineResult<ExportSummary> {
        let document = ResultsDocument {
            metrics: &report.metrics,
            cointegration: &report.cointegration,
            correlation: &report.correlation,
            opportunities: &report.opportunities,
        };
        let options = ExportOptions {
            csv: self.config.export_csv,
            json_stem: self
                .config
                .export_json
                .then_some(self.config.output_filename.as_str()),
        };
        Ok(storage::export_all(
            &self.config.output_directory,
            &document,
            options,
        )?)
    }

    /// Load, analyse, export and persist the cache.
    pub fn run(&mut self) -> EngineResult<AnalysisReport> {
        let started = Instant::now();

        self.progress.report(Stage::LoadingData, 0.0);
        let dir = self.config.input_data_directory.clone();
        let (series, loading) = storage::load_directory(&dir, self.config.num_threads)?;
        if series.is_empty() {
            return Err(EngineError::NoData(dir));
        }
        self.progress.report(Stage::LoadingData, 100.0);

        let mut report = self.analyze(&series)?;
        report.metrics.loading_time_seconds = loading.loading_time_seconds;

        if self.config.export_csv || self.config.export_json {
            self.progress.report(Stage::ExportingResults, 0.0);
            report.metrics.total_time_seconds = started.elapsed().as_secs_f64();
            let summary = self.export(&report)?;
            report.metrics.export_time_seconds = summary.seconds;
            report.metrics.export_successful = true;
            report.export = Some(summary);
            self.progress.report(Stage::ExportingResults, 100.0);
        }

        if let Some(path) = self.config.cache_file.as_ref().filter(|_| self.config.enable_caching) {
            self.cache.save_to_file(path)?;
        }

        report.metrics.total_time_seconds = started.elapsed().as_secs_f64();
        self.metrics = report.metrics.clone();
        self.progress.report(Stage::Complete, 100.0);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig {
            min_correlation_threshold: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            AnalysisEngine::new(config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_missing_input_dir_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default().with_input_dir(dir.path().join("missing"));
        let mut engine = AnalysisEngine::new(config).unwrap();
        assert!(matches!(engine.run(), Err(EngineError::Storage(_))));
    }

    #[test]
    fn test_empty_input_dir_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::default().with_input_dir(dir.path());
        let mut engine = AnalysisEngine::new(config).unwrap();
        assert!(matches!(engine.run(), Err(EngineError::NoData(_))));
    }

    #[test]
    fn test_scalar_selection_is_reported() {
        let mut engine = AnalysisEngine::new(AnalysisConfig::default().with_simd(false)).unwrap();
        let report = engine.analyze(&[]).unwrap();
        assert_eq!(report.metrics.simd_type_used, "Scalar");
        assert_eq!(report.metrics.total_pairs_analyzed, 0);
        assert!(report.opportunities.is_empty());
    }
}
