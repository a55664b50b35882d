//! Parallel pair enumeration and analysis.
//!
//! # Flow
//!
//! ```text
//! symbols ──► filter_universe ──► enumerate_pairs ──► cap (max_pairs)
//!                                                        │
//!                  partition into W contiguous ranges ◄──┘
//!                                │
//!         ┌──────────────┬───────┴──────┬──────────────┐
//!      worker 0       worker 1       ...          worker W-1
//!   (cache ─► analyze ─► cache, one pair at a time)
//!         └──────────────┴───────┬──────┴──────────────┘
//!                                ▼
//!            enrich (sectors, prices) ─► filter ─► sort
//! ```
//!
//! A pair that fails or yields non-finite statistics is logged with its key
//! and dropped; it never aborts the run. A cached result is reused only while
//! it still matches the pair's closes (see [`is_fresh`]).

use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use parallel::PoolError;
use quant::pairs::cointegration::MIN_COINTEGRATION_BARS;
use quant::{Kernels, PairAnalysis, PairAnalyzer, PairSettings};
use tracing::{debug, info, warn};
use types::{
    AnalysisConfig, CointegrationResult, CorrelationResult, FeatureSet, OhlcvSeries, PairKey,
};

use crate::cache::ResultCache;
use crate::progress::ProgressReporter;

// =============================================================================
// Universe
// =============================================================================

/// Borrowed view of one symbol as the scheduler needs it.
#[derive(Debug, Clone, Copy)]
pub struct SymbolEntry<'a> {
    pub symbol: &'a str,
    pub closes: &'a [f64],
    pub sector: &'a str,
    pub last_price: f64,
    /// Bars behind the symbol's feature set.
    pub bars: usize,
}

impl<'a> SymbolEntry<'a> {
    pub fn new(series: &'a OhlcvSeries, features: &'a FeatureSet) -> Self {
        Self {
            symbol: &series.symbol,
            closes: &series.close,
            sector: &features.summary.sector,
            last_price: series.last_close().unwrap_or(f64::NAN),
            bars: features.summary.bar_count,
        }
    }
}

/// Apply the stock-level filters: exclusions, sectors, price range and
/// minimum history.
pub fn filter_universe<'a>(config: &AnalysisConfig, entries: &[SymbolEntry<'a>]) -> Vec<SymbolEntry<'a>> {
    let constraints = &config.portfolio_constraints;
    let excluded: HashSet<&str> = config.excluded_symbols.iter().map(String::as_str).collect();

    let kept: Vec<SymbolEntry<'a>> = entries
        .iter()
        .filter(|e| !excluded.contains(e.symbol))
        .filter(|e| !constraints.excluded_sectors.iter().any(|s| s == e.sector))
        .filter(|e| config.focus_sectors.is_empty() || config.focus_sectors.iter().any(|s| s == e.sector))
        .filter(|e| constraints.price_in_range(e.last_price))
        .filter(|e| e.bars >= config.min_data_points)
        .copied()
        .collect();

    debug!(
        before = entries.len(),
        after = kept.len(),
        "applied stock filters"
    );
    kept
}

/// Index pairs `(i, j)`, `i < j`, that pass the pair-level rules, in
/// enumeration order and capped at `max_pairs_to_analyze` when set.
pub fn enumerate_pairs(config: &AnalysisConfig, entries: &[SymbolEntry<'_>]) -> Vec<(usize, usize)> {
    let same_sector = config.same_sector_required();
    let cap = match config.max_pairs_to_analyze {
        0 => usize::MAX,
        n => n,
    };

    let mut pairs = Vec::new();
    'outer: for (i, a) in entries.iter().enumerate() {
        for (j, b) in entries.iter().enumerate().skip(i + 1) {
            if pairs.len() >= cap {
                break 'outer;
            }
            if a.bars != b.bars || a.closes.len() != b.closes.len() {
                continue;
            }
            if a.bars < config.min_data_points {
                continue;
            }
            if same_sector && a.sector != b.sector {
                continue;
            }
            pairs.push((i, j));
        }
    }
    pairs
}

// =============================================================================
// Scheduler
// =============================================================================

/// Filtered, sorted output of one scheduling pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleOutcome {
    /// Cointegrated pairs, ascending p-value.
    pub cointegration: Vec<CointegrationResult>,
    /// Pairs above the correlation threshold, descending rank.
    pub correlation: Vec<CorrelationResult>,
    pub pairs_analyzed: usize,
    pub failed_pairs: usize,
    pub cache_hits: usize,
}

/// Runs the pair analyzer over every eligible pair on a worker pool.
pub struct PairScheduler<'a> {
    config: &'a AnalysisConfig,
    kernels: &'a Kernels,
    cache: Option<&'a ResultCache>,
    progress: Option<&'a ProgressReporter>,
}

impl<'a> PairScheduler<'a> {
    pub fn new(config: &'a AnalysisConfig, kernels: &'a Kernels) -> Self {
        Self {
            config,
            kernels,
            cache: None,
            progress: None,
        }
    }

    pub fn with_cache(mut self, cache: &'a ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_progress(mut self, progress: &'a ProgressReporter) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Analyse every eligible pair among `entries` (already filtered).
    pub fn run(&self, entries: &[SymbolEntry<'_>]) -> Result<ScheduleOutcome, PoolError> {
        let pairs = enumerate_pairs(self.config, entries);
        let threads = parallel::resolve_threads(self.config.num_threads);
        let ranges = parallel::partition(pairs.len(), threads);
        let analyzer = PairAnalyzer::new(self.kernels, PairSettings::from_config(self.config));

        if let Some(progress) = self.progress {
            progress.start_pairs(pairs.len());
        }
        info!(
            symbols = entries.len(),
            pairs = pairs.len(),
            workers = ranges.len(),
            "analysing pairs"
        );

        let failed = AtomicUsize::new(0);
        let cache_hits = AtomicUsize::new(0);
        let analyses: Vec<PairAnalysis> = parallel::with_pool(threads, || {
            parallel::flat_map_ranges(
                &ranges,
                |_, range| {
                    range
                        .filter_map(|idx| {
                            let (i, j) = pairs[idx];
                            let out = self.analyze_pair(&analyzer, &entries[i], &entries[j], &failed, &cache_hits);
                            if let Some(progress) = self.progress {
                                progress.pair_done();
                            }
                            out
                        })
                        .collect()
                },
                threads == 1,
            )
        })?;

        let mut outcome = self.aggregate(entries, analyses);
        outcome.pairs_analyzed = pairs.len();
        outcome.failed_pairs = failed.into_inner();
        outcome.cache_hits = cache_hits.into_inner();
        Ok(outcome)
    }

    fn analyze_pair(
        &self,
        analyzer: &PairAnalyzer<'_>,
        a: &SymbolEntry<'_>,
        b: &SymbolEntry<'_>,
        failed: &AtomicUsize,
        cache_hits: &AtomicUsize,
    ) -> Option<PairAnalysis> {
        let key = PairKey::new(a.symbol, b.symbol);
        let cached = self.cache.and_then(|c| {
            c.pair_where(&key, |hit| {
                let fresh = is_fresh(hit, a, b);
                if !fresh {
                    debug!(pair = %key, "cached result predates current data, recomputing");
                }
                fresh
            })
        });
        if let Some(hit) = cached {
            cache_hits.fetch_add(1, Ordering::Relaxed);
            return Some(hit);
        }

        match analyzer.analyze(a.symbol, a.closes, b.symbol, b.closes) {
            Ok(analysis) if analysis.is_finite() => {
                if let Some(cache) = self.cache {
                    cache.insert_pair(&analysis);
                }
                Some(analysis)
            }
            Ok(_) => {
                warn!(pair = %key, "non-finite pair statistics, dropping pair");
                failed.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                warn!(pair = %key, error = %e, "pair analysis failed, dropping pair");
                failed.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Fill pair context, apply the result filters and sort.
    fn aggregate(&self, entries: &[SymbolEntry<'_>], analyses: Vec<PairAnalysis>) -> ScheduleOutcome {
        let by_symbol: HashMap<&str, &SymbolEntry<'_>> = entries.iter().map(|e| (e.symbol, e)).collect();
        let constraints = &self.config.portfolio_constraints;

        let mut cointegration = Vec::new();
        let mut correlation = Vec::new();
        for PairAnalysis {
            correlation: mut corr,
            cointegration: coint,
        } in analyses
        {
            if let (Some(e1), Some(e2)) = (
                by_symbol.get(corr.stock1.as_str()),
                by_symbol.get(corr.stock2.as_str()),
            ) {
                corr.sector1 = e1.sector.to_string();
                corr.sector2 = e2.sector.to_string();
                corr.same_sector = e1.sector == e2.sector;
                corr.price1 = e1.last_price;
                corr.price2 = e2.last_price;
                corr.affordable = constraints.price_in_range(e1.last_price)
                    && constraints.price_in_range(e2.last_price)
                    && e1.last_price + e2.last_price <= constraints.max_capital;
            }

            if keep_cointegration(self.config, &coint) {
                cointegration.push(coint);
            }
            if corr.pearson.abs() >= self.config.min_correlation_threshold {
                correlation.push(corr);
            }
        }

        sort_cointegration(&mut cointegration);
        sort_correlation(&mut correlation);
        ScheduleOutcome {
            cointegration,
            correlation,
            ..ScheduleOutcome::default()
        }
    }
}

/// Relative disagreement allowed between a cached and a recomputed last spread.
const SPREAD_TOLERANCE: f64 = 1e-9;

/// True when `cached` was computed from closes like `a`'s and `b`'s: same
/// bar count and, once a hedge ratio exists, the same spread at the last bar.
pub fn is_fresh(cached: &PairAnalysis, a: &SymbolEntry<'_>, b: &SymbolEntry<'_>) -> bool {
    let coint = &cached.cointegration;
    let (p1, p2) = if coint.stock1 == a.symbol {
        (a.closes, b.closes)
    } else {
        (b.closes, a.closes)
    };
    if coint.sample_size != p1.len() || p1.len() != p2.len() {
        return false;
    }
    if p1.len() < MIN_COINTEGRATION_BARS {
        return true;
    }
    let (Some(&x), Some(&y)) = (p1.last(), p2.last()) else {
        return false;
    };
    let spread = y - coint.hedge_ratio * x;
    (spread - coint.current_spread).abs() <= SPREAD_TOLERANCE * y.abs().max(1.0)
}

// =============================================================================
// Filters and Ordering
// =============================================================================

/// Cointegrated, mean reverting within `max_half_life`, and significant at
/// `max_cointegration_pvalue`.
pub fn keep_cointegration(config: &AnalysisConfig, r: &CointegrationResult) -> bool {
    r.is_cointegrated
        && r.half_life > 0.0
        && r.half_life < config.max_half_life
        && r.p_value <= config.max_cointegration_pvalue
}

fn by_symbols(a1: &str, a2: &str, b1: &str, b2: &str) -> CmpOrdering {
    (a1, a2).cmp(&(b1, b2))
}

/// Ascending p-value, ties by pair key.
pub fn sort_cointegration(results: &mut [CointegrationResult]) {
    results.sort_by(|a, b| {
        a.p_value
            .total_cmp(&b.p_value)
            .then_with(|| by_symbols(&a.stock1, &a.stock2, &b.stock1, &b.stock2))
    });
}

/// Descending rank (|pearson| x stability), ties by pair key.
pub fn sort_correlation(results: &mut [CorrelationResult]) {
    results.sort_by(|a, b| {
        b.rank()
            .total_cmp(&a.rank())
            .then_with(|| by_symbols(&a.stock1, &a.stock2, &b.stock1, &b.stock2))
    });
}
