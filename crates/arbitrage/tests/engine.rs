//! End-to-end runs over synthetic markets.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arbitrage::{AnalysisEngine, ProgressCallback, Stage};
use chrono::{Days, NaiveDate};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use storage::schema::files;
use types::{AnalysisConfig, OhlcvSeries, PairKey};

const BARS: usize = 300;

/// AAA random walk; BBB = 10 + 1.5 AAA + AR(0.5) spread; CCC and DDD
/// independent walks.
fn market(seed: u64) -> Vec<(&'static str, Vec<f64>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let step = Normal::new(0.0_f64, 0.5).unwrap();

    let walk = |rng: &mut StdRng, start: f64| -> Vec<f64> {
        let mut p = start;
        (0..BARS)
            .map(|_| {
                p += step.sample(rng);
                p
            })
            .collect()
    };

    let aaa = walk(&mut rng, 100.0);
    let mut spread = 0.0;
    let bbb: Vec<f64> = aaa
        .iter()
        .map(|p| {
            spread = 0.5 * spread + step.sample(&mut rng);
            10.0 + 1.5 * p + spread
        })
        .collect();
    let ccc = walk(&mut rng, 60.0);
    let ddd = walk(&mut rng, 250.0);
    vec![("AAA", aaa), ("BBB", bbb), ("CCC", ccc), ("DDD", ddd)]
}

fn write_market(dir: &Path, market: &[(&str, Vec<f64>)]) {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    for (symbol, closes) in market {
        let mut text = String::from("datetime,open,high,low,close,volume\n");
        for (i, c) in closes.iter().enumerate() {
            let day = start + Days::new(i as u64);
            text.push_str(&format!("{},{c},{c},{c},{c},1000000\n", day.format("%Y-%m-%d")));
        }
        fs::write(dir.join(format!("{symbol}_features.csv")), text).unwrap();
    }
}

fn series(market: &[(&str, Vec<f64>)]) -> Vec<OhlcvSeries> {
    market
        .iter()
        .map(|(s, closes)| OhlcvSeries::from_closes(*s, closes))
        .collect()
}

fn config() -> AnalysisConfig {
    AnalysisConfig {
        min_correlation_threshold: 0.0,
        ..AnalysisConfig::default()
    }
}

#[test]
fn test_full_run_exports_and_caches() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_market(input.path(), &market(7));
    let cache_file = output.path().join("cache.json");

    let mut config = config()
        .with_input_dir(input.path())
        .with_output_dir(output.path().join("results"))
        .with_num_threads(2);
    config.cache_file = Some(cache_file.clone());
    config.export_json = true;

    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);
    let callback: ProgressCallback = Arc::new(move |stage, _| sink.lock().push(stage));

    let mut engine = AnalysisEngine::new(config.clone()).unwrap().with_progress(callback);
    let report = engine.run().unwrap();

    assert_eq!(report.metrics.stocks_loaded, 4);
    assert_eq!(report.metrics.stocks_filtered, 4);
    assert_eq!(report.metrics.total_pairs_analyzed, 6);
    assert_eq!(report.metrics.failed_pairs, 0);
    assert!(report.metrics.export_successful);
    assert!(!report.metrics.analysis_timestamp.is_empty());

    let key = PairKey::new("AAA", "BBB");
    let coint = report
        .cointegration
        .iter()
        .find(|r| r.key() == key)
        .expect("AAA/BBB should be cointegrated");
    assert!((coint.hedge_ratio - 1.5).abs() < 0.1);
    assert!(coint.half_life > 0.0 && coint.half_life < 5.0);

    let opp = report
        .opportunities
        .iter()
        .find(|o| o.key() == key)
        .expect("AAA/BBB should be an opportunity");
    let corr = report.correlation.iter().find(|r| r.key() == key).unwrap();
    assert!((opp.cash_required - (corr.price1 + coint.hedge_ratio.abs() * corr.price2)).abs() < 1e-9);
    assert_eq!(corr.sector1, "Unknown");
    assert!(corr.same_sector);

    let results = output.path().join("results");
    for name in [files::COINTEGRATION, files::CORRELATION, files::OPPORTUNITIES] {
        assert!(results.join(name).exists(), "{name} missing");
    }
    assert!(results.join(format!("{}.json", config.output_filename)).exists());
    assert!(cache_file.exists());

    let stages = stages.lock();
    assert_eq!(stages.first(), Some(&Stage::LoadingData));
    assert_eq!(stages.last(), Some(&Stage::Complete));
    assert!(stages.windows(2).all(|w| w[0] <= w[1]));

    // A fresh engine restores the cache and serves every pair from it.
    let mut again = AnalysisEngine::new(config).unwrap();
    let second = again.run().unwrap();
    assert_eq!(second.metrics.cache.correlation_hits, 6);
    assert_eq!(second.cointegration, report.cointegration);
    assert_eq!(second.correlation, report.correlation);
}

#[test]
fn test_cache_is_not_reused_after_settings_or_data_change() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut data = market(7);
    write_market(input.path(), &data);

    let mut config = config()
        .with_input_dir(input.path())
        .with_output_dir(output.path().join("results"))
        .with_num_threads(1);
    config.cache_file = Some(output.path().join("cache.json"));
    let key = PairKey::new("AAA", "BBB");

    AnalysisEngine::new(config.clone()).unwrap().run().unwrap();

    // New entry threshold: the saved snapshot is discarded.
    config.entry_z = 2.5;
    let mut engine = AnalysisEngine::new(config.clone()).unwrap();
    assert!(engine.cache().is_empty());
    let report = engine.run().unwrap();
    assert_eq!(report.metrics.cache.correlation_hits, 0);
    let coint = engine.cache().cointegration(&key).unwrap();
    assert_eq!(coint.entry_threshold, 2.5);
    assert_eq!(coint.sample_size, BARS);

    // Five more bars per symbol: every pair is recomputed.
    for (_, closes) in &mut data {
        let last = closes[closes.len() - 1];
        closes.extend((1..=5).map(|i| last + 0.1 * i as f64));
    }
    write_market(input.path(), &data);
    let mut engine = AnalysisEngine::new(config).unwrap();
    assert_eq!(engine.cache().len(), (6, 6));
    let report = engine.run().unwrap();
    assert_eq!(report.metrics.cache.correlation_hits, 0);
    assert_eq!(report.metrics.total_pairs_analyzed, 6);
    assert_eq!(engine.cache().cointegration(&key).unwrap().sample_size, BARS + 5);
}

#[test]
fn test_single_thread_runs_are_identical() {
    let data = series(&market(21));
    let config = config().with_num_threads(1).with_caching(false);

    let mut engine = AnalysisEngine::new(config.clone()).unwrap();
    let first = engine.analyze(&data).unwrap();
    let second = engine.analyze(&data).unwrap();
    assert_eq!(first.cointegration, second.cointegration);
    assert_eq!(first.correlation, second.correlation);
    assert_eq!(first.opportunities, second.opportunities);

    let mut wide = AnalysisEngine::new(config.with_num_threads(4)).unwrap();
    let parallel = wide.analyze(&data).unwrap();
    assert_eq!(parallel.cointegration, first.cointegration);
    assert_eq!(parallel.correlation, first.correlation);
}

#[test]
fn test_filters_shrink_the_universe() {
    let data = series(&market(3));
    let mut config = config().with_num_threads(1).with_max_pairs(2);
    config.excluded_symbols = vec!["DDD".into()];

    let mut engine = AnalysisEngine::new(config).unwrap();
    let report = engine.analyze(&data).unwrap();
    assert_eq!(report.metrics.stocks_filtered, 3);
    assert_eq!(report.metrics.total_pairs_analyzed, 2);
    assert!(report.correlation.iter().all(|r| r.stock1 != "DDD" && r.stock2 != "DDD"));
}

#[test]
fn test_short_histories_are_filtered_out() {
    let data = vec![
        OhlcvSeries::from_closes("AAA", &[50.0; 40]),
        OhlcvSeries::from_closes("BBB", &[60.0; 40]),
    ];
    let mut engine = AnalysisEngine::new(config()).unwrap();
    let report = engine.analyze(&data).unwrap();
    assert_eq!(report.metrics.stocks_filtered, 0);
    assert_eq!(report.metrics.total_pairs_analyzed, 0);
    assert!(report.cointegration.is_empty());
}
