//! Literal-input scenarios for kernels, RSI and the ADF/cointegration path.

use quant::pairs::{PairAnalyzer, PairSettings, adf_test, half_life};
use quant::{FeaturePipeline, Kernels};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use types::OhlcvSeries;

fn gaussian(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Normal::new(0.0_f64, 1.0).unwrap();
    (0..n).map(|_| rng.sample(dist)).collect()
}

fn cumulative(steps: &[f64]) -> Vec<f64> {
    steps
        .iter()
        .scan(0.0_f64, |acc, s| {
            *acc += s;
            Some(*acc)
        })
        .collect()
}

fn ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
    let noise = gaussian(n, seed);
    let mut out = Vec::with_capacity(n);
    let mut prev = 0.0;
    for e in noise {
        prev = phi * prev + e;
        out.push(prev);
    }
    out
}

#[test]
fn regression_on_a_line() {
    for kernels in [Kernels::select(true), Kernels::scalar()] {
        let (alpha, beta) = kernels
            .linear_regression(&[1.0, 3.0, 5.0, 7.0, 9.0], &[0.0, 1.0, 2.0, 3.0, 4.0])
            .unwrap();
        assert!((alpha - 1.0).abs() < 1e-12);
        assert!((beta - 2.0).abs() < 1e-12);
    }
}

#[test]
fn correlation_of_identical_series() {
    let a = [1.0, 2.0, 3.0, 4.0, 5.0];
    let wide = Kernels::select(true).correlation(&a, &a).unwrap();
    let scalar = Kernels::scalar().correlation(&a, &a).unwrap();
    assert!((wide - 1.0).abs() < 1e-12);
    assert!((wide - scalar).abs() < 1e-12);
}

#[test]
fn rolling_sum_window_of_three() {
    let out = Kernels::select(true).rolling_sum(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
    assert_eq!(out, vec![6.0, 9.0, 12.0, 15.0]);
}

#[test]
fn rsi_of_flat_prices_is_100() {
    let series = OhlcvSeries::from_closes("FLAT", &[10.0; 15]);
    let features = FeaturePipeline::default()
        .with_selection(["rsi"])
        .compute(&series, &Kernels::scalar())
        .unwrap();
    let rsi = features.get("rsi").unwrap();
    assert_eq!(rsi.len(), 1);
    assert_eq!(rsi[0], 100.0);
}

#[test]
fn random_walks_do_not_reject_unit_root() {
    let kernels = Kernels::select(true);
    // A single walk rejects at 10% one time in ten; count over seeds.
    let accepted = (0..20u64)
        .filter(|&seed| {
            let walk = cumulative(&gaussian(1000, seed));
            let out = adf_test(&kernels, &walk, 10).unwrap();
            out.statistic > -2.57 && !out.rejects_unit_root(0.05)
        })
        .count();
    assert!(accepted >= 15, "only {accepted}/20 walks kept the unit root");
}

#[test]
fn mean_reverting_spread_is_cointegrated() {
    let kernels = Kernels::select(true);
    let spread = ar1(0.5, 1000, 42);

    let out = adf_test(&kernels, &spread, 10).unwrap();
    assert!(out.statistic < -3.43, "{}", out.statistic);
    assert!(out.rejects_unit_root(0.05));
    let hl = half_life(&kernels, &spread).unwrap();
    assert!((hl - 1.0).abs() < 0.2, "{hl}");

    // Same spread inside a price pair: P2 = 10 + 1.5 P1 + spread.
    let p1: Vec<f64> = cumulative(&gaussian(1000, 43)).iter().map(|v| 200.0 + v).collect();
    let p2: Vec<f64> = p1.iter().zip(&spread).map(|(p, s)| 10.0 + 1.5 * p + s).collect();
    let analyzer = PairAnalyzer::new(&kernels, PairSettings::default());
    let pair = analyzer.analyze("AAA", &p1, "BBB", &p2).unwrap();
    let coint = &pair.cointegration;
    assert!((coint.hedge_ratio - 1.5).abs() < 0.05, "{}", coint.hedge_ratio);
    assert!(coint.adf_statistic < -3.43);
    assert!(coint.is_cointegrated);
    assert_eq!(coint.p_value, 0.01);
    assert!(coint.half_life > 0.5 && coint.half_life < 1.5, "{}", coint.half_life);
    assert!(coint.historical_trades > 0);
}

#[test]
fn short_pairs_are_untested_not_errors() {
    let kernels = Kernels::scalar();
    let p1: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let p2: Vec<f64> = p1.iter().map(|p| p * 2.0).collect();
    let pair = PairAnalyzer::new(&kernels, PairSettings::default())
        .analyze("AAA", &p1, "BBB", &p2)
        .unwrap();
    assert_eq!(pair.cointegration.p_value, 1.0);
    assert!(!pair.cointegration.is_cointegrated);
    assert_eq!(pair.cointegration.historical_trades, 0);
    assert_eq!(pair.cointegration.expected_return, 0.0);
}
