//! Return-correlation statistics of a price pair.

use types::{CorrelationResult, Grade};

use crate::error::QuantResult;
use crate::kernels::Kernels;
use crate::stats;

/// Short rolling-correlation window.
pub const ROLLING_SHORT: usize = 30;
/// Long rolling-correlation window.
pub const ROLLING_LONG: usize = 60;
/// Rolling |rho| below this counts as a breakdown.
pub const BREAKDOWN_THRESHOLD: f64 = 0.5;

/// Correlation statistics of the simple returns of `p1` and `p2`.
///
/// Symbols, sectors, prices and affordability are left at their defaults;
/// the caller owns that context.
pub fn correlation_stats(kernels: &Kernels, p1: &[f64], p2: &[f64]) -> QuantResult<CorrelationResult> {
    let r1 = stats::returns(p1);
    let r2 = stats::returns(p2);

    let pearson = kernels.correlation(&r1, &r2)?;
    let spearman = kernels.correlation(&stats::ranks(&r1), &stats::ranks(&r2))?;
    let kendall_tau = stats::kendall_tau(&r1, &r2);

    let rolling_30 = kernels.rolling_correlation(&r1, &r2, ROLLING_SHORT)?;
    let rolling_60 = kernels.rolling_correlation(&r1, &r2, ROLLING_LONG)?;

    // Too short for a 30-bar window: no stability evidence.
    let (stability, min_correlation, max_correlation) = if rolling_30.is_empty() {
        (0.0, pearson, pearson)
    } else {
        let (lo, hi) = rolling_30
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| (lo.min(r), hi.max(r)));
        (1.0 - stats::std_dev(&rolling_30).unwrap_or(0.0), lo, hi)
    };
    let breakdown_count = rolling_30
        .iter()
        .filter(|r| r.abs() < BREAKDOWN_THRESHOLD)
        .count();

    Ok(CorrelationResult {
        pearson,
        spearman,
        kendall_tau,
        rolling_30: stats::mean(&rolling_30).unwrap_or(pearson),
        rolling_60: stats::mean(&rolling_60).unwrap_or(pearson),
        stability,
        breakdown_count,
        min_correlation,
        max_correlation,
        grade: correlation_grade(pearson, stability),
        ..CorrelationResult::default()
    })
}

/// A: pearson >= 0.8 with stability >= 0.85; B: >= 0.7; C: >= 0.5; else D.
pub fn correlation_grade(pearson: f64, stability: f64) -> Grade {
    if pearson >= 0.8 && stability >= 0.85 {
        Grade::A
    } else if pearson >= 0.7 {
        Grade::B
    } else if pearson >= 0.5 {
        Grade::C
    } else {
        Grade::D
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(n: usize, step: impl Fn(usize) -> f64) -> Vec<f64> {
        let mut p = 100.0;
        (0..n)
            .map(|i| {
                p *= 1.0 + step(i);
                p
            })
            .collect()
    }

    #[test]
    fn test_identical_series() {
        let p = walk(120, |i| (i as f64 * 1.3).sin() * 0.01);
        let c = correlation_stats(&Kernels::scalar(), &p, &p).unwrap();
        assert!((c.pearson - 1.0).abs() < 1e-12);
        assert!((c.spearman - 1.0).abs() < 1e-12);
        assert!((c.kendall_tau - 1.0).abs() < 1e-12);
        assert!((c.stability - 1.0).abs() < 1e-9);
        assert_eq!(c.breakdown_count, 0);
        assert_eq!(c.grade, Grade::A);
    }

    #[test]
    fn test_anti_correlated_series() {
        let step = |i: usize| ((i * 7 % 11) as f64 - 5.0) * 0.002;
        let a = walk(120, step);
        let b = walk(120, |i| -step(i));
        let c = correlation_stats(&Kernels::select(true), &a, &b).unwrap();
        assert!(c.pearson < -0.99);
        assert_eq!(c.grade, Grade::D);
        assert!(c.min_correlation <= c.max_correlation);
    }

    #[test]
    fn test_short_series_has_no_stability() {
        let a = walk(20, |i| (i as f64).sin() * 0.01);
        let c = correlation_stats(&Kernels::scalar(), &a, &a).unwrap();
        assert_eq!(c.stability, 0.0);
        assert_eq!(c.rolling_30, c.pearson);
        // Perfect but unproven correlation caps at B.
        assert_eq!(c.grade, Grade::B);
    }

    #[test]
    fn test_grade_rule() {
        assert_eq!(correlation_grade(0.85, 0.9), Grade::A);
        assert_eq!(correlation_grade(0.85, 0.5), Grade::B);
        assert_eq!(correlation_grade(0.6, 1.0), Grade::C);
        assert_eq!(correlation_grade(0.2, 1.0), Grade::D);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(correlation_stats(&Kernels::scalar(), &[1.0, 2.0, 3.0], &[1.0, 2.0]).is_err());
    }
}
