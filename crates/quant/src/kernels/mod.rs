//! Numeric kernels with runtime SIMD dispatch.
//!
//! Every primitive exists as a scalar function; wide variants (AVX2 on
//! x86_64, NEON on aarch64) are selected once, when a [`Kernels`] value is
//! constructed, and stored as a table of plain function pointers. Composite
//! operations (variance, correlation, regression, rolling statistics) are
//! written once on top of that table, so every variant shares their edge
//! policies:
//!
//! - elementwise ops on unequal lengths fail with [`QuantError::LengthMismatch`]
//! - division by zero yields 0
//! - zero variance yields a correlation of 0 and a regression of `(0, 0)`
//! - windows longer than the input yield an empty sequence
//!
//! # Example
//!
//! ```
//! use quant::kernels::Kernels;
//!
//! let k = Kernels::select(true);
//! let (alpha, beta) = k.linear_regression(&[1.0, 3.0, 5.0], &[0.0, 1.0, 2.0]).unwrap();
//! assert!((alpha - 1.0).abs() < 1e-12 && (beta - 2.0).abs() < 1e-12);
//! ```

#[cfg(target_arch = "x86_64")]
mod avx2;
pub mod detect;
#[cfg(target_arch = "aarch64")]
mod neon;
mod scalar;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{QuantResult, ensure_same_len};
use crate::stats::negligible_dispersion;

pub use detect::{CpuFeatures, cpu_features};

/// Table of primitive implementations for one instruction set.
///
/// Inputs of unequal length are processed over their common prefix; the
/// public wrappers on [`Kernels`] check lengths first.
#[derive(Clone, Copy)]
pub(crate) struct Primitives {
    pub sub: fn(&[f64], &[f64], &mut [f64]),
    pub add: fn(&[f64], &[f64], &mut [f64]),
    pub mul: fn(&[f64], &[f64], &mut [f64]),
    pub div: fn(&[f64], &[f64], &mut [f64]),
    pub sum: fn(&[f64]) -> f64,
    pub dot: fn(&[f64], &[f64]) -> f64,
    /// Σ (a - mean)²
    pub sq_dev: fn(&[f64], f64) -> f64,
    /// Σ (a - mean_a)(b - mean_b)
    pub cross_dev: fn(&[f64], &[f64], f64, f64) -> f64,
}

/// Instruction set backing a [`Kernels`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelVariant {
    Avx2,
    Neon,
    Scalar,
}

impl KernelVariant {
    pub fn name(&self) -> &'static str {
        match self {
            KernelVariant::Avx2 => "AVX2",
            KernelVariant::Neon => "NEON",
            KernelVariant::Scalar => "Scalar",
        }
    }

    /// Doubles processed per wide register.
    pub fn lanes(&self) -> usize {
        match self {
            KernelVariant::Avx2 => 4,
            KernelVariant::Neon => 2,
            KernelVariant::Scalar => 1,
        }
    }
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operation count snapshot for throughput estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KernelStats {
    /// Estimated floating-point operations (4 per element touched).
    pub operations: u64,
}

impl KernelStats {
    /// Achieved GFLOPS over `elapsed_secs`; 0 when no time elapsed.
    pub fn gflops(&self, elapsed_secs: f64) -> f64 {
        if elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.operations as f64 / (elapsed_secs * 1e9)
    }
}

/// Dispatched numeric kernels.
///
/// Cheap to share by reference across worker threads; the only interior
/// state is a relaxed operation counter.
pub struct Kernels {
    variant: KernelVariant,
    prims: Primitives,
    ops: AtomicU64,
}

impl fmt::Debug for Kernels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernels")
            .field("variant", &self.variant)
            .field("ops", &self.ops.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Kernels {
    fn default() -> Self {
        Self::select(true)
    }
}

impl Kernels {
    /// Pick the widest variant the CPU supports, or scalar when
    /// `enable_simd` is false.
    pub fn select(enable_simd: bool) -> Self {
        if !enable_simd {
            return Self::scalar();
        }
        let features = cpu_features();

        #[cfg(target_arch = "x86_64")]
        if features.avx2_usable() {
            return Self::with_table(KernelVariant::Avx2, avx2::PRIMITIVES);
        }

        #[cfg(target_arch = "aarch64")]
        if features.has_neon {
            return Self::with_table(KernelVariant::Neon, neon::PRIMITIVES);
        }

        let _ = features;
        Self::scalar()
    }

    /// Portable scalar kernels, always available.
    pub fn scalar() -> Self {
        Self::with_table(KernelVariant::Scalar, scalar::PRIMITIVES)
    }

    fn with_table(variant: KernelVariant, prims: Primitives) -> Self {
        Self {
            variant,
            prims,
            ops: AtomicU64::new(0),
        }
    }

    /// Instruction set in use.
    pub fn variant(&self) -> KernelVariant {
        self.variant
    }

    /// Operations counted since construction or the last reset.
    pub fn stats(&self) -> KernelStats {
        KernelStats {
            operations: self.ops.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.ops.store(0, Ordering::Relaxed);
    }

    #[inline]
    fn count(&self, elements: usize) {
        self.ops.fetch_add(4 * elements as u64, Ordering::Relaxed);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Elementwise
    // ─────────────────────────────────────────────────────────────────────────

    fn binary(
        &self,
        a: &[f64],
        b: &[f64],
        op: fn(&[f64], &[f64], &mut [f64]),
    ) -> QuantResult<Vec<f64>> {
        ensure_same_len(a, b)?;
        let mut out = vec![0.0; a.len()];
        op(a, b, &mut out);
        self.count(a.len());
        Ok(out)
    }

    pub fn sub(&self, a: &[f64], b: &[f64]) -> QuantResult<Vec<f64>> {
        self.binary(a, b, self.prims.sub)
    }

    pub fn add(&self, a: &[f64], b: &[f64]) -> QuantResult<Vec<f64>> {
        self.binary(a, b, self.prims.add)
    }

    pub fn mul(&self, a: &[f64], b: &[f64]) -> QuantResult<Vec<f64>> {
        self.binary(a, b, self.prims.mul)
    }

    /// Elementwise `a / b`, 0 where the divisor is 0.
    pub fn div(&self, a: &[f64], b: &[f64]) -> QuantResult<Vec<f64>> {
        self.binary(a, b, self.prims.div)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reductions
    // ─────────────────────────────────────────────────────────────────────────

    /// Sum of `a[offset..offset + count]`, clipped to the slice; 0 when empty.
    pub fn sum(&self, a: &[f64], offset: usize, count: usize) -> f64 {
        let start = offset.min(a.len());
        let end = offset.saturating_add(count).min(a.len());
        let range = &a[start..end];
        self.count(range.len());
        (self.prims.sum)(range)
    }

    /// Multiply-accumulate over two equally long slices.
    pub fn dot(&self, a: &[f64], b: &[f64]) -> QuantResult<f64> {
        ensure_same_len(a, b)?;
        self.count(a.len());
        Ok((self.prims.dot)(a, b))
    }

    /// Arithmetic mean; 0 for an empty slice.
    pub fn mean(&self, a: &[f64]) -> f64 {
        if a.is_empty() {
            return 0.0;
        }
        self.sum(a, 0, a.len()) / a.len() as f64
    }

    /// Population variance; 0 for an empty slice.
    pub fn variance(&self, a: &[f64]) -> f64 {
        if a.is_empty() {
            return 0.0;
        }
        let mean = self.mean(a);
        self.count(a.len());
        (self.prims.sq_dev)(a, mean) / a.len() as f64
    }

    /// Sample variance (N - 1); 0 with fewer than two values.
    pub fn variance_sample(&self, a: &[f64]) -> f64 {
        if a.len() < 2 {
            return 0.0;
        }
        let mean = self.mean(a);
        self.count(a.len());
        (self.prims.sq_dev)(a, mean) / (a.len() - 1) as f64
    }

    /// Pearson correlation of raw values; 0 if either side has no variance.
    pub fn correlation(&self, a: &[f64], b: &[f64]) -> QuantResult<f64> {
        ensure_same_len(a, b)?;
        if a.is_empty() {
            return Ok(0.0);
        }
        let mean_a = self.mean(a);
        let mean_b = self.mean(b);
        let sxy = (self.prims.cross_dev)(a, b, mean_a, mean_b);
        let sxx = (self.prims.sq_dev)(a, mean_a);
        let syy = (self.prims.sq_dev)(b, mean_b);
        self.count(3 * a.len());

        let n = a.len() as f64;
        if negligible_dispersion((sxx / n).sqrt(), mean_a) || negligible_dispersion((syy / n).sqrt(), mean_b) {
            return Ok(0.0);
        }
        let denom = (sxx * syy).sqrt();
        if !denom.is_finite() {
            return Ok(0.0);
        }
        Ok(sxy / denom)
    }

    /// OLS fit `y = α + β·x`, returned as `(α, β)`; `(0, 0)` when `x` is constant.
    pub fn linear_regression(&self, y: &[f64], x: &[f64]) -> QuantResult<(f64, f64)> {
        ensure_same_len(y, x)?;
        if x.is_empty() {
            return Ok((0.0, 0.0));
        }
        let mean_x = self.mean(x);
        let mean_y = self.mean(y);
        let sxx = (self.prims.sq_dev)(x, mean_x);
        let sxy = (self.prims.cross_dev)(x, y, mean_x, mean_y);
        self.count(2 * x.len());

        if negligible_dispersion((sxx / x.len() as f64).sqrt(), mean_x) {
            return Ok((0.0, 0.0));
        }
        let beta = sxy / sxx;
        Ok((mean_y - beta * mean_x, beta))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rolling windows (end-aligned, N - w + 1 outputs)
    // ─────────────────────────────────────────────────────────────────────────

    /// Sliding-window sum. The first value is exact; later values use
    /// `s[i+1] = s[i] - a[i] + a[i+w]` and may drift in the last digits.
    pub fn rolling_sum(&self, a: &[f64], w: usize) -> Vec<f64> {
        if w == 0 || w > a.len() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(a.len() - w + 1);
        let mut s = (self.prims.sum)(&a[..w]);
        out.push(s);
        for i in 0..a.len() - w {
            s = s - a[i] + a[i + w];
            out.push(s);
        }
        self.count(a.len());
        out
    }

    pub fn rolling_mean(&self, a: &[f64], w: usize) -> Vec<f64> {
        let mut sums = self.rolling_sum(a, w);
        let inv = 1.0 / w as f64;
        for s in &mut sums {
            *s *= inv;
        }
        sums
    }

    /// Sample standard deviation of each window; empty when `w < 2`.
    pub fn rolling_stddev(&self, a: &[f64], w: usize) -> Vec<f64> {
        if w < 2 || w > a.len() {
            return Vec::new();
        }
        let means = self.rolling_mean(a, w);
        let out: Vec<f64> = a
            .windows(w)
            .zip(&means)
            .map(|(win, &m)| ((self.prims.sq_dev)(win, m) / (w - 1) as f64).sqrt())
            .collect();
        self.count(a.len() * w);
        out
    }

    /// Pearson correlation of each aligned window pair.
    pub fn rolling_correlation(&self, a: &[f64], b: &[f64], w: usize) -> QuantResult<Vec<f64>> {
        ensure_same_len(a, b)?;
        if w < 2 || w > a.len() {
            return Ok(Vec::new());
        }
        a.windows(w)
            .zip(b.windows(w))
            .map(|(wa, wb)| self.correlation(wa, wb))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuantError;

    fn both() -> [Kernels; 2] {
        [Kernels::select(true), Kernels::scalar()]
    }

    #[test]
    fn test_regression_on_a_line() {
        for k in both() {
            let x = [0.0, 1.0, 2.0, 3.0, 4.0];
            let y = [1.0, 3.0, 5.0, 7.0, 9.0];
            let (alpha, beta) = k.linear_regression(&y, &x).unwrap();
            assert!((alpha - 1.0).abs() < 1e-12, "{}: alpha {alpha}", k.variant());
            assert!((beta - 2.0).abs() < 1e-12, "{}: beta {beta}", k.variant());
        }
    }

    #[test]
    fn test_regression_constant_x() {
        let k = Kernels::scalar();
        assert_eq!(
            k.linear_regression(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap(),
            (0.0, 0.0)
        );
    }

    #[test]
    fn test_identical_series_correlate_perfectly() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let wide = Kernels::select(true).correlation(&a, &a).unwrap();
        let narrow = Kernels::scalar().correlation(&a, &a).unwrap();
        assert!((wide - 1.0).abs() < 1e-12);
        assert!((wide - narrow).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_correlation_is_zero() {
        let k = Kernels::select(true);
        assert_eq!(k.correlation(&[2.0; 6], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_near_constant_inputs_have_no_correlation_or_slope() {
        let varying: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).sin()).collect();
        for k in both() {
            for c in [0.01, 0.013, 0.1, 123.456] {
                let flat = vec![c; 30];
                assert_eq!(k.correlation(&flat, &varying).unwrap(), 0.0, "{}: {c}", k.variant());
                assert_eq!(k.correlation(&varying, &flat).unwrap(), 0.0, "{}: {c}", k.variant());
                assert_eq!(k.linear_regression(&varying, &flat).unwrap(), (0.0, 0.0), "{}: {c}", k.variant());
            }
        }
    }

    #[test]
    fn test_rolling_sum_window_of_three() {
        for k in both() {
            let out = k.rolling_sum(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
            assert_eq!(out, vec![6.0, 9.0, 12.0, 15.0]);
        }
    }

    #[test]
    fn test_window_longer_than_input_is_empty() {
        let k = Kernels::scalar();
        assert!(k.rolling_sum(&[1.0, 2.0], 3).is_empty());
        assert!(k.rolling_stddev(&[1.0, 2.0], 3).is_empty());
        assert!(k.rolling_correlation(&[1.0], &[1.0], 2).unwrap().is_empty());
    }

    #[test]
    fn test_elementwise_length_mismatch() {
        let k = Kernels::select(true);
        let err = k.sub(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, QuantError::LengthMismatch { left: 2, right: 1 });
        assert!(k.dot(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_division_by_zero_in_every_lane() {
        for k in both() {
            let a: Vec<f64> = (1..=9).map(f64::from).collect();
            let mut b = vec![2.0; 9];
            b[1] = 0.0;
            b[6] = 0.0;
            b[8] = 0.0;
            let out = k.div(&a, &b).unwrap();
            assert_eq!(out[1], 0.0);
            assert_eq!(out[6], 0.0);
            assert_eq!(out[8], 0.0);
            assert_eq!(out[0], 0.5);
            assert!(out.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_sum_range_clipping() {
        let k = Kernels::scalar();
        let a = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(k.sum(&a, 1, 2), 5.0);
        assert_eq!(k.sum(&a, 3, 10), 4.0);
        assert_eq!(k.sum(&a, 9, 1), 0.0);
        assert_eq!(k.sum(&[], 0, 0), 0.0);
    }

    #[test]
    fn test_variances() {
        let k = Kernels::select(true);
        let a = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((k.variance(&a) - 4.0).abs() < 1e-12);
        assert!((k.variance_sample(&a) - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(k.variance_sample(&[1.0]), 0.0);
    }

    #[test]
    fn test_wide_and_scalar_agree_on_odd_lengths() {
        let wide = Kernels::select(true);
        let narrow = Kernels::scalar();
        for n in [1usize, 3, 5, 7, 17, 101] {
            let a: Vec<f64> = (0..n).map(|i| ((i * 37 % 11) as f64).sin() + i as f64 * 0.1).collect();
            let b: Vec<f64> = (0..n).map(|i| ((i * 13 % 7) as f64).cos() - i as f64 * 0.05).collect();

            let dw = wide.dot(&a, &b).unwrap();
            let dn = narrow.dot(&a, &b).unwrap();
            assert!((dw - dn).abs() <= 1e-9 * dn.abs().max(1.0));

            let cw = wide.correlation(&a, &b).unwrap();
            let cn = narrow.correlation(&a, &b).unwrap();
            assert!((cw - cn).abs() <= 1e-9 * cn.abs().max(1.0));

            assert_eq!(wide.mul(&a, &b).unwrap(), narrow.mul(&a, &b).unwrap());
        }
    }

    #[test]
    fn test_rolling_stddev_is_sample() {
        let k = Kernels::scalar();
        let out = k.rolling_stddev(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_operation_counter() {
        let k = Kernels::scalar();
        k.dot(&[1.0; 10], &[1.0; 10]).unwrap();
        assert_eq!(k.stats().operations, 40);
        assert!(k.stats().gflops(1e-9) > 0.0);
        k.reset_stats();
        assert_eq!(k.stats().operations, 0);
    }
}
