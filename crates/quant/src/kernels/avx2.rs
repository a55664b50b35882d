//! AVX2 + FMA primitives (x86_64).
//!
//! Each primitive runs the largest multiple-of-four prefix in 256-bit
//! registers and finishes the tail with scalar code. All loads and stores are
//! unaligned (`loadu`/`storeu`), so results do not depend on slice alignment.
//!
//! The safe wrappers in [`PRIMITIVES`] are only installed by
//! [`super::Kernels::select`] after [`super::detect::cpu_features`] confirmed
//! AVX2 and FMA at runtime.

use std::arch::x86_64::*;

use super::Primitives;

const LANES: usize = 4;

pub(super) const PRIMITIVES: Primitives = Primitives {
    sub,
    add,
    mul,
    div,
    sum,
    dot,
    sq_dev,
    cross_dev,
};

// =============================================================================
// Safe wrappers
// =============================================================================

// SAFETY (all wrappers): the table is installed only when AVX2 and FMA were
// detected, and every inner function bounds its loops by the shortest slice.

fn sub(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_avx2(a, b, out, BinaryOp::Sub) }
}

fn add(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_avx2(a, b, out, BinaryOp::Add) }
}

fn mul(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_avx2(a, b, out, BinaryOp::Mul) }
}

fn div(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_avx2(a, b, out, BinaryOp::Div) }
}

fn sum(a: &[f64]) -> f64 {
    unsafe { sum_avx2(a) }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    unsafe { dot_avx2(a, b) }
}

fn sq_dev(a: &[f64], mean: f64) -> f64 {
    unsafe { sq_dev_avx2(a, mean) }
}

fn cross_dev(a: &[f64], b: &[f64], mean_a: f64, mean_b: f64) -> f64 {
    unsafe { cross_dev_avx2(a, b, mean_a, mean_b) }
}

// =============================================================================
// Intrinsic implementations
// =============================================================================

#[derive(Clone, Copy)]
enum BinaryOp {
    Sub,
    Add,
    Mul,
    Div,
}

/// Horizontal sum of the four lanes.
///
/// # Safety
/// Requires AVX2.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn hsum(v: __m256d) -> f64 {
    let low = _mm256_castpd256_pd128(v);
    let high = _mm256_extractf128_pd(v, 1);
    let pair = _mm_add_pd(low, high);
    let swapped = _mm_unpackhi_pd(pair, pair);
    _mm_cvtsd_f64(_mm_add_sd(pair, swapped))
}

/// Elementwise `out[i] = a[i] op b[i]`.
///
/// Division masks lanes whose divisor compares equal to zero, so `x / 0`
/// stores 0 while a NaN divisor still yields NaN, matching the scalar path.
///
/// # Safety
/// Requires AVX2. Pointer arithmetic stays below `min(a, b, out)` length.
#[target_feature(enable = "avx2,fma")]
unsafe fn binary_avx2(a: &[f64], b: &[f64], out: &mut [f64], op: BinaryOp) {
    let n = a.len().min(b.len()).min(out.len());
    let simd_len = n - n % LANES;
    let zero = _mm256_setzero_pd();

    let mut i = 0;
    while i < simd_len {
        unsafe {
            let va = _mm256_loadu_pd(a.as_ptr().add(i));
            let vb = _mm256_loadu_pd(b.as_ptr().add(i));
            let vr = match op {
                BinaryOp::Sub => _mm256_sub_pd(va, vb),
                BinaryOp::Add => _mm256_add_pd(va, vb),
                BinaryOp::Mul => _mm256_mul_pd(va, vb),
                BinaryOp::Div => {
                    // NEQ_UQ is true for NaN divisors, false only for +/-0.
                    let nonzero = _mm256_cmp_pd::<_CMP_NEQ_UQ>(vb, zero);
                    _mm256_and_pd(_mm256_div_pd(va, vb), nonzero)
                }
            };
            _mm256_storeu_pd(out.as_mut_ptr().add(i), vr);
        }
        i += LANES;
    }

    for j in simd_len..n {
        out[j] = match op {
            BinaryOp::Sub => a[j] - b[j],
            BinaryOp::Add => a[j] + b[j],
            BinaryOp::Mul => a[j] * b[j],
            BinaryOp::Div => {
                if b[j] == 0.0 {
                    0.0
                } else {
                    a[j] / b[j]
                }
            }
        };
    }
}

/// # Safety
/// Requires AVX2.
#[target_feature(enable = "avx2")]
unsafe fn sum_avx2(a: &[f64]) -> f64 {
    let n = a.len();
    let simd_len = n - n % LANES;
    let mut acc = _mm256_setzero_pd();

    let mut i = 0;
    while i < simd_len {
        unsafe {
            acc = _mm256_add_pd(acc, _mm256_loadu_pd(a.as_ptr().add(i)));
        }
        i += LANES;
    }

    let mut total = unsafe { hsum(acc) };
    for &x in &a[simd_len..] {
        total += x;
    }
    total
}

/// # Safety
/// Requires AVX2 and FMA.
#[target_feature(enable = "avx2,fma")]
unsafe fn dot_avx2(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    let simd_len = n - n % LANES;
    let mut acc = _mm256_setzero_pd();

    let mut i = 0;
    while i < simd_len {
        unsafe {
            let va = _mm256_loadu_pd(a.as_ptr().add(i));
            let vb = _mm256_loadu_pd(b.as_ptr().add(i));
            acc = _mm256_fmadd_pd(va, vb, acc);
        }
        i += LANES;
    }

    let mut total = unsafe { hsum(acc) };
    for j in simd_len..n {
        total += a[j] * b[j];
    }
    total
}

/// Σ (a - mean)².
///
/// # Safety
/// Requires AVX2 and FMA.
#[target_feature(enable = "avx2,fma")]
unsafe fn sq_dev_avx2(a: &[f64], mean: f64) -> f64 {
    let n = a.len();
    let simd_len = n - n % LANES;
    let vmean = _mm256_set1_pd(mean);
    let mut acc = _mm256_setzero_pd();

    let mut i = 0;
    while i < simd_len {
        unsafe {
            let d = _mm256_sub_pd(_mm256_loadu_pd(a.as_ptr().add(i)), vmean);
            acc = _mm256_fmadd_pd(d, d, acc);
        }
        i += LANES;
    }

    let mut total = unsafe { hsum(acc) };
    for &x in &a[simd_len..] {
        total += (x - mean) * (x - mean);
    }
    total
}

/// Σ (a - mean_a)(b - mean_b).
///
/// # Safety
/// Requires AVX2 and FMA.
#[target_feature(enable = "avx2,fma")]
unsafe fn cross_dev_avx2(a: &[f64], b: &[f64], mean_a: f64, mean_b: f64) -> f64 {
    let n = a.len().min(b.len());
    let simd_len = n - n % LANES;
    let va_mean = _mm256_set1_pd(mean_a);
    let vb_mean = _mm256_set1_pd(mean_b);
    let mut acc = _mm256_setzero_pd();

    let mut i = 0;
    while i < simd_len {
        unsafe {
            let da = _mm256_sub_pd(_mm256_loadu_pd(a.as_ptr().add(i)), va_mean);
            let db = _mm256_sub_pd(_mm256_loadu_pd(b.as_ptr().add(i)), vb_mean);
            acc = _mm256_fmadd_pd(da, db, acc);
        }
        i += LANES;
    }

    let mut total = unsafe { hsum(acc) };
    for j in simd_len..n {
        total += (a[j] - mean_a) * (b[j] - mean_b);
    }
    total
}
