//! NEON primitives (aarch64), two lanes per 128-bit register.

use std::arch::aarch64::*;

use super::Primitives;

const LANES: usize = 2;

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

// SAFETY (all wrappers): installed only after NEON was detected; loops are
// bounded by the shortest slice.

fn sub(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_neon(a, b, out, BinaryOp::Sub) }
}

fn add(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_neon(a, b, out, BinaryOp::Add) }
}

fn mul(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_neon(a, b, out, BinaryOp::Mul) }
}

fn div(a: &[f64], b: &[f64], out: &mut [f64]) {
    unsafe { binary_neon(a, b, out, BinaryOp::Div) }
}

fn sum(a: &[f64]) -> f64 {
    unsafe { sum_neon(a) }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    unsafe { dot_neon(a, b) }
}

fn sq_dev(a: &[f64], mean: f64) -> f64 {
    unsafe { cross_dev_neon(a, a, mean, mean) }
}

fn cross_dev(a: &[f64], b: &[f64], mean_a: f64, mean_b: f64) -> f64 {
    unsafe { cross_dev_neon(a, b, mean_a, mean_b) }
}

#[derive(Clone, Copy)]
enum BinaryOp {
    Sub,
    Add,
    Mul,
    Div,
}

/// # Safety
/// Requires NEON.
#[target_feature(enable = "neon")]
unsafe fn binary_neon(a: &[f64], b: &[f64], out: &mut [f64], op: BinaryOp) {
    let n = a.len().min(b.len()).min(out.len());
    let simd_len = n - n % LANES;

    let mut i = 0;
    while i < simd_len {
        unsafe {
            let va = vld1q_f64(a.as_ptr().add(i));
            let vb = vld1q_f64(b.as_ptr().add(i));
            let vr = match op {
                BinaryOp::Sub => vsubq_f64(va, vb),
                BinaryOp::Add => vaddq_f64(va, vb),
                BinaryOp::Mul => vmulq_f64(va, vb),
                BinaryOp::Div => {
                    // Lanes with a zero divisor select 0.
                    let is_zero = vceqq_f64(vb, vdupq_n_f64(0.0));
                    vbslq_f64(is_zero, vdupq_n_f64(0.0), vdivq_f64(va, vb))
                }
            };
            vst1q_f64(out.as_mut_ptr().add(i), vr);
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
/// Requires NEON.
#[target_feature(enable = "neon")]
unsafe fn sum_neon(a: &[f64]) -> f64 {
    let n = a.len();
    let simd_len = n - n % LANES;
    let mut acc = vdupq_n_f64(0.0);

    let mut i = 0;
    while i < simd_len {
        unsafe {
            acc = vaddq_f64(acc, vld1q_f64(a.as_ptr().add(i)));
        }
        i += LANES;
    }

    let mut total = vaddvq_f64(acc);
    for &x in &a[simd_len..] {
        total += x;
    }
    total
}

/// # Safety
/// Requires NEON.
#[target_feature(enable = "neon")]
unsafe fn dot_neon(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    let simd_len = n - n % LANES;
    let mut acc = vdupq_n_f64(0.0);

    let mut i = 0;
    while i < simd_len {
        unsafe {
            let va = vld1q_f64(a.as_ptr().add(i));
            let vb = vld1q_f64(b.as_ptr().add(i));
            acc = vfmaq_f64(acc, va, vb);
        }
        i += LANES;
    }

    let mut total = vaddvq_f64(acc);
    for j in simd_len..n {
        total += a[j] * b[j];
    }
    total
}

/// Σ (a - mean_a)(b - mean_b); with `a == b` this is the squared deviation.
///
/// # Safety
/// Requires NEON.
#[target_feature(enable = "neon")]
unsafe fn cross_dev_neon(a: &[f64], b: &[f64], mean_a: f64, mean_b: f64) -> f64 {
    let n = a.len().min(b.len());
    let simd_len = n - n % LANES;
    let va_mean = vdupq_n_f64(mean_a);
    let vb_mean = vdupq_n_f64(mean_b);
    let mut acc = vdupq_n_f64(0.0);

    let mut i = 0;
    while i < simd_len {
        unsafe {
            let da = vsubq_f64(vld1q_f64(a.as_ptr().add(i)), va_mean);
            let db = vsubq_f64(vld1q_f64(b.as_ptr().add(i)), vb_mean);
            acc = vfmaq_f64(acc, da, db);
        }
        i += LANES;
    }

    let mut total = vaddvq_f64(acc);
    for j in simd_len..n {
        total += (a[j] - mean_a) * (b[j] - mean_b);
    }
    total
}
