//! Portable scalar primitives.
//!
//! Every wide implementation must agree with these up to floating-point
//! associativity. Inputs of unequal length are processed over the common
//! prefix; length checks happen one level up in [`super::Kernels`].

use super::Primitives;

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

fn sub(a: &[f64], b: &[f64], out: &mut [f64]) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x - y;
    }
}

fn add(a: &[f64], b: &[f64], out: &mut [f64]) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x + y;
    }
}

fn mul(a: &[f64], b: &[f64], out: &mut [f64]) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x * y;
    }
}

/// Zero divisor yields 0; a NaN divisor propagates NaN.
fn div(a: &[f64], b: &[f64], out: &mut [f64]) {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = if *y == 0.0 { 0.0 } else { x / y };
    }
}

fn sum(a: &[f64]) -> f64 {
    a.iter().sum()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sq_dev(a: &[f64], mean: f64) -> f64 {
    a.iter().map(|x| (x - mean) * (x - mean)).sum()
}

fn cross_dev(a: &[f64], b: &[f64], mean_a: f64, mean_b: f64) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum()
}
