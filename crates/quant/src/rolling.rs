//! End-aligned rolling-window helpers.
//!
//! Every function here follows the window contract: an input of length `N`
//! and a window `w` produce `N - w + 1` outputs, output `k` covering inputs
//! `[k, k + w - 1]`. A zero window or one longer than the input produces an
//! empty vector.

use std::collections::VecDeque;

/// Apply `f` to every full window.
///
/// # Example
/// ```
/// use quant::rolling::window_apply;
///
/// let out = window_apply(&[1.0, 2.0, 3.0, 4.0], 2, |w| w[1] - w[0]);
/// assert_eq!(out, vec![1.0, 1.0, 1.0]);
/// ```
pub fn window_apply<F>(values: &[f64], w: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if w == 0 || w > values.len() {
        return Vec::new();
    }
    values.windows(w).map(f).collect()
}

/// Apply `f` to every pair of aligned windows over two series.
pub fn window_apply2<F>(a: &[f64], b: &[f64], w: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    let n = a.len().min(b.len());
    if w == 0 || w > n {
        return Vec::new();
    }
    a[..n]
        .windows(w)
        .zip(b[..n].windows(w))
        .map(|(wa, wb)| f(wa, wb))
        .collect()
}

/// Rolling maximum via a monotonic deque, O(N).
pub fn rolling_max(values: &[f64], w: usize) -> Vec<f64> {
    rolling_extreme(values, w, |incoming, kept| incoming >= kept)
}

/// Rolling minimum via a monotonic deque, O(N).
pub fn rolling_min(values: &[f64], w: usize) -> Vec<f64> {
    rolling_extreme(values, w, |incoming, kept| incoming <= kept)
}

/// Index of the maximum within each window (0 = window start, latest wins ties).
pub fn rolling_argmax(values: &[f64], w: usize) -> Vec<usize> {
    if w == 0 || w > values.len() {
        return Vec::new();
    }
    values
        .windows(w)
        .map(|win| {
            win.iter()
                .enumerate()
                .fold(0, |best, (i, &v)| if v >= win[best] { i } else { best })
        })
        .collect()
}

/// Index of the minimum within each window (0 = window start, latest wins ties).
pub fn rolling_argmin(values: &[f64], w: usize) -> Vec<usize> {
    if w == 0 || w > values.len() {
        return Vec::new();
    }
    values
        .windows(w)
        .map(|win| {
            win.iter()
                .enumerate()
                .fold(0, |best, (i, &v)| if v <= win[best] { i } else { best })
        })
        .collect()
}

fn rolling_extreme(values: &[f64], w: usize, dominates: fn(f64, f64) -> bool) -> Vec<f64> {
    if w == 0 || w > values.len() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len() - w + 1);
    // Indices whose values are monotone from front (the extreme) to back.
    let mut deque: VecDeque<usize> = VecDeque::with_capacity(w);

    for (i, &v) in values.iter().enumerate() {
        while let Some(&back) = deque.back() {
            if dominates(v, values[back]) {
                deque.pop_back();
            } else {
                break;
            }
        }
        deque.push_back(i);

        if let Some(&front) = deque.front() {
            if front + w <= i {
                deque.pop_front();
            }
        }
        if i + 1 >= w {
            if let Some(&front) = deque.front() {
                out.push(values[front]);
            }
        }
    }
    out
}

/// Trim a sequence's head so it ends aligned with a shorter one.
///
/// Used when combining two end-aligned sequences of different lengths.
pub fn tail(values: &[f64], len: usize) -> &[f64] {
    &values[values.len().saturating_sub(len)..]
}
