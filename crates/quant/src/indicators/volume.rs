//! Volume-based indicators.

use super::ema::ema;
use crate::rolling::window_apply;
use crate::stats::safe_div;

/// On-balance volume; recursive, starting at 0.
pub fn obv(close: &[f64], volume: &[f64]) -> Vec<f64> {
    let n = close.len().min(volume.len());
    if n == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(n);
    let mut acc = 0.0;
    out.push(acc);
    for i in 1..n {
        if close[i] > close[i - 1] {
            acc += volume[i];
        } else if close[i] < close[i - 1] {
            acc -= volume[i];
        }
        out.push(acc);
    }
    out
}

/// Cumulative VWAP of typical price; recursive. Holds the previous value
/// (or the first typical price) while cumulative volume is 0.
pub fn cumulative_vwap(typical: &[f64], volume: &[f64]) -> Vec<f64> {
    let n = typical.len().min(volume.len());
    let mut out = Vec::with_capacity(n);
    let (mut pv, mut vol) = (0.0, 0.0);
    for i in 0..n {
        pv += typical[i] * volume[i];
        vol += volume[i];
        let prev = out.last().copied().unwrap_or(typical[i]);
        out.push(if vol == 0.0 { prev } else { pv / vol });
    }
    out
}

/// Which node of a volume profile to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileNode {
    /// Bucket with the most volume.
    High,
    /// Bucket with the least volume.
    Low,
}

/// Centre price of the high- or low-volume bucket of a `w`-bar close profile
/// split into `buckets` equal price ranges. A flat window reports its price.
pub fn volume_profile_node(
    close: &[f64],
    volume: &[f64],
    w: usize,
    buckets: usize,
    node: ProfileNode,
) -> Vec<f64> {
    let n = close.len().min(volume.len());
    if w == 0 || buckets == 0 || w > n {
        return Vec::new();
    }
    (0..=n - w)
        .map(|start| {
            let prices = &close[start..start + w];
            let vols = &volume[start..start + w];
            let (lo, hi) = prices
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| (lo.min(p), hi.max(p)));
            if hi <= lo {
                return prices[w - 1];
            }
            let width = (hi - lo) / buckets as f64;
            let mut profile = vec![0.0; buckets];
            for (p, v) in prices.iter().zip(vols) {
                let idx = (((p - lo) / width) as usize).min(buckets - 1);
                profile[idx] += v;
            }
            let pick = profile.iter().enumerate().fold(0, |best, (i, v)| match node {
                ProfileNode::High if *v > profile[best] => i,
                ProfileNode::Low if *v < profile[best] => i,
                _ => best,
            });
            lo + width * (pick as f64 + 0.5)
        })
        .collect()
}

/// Klinger-style volume oscillator: EMA(fast) - EMA(slow) of signed volume
/// force, with the sign from the typical-price direction. N-1.
pub fn klinger(typical: &[f64], volume: &[f64], fast: usize, slow: usize) -> Vec<f64> {
    let n = typical.len().min(volume.len());
    if n < 2 {
        return Vec::new();
    }
    let force: Vec<f64> = (1..n)
        .map(|i| {
            let trend = if typical[i] > typical[i - 1] { 1.0 } else { -1.0 };
            volume[i] * trend
        })
        .collect();
    ema(&force, fast)
        .iter()
        .zip(ema(&force, slow))
        .map(|(f, s)| f - s)
        .collect()
}

/// Money flow index over `period` typical-price changes, 0-100.
///
/// 100 when there is no negative flow in the window.
pub fn money_flow_index(typical: &[f64], volume: &[f64], period: usize) -> Vec<f64> {
    let n = typical.len().min(volume.len());
    if n < 2 {
        return Vec::new();
    }
    // Signed raw money flow aligned to the later bar.
    let flow: Vec<f64> = (1..n)
        .map(|i| {
            let raw = typical[i] * volume[i];
            if typical[i] > typical[i - 1] {
                raw
            } else if typical[i] < typical[i - 1] {
                -raw
            } else {
                0.0
            }
        })
        .collect();
    window_apply(&flow, period, |win| {
        let pos: f64 = win.iter().filter(|f| **f > 0.0).sum();
        let neg: f64 = -win.iter().filter(|f| **f < 0.0).sum::<f64>();
        if neg == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + pos / neg)
        }
    })
}

/// Distance of the close from the rolling `w`-bar VWAP in units of the
/// window's close standard deviation.
pub fn vwap_deviation(typical: &[f64], close: &[f64], volume: &[f64], w: usize) -> Vec<f64> {
    let n = typical.len().min(close.len()).min(volume.len());
    if w == 0 || w > n {
        return Vec::new();
    }
    (0..=n - w)
        .map(|start| {
            let end = start + w;
            let pv: f64 = (start..end).map(|i| typical[i] * volume[i]).sum();
            let v: f64 = volume[start..end].iter().sum();
            let closes = &close[start..end];
            let vwap = if v == 0.0 { closes[w - 1] } else { pv / v };
            let sd = crate::stats::std_dev(closes).unwrap_or(0.0);
            safe_div(closes[w - 1] - vwap, sd)
        })
        .collect()
}
