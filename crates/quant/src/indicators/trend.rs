//! Trend-following and channel indicators.

use super::atr::{atr, true_range};
use super::ema::{ema, wilder};
use crate::rolling::{rolling_argmax, rolling_argmin, rolling_max, rolling_min, tail, window_apply};
use crate::stats::{self, safe_div};

/// OLS slope against the bar index within each window.
pub fn linear_slope(values: &[f64], w: usize) -> Vec<f64> {
    window_apply(values, w, stats::index_slope)
}

/// Slope at the last point of a least-squares quadratic fit over each window.
pub fn quadratic_end_slope(values: &[f64], w: usize) -> Vec<f64> {
    // Centered abscissa: the odd power sums vanish.
    let half = (w as f64 - 1.0) / 2.0;
    let xs: Vec<f64> = (0..w).map(|i| i as f64 - half).collect();
    let s2: f64 = xs.iter().map(|x| x * x).sum();
    let s4: f64 = xs.iter().map(|x| x.powi(4)).sum();
    let n = w as f64;

    window_apply(values, w, |win| {
        let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
        for (x, y) in xs.iter().zip(win) {
            sy += y;
            sxy += x * y;
            sx2y += x * x * y;
        }
        let b = safe_div(sxy, s2);
        let c = safe_div(n * sx2y - s2 * sy, n * s4 - s2 * s2);
        b + 2.0 * c * half
    })
}

/// Detrended price oscillator: the close `w/2 + 1` bars back minus the window SMA.
pub fn detrended_price_oscillator(values: &[f64], w: usize) -> Vec<f64> {
    let shift = w / 2 + 1;
    if shift >= w {
        return Vec::new();
    }
    window_apply(values, w, |win| {
        let mean = win.iter().sum::<f64>() / w as f64;
        win[w - 1 - shift] - mean
    })
}

/// Aroon up minus Aroon down over `period` bars (window of `period + 1`).
pub fn aroon_oscillator(high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    let w = period + 1;
    let up = rolling_argmax(high, w);
    let down = rolling_argmin(low, w);
    up.iter()
        .zip(&down)
        .map(|(&hi_idx, &lo_idx)| {
            let since_high = (period - hi_idx) as f64;
            let since_low = (period - lo_idx) as f64;
            let p = period as f64;
            100.0 * (p - since_high) / p - 100.0 * (p - since_low) / p
        })
        .collect()
}

/// Percent change of a triple-smoothed EMA, N-1.
pub fn trix(values: &[f64], period: usize) -> Vec<f64> {
    let triple = ema(&ema(&ema(values, period), period), period);
    triple
        .windows(2)
        .map(|w| safe_div(100.0 * (w[1] - w[0]), w[0]))
        .collect()
}

/// Vortex indicator spread VI+ minus VI- over `period` bars.
pub fn vortex(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    if n < 2 {
        return Vec::new();
    }
    let tr = true_range(high, low, close);
    let vm_plus: Vec<f64> = (1..n).map(|i| (high[i] - low[i - 1]).abs()).collect();
    let vm_minus: Vec<f64> = (1..n).map(|i| (low[i] - high[i - 1]).abs()).collect();

    let tr_sum = window_apply(&tr, period, |w| w.iter().sum());
    let plus_sum = window_apply(&vm_plus, period, |w| w.iter().sum());
    let minus_sum = window_apply(&vm_minus, period, |w| w.iter().sum());

    tr_sum
        .iter()
        .zip(plus_sum.iter().zip(&minus_sum))
        .map(|(&t, (&p, &m))| safe_div(p - m, t))
        .collect()
}

/// Supertrend line from ATR(`period`) bands `multiplier` wide around HL/2.
pub fn supertrend(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    period: usize,
    multiplier: f64,
) -> Vec<f64> {
    let atr = atr(high, low, close, period);
    let Some(&first_atr) = atr.first() else {
        return Vec::new();
    };
    // atr[k] belongs to bar k + period.
    let hl2 = |i: usize| (high[i] + low[i]) / 2.0;

    let start = period;
    let mut upper = hl2(start) + multiplier * first_atr;
    let mut lower = hl2(start) - multiplier * first_atr;
    let mut uptrend = close[start] >= hl2(start);
    let mut out = Vec::with_capacity(atr.len());
    out.push(if uptrend { lower } else { upper });

    for (k, &a) in atr.iter().enumerate().skip(1) {
        let i = k + period;
        let basic_upper = hl2(i) + multiplier * a;
        let basic_lower = hl2(i) - multiplier * a;

        upper = if basic_upper < upper || close[i - 1] > upper {
            basic_upper
        } else {
            upper
        };
        lower = if basic_lower > lower || close[i - 1] < lower {
            basic_lower
        } else {
            lower
        };

        if uptrend && close[i] < lower {
            uptrend = false;
        } else if !uptrend && close[i] > upper {
            uptrend = true;
        }
        out.push(if uptrend { lower } else { upper });
    }
    out
}

/// Midpoint of the highest high and lowest low over `period` bars.
fn channel_mid(high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    rolling_max(high, period)
        .iter()
        .zip(rolling_min(low, period))
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

/// Ichimoku leading span A: mean of the conversion and base lines, unshifted.
pub fn ichimoku_span_a(high: &[f64], low: &[f64], conversion: usize, base: usize) -> Vec<f64> {
    let base_line = channel_mid(high, low, base);
    let conversion_line = channel_mid(high, low, conversion);
    tail(&conversion_line, base_line.len())
        .iter()
        .zip(&base_line)
        .map(|(c, b)| (c + b) / 2.0)
        .collect()
}

/// Ichimoku leading span B: channel midpoint over `period`, unshifted.
pub fn ichimoku_span_b(high: &[f64], low: &[f64], period: usize) -> Vec<f64> {
    channel_mid(high, low, period)
}

/// Fisher transform of the HL/2 position within each window.
pub fn fisher_transform(high: &[f64], low: &[f64], w: usize) -> Vec<f64> {
    let mid: Vec<f64> = high.iter().zip(low).map(|(h, l)| (h + l) / 2.0).collect();
    window_apply(&mid, w, |win| {
        let (lo, hi) = win
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if hi == lo {
            return 0.0;
        }
        let x = (2.0 * ((win[win.len() - 1] - lo) / (hi - lo) - 0.5)).clamp(-0.999, 0.999);
        0.5 * ((1.0 + x) / (1.0 - x)).ln()
    })
}

/// Commodity channel index over typical price.
pub fn cci(typical: &[f64], w: usize) -> Vec<f64> {
    window_apply(typical, w, |win| {
        let mean = win.iter().sum::<f64>() / w as f64;
        let mad = win.iter().map(|v| (v - mean).abs()).sum::<f64>() / w as f64;
        safe_div(win[w - 1] - mean, 0.015 * mad)
    })
}

/// Wilder's average directional index, 0-100. Needs `2 * period` bars.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    if n < 2 || period == 0 {
        return Vec::new();
    }
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
    }
    let tr = wilder(&true_range(high, low, close), period);
    let plus = wilder(&plus_dm, period);
    let minus = wilder(&minus_dm, period);

    let dx: Vec<f64> = tr
        .iter()
        .zip(plus.iter().zip(&minus))
        .map(|(&t, (&p, &m))| {
            let di_plus = safe_div(100.0 * p, t);
            let di_minus = safe_div(100.0 * m, t);
            safe_div(100.0 * (di_plus - di_minus).abs(), di_plus + di_minus)
        })
        .collect();
    wilder(&dx, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_slopes_on_a_line() {
        let p = ramp(30);
        assert!(linear_slope(&p, 20).iter().all(|s| (s - 1.0).abs() < 1e-9));
        assert!(quadratic_end_slope(&p, 20).iter().all(|s| (s - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_quadratic_slope_on_parabola() {
        // y = x², slope at x = 19 is 38.
        let p: Vec<f64> = (0..20).map(|i| (i * i) as f64).collect();
        let out = quadratic_end_slope(&p, 20);
        assert!((out[0] - 38.0).abs() < 1e-6);
    }

    #[test]
    fn test_aroon_uptrend() {
        let high = ramp(40);
        let low: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
        let out = aroon_oscillator(&high, &low, 25);
        assert_eq!(out.len(), 40 - 25);
        assert!(out.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn test_adx_length_and_bounds() {
        let high: Vec<f64> = (0..60).map(|i| 101.0 + (i as f64 * 0.4).sin() * 3.0 + i as f64 * 0.2).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 2.0).collect();
        let close: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
        let out = adx(&high, &low, &close, 14);
        assert_eq!(out.len(), 60 - 27);
        assert!(out.iter().all(|v| (0.0..=100.0).contains(v)));
        assert!(adx(&high[..27], &low[..27], &close[..27], 14).is_empty());
    }

    #[test]
    fn test_supertrend_below_price_in_uptrend() {
        let close = ramp(40);
        let high: Vec<f64> = close.iter().map(|c| c + 0.5).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 0.5).collect();
        let out = supertrend(&high, &low, &close, 10, 3.0);
        assert_eq!(out.len(), 30);
        assert!(out.iter().zip(&close[10..]).all(|(s, c)| s < c));
    }

    #[test]
    fn test_ichimoku_lengths() {
        let high = ramp(80);
        let low: Vec<f64> = high.iter().map(|h| h - 2.0).collect();
        assert_eq!(ichimoku_span_a(&high, &low, 9, 26).len(), 80 - 25);
        assert_eq!(ichimoku_span_b(&high, &low, 52).len(), 80 - 51);
    }

    #[test]
    fn test_flat_inputs_are_zero() {
        let flat = [10.0; 30];
        assert!(cci(&flat, 20).iter().all(|&v| v == 0.0));
        assert!(fisher_transform(&flat, &flat, 10).iter().all(|&v| v == 0.0));
        assert!(vortex(&flat, &flat, &flat, 14).iter().all(|&v| v == 0.0));
        assert!(trix(&flat, 15).iter().all(|&v| v == 0.0));
        assert!(detrended_price_oscillator(&flat, 20).iter().all(|&v| v == 0.0));
    }
}
