//! Market data types for historical bar series.
//!
//! An [`OhlcvSeries`] is the column-oriented form of one symbol's history:
//! five aligned `f64` arrays plus timestamps, oldest bar first. Column layout
//! lets the numeric kernels run over contiguous slices without copying.

use crate::ids::Symbol;
use serde::{Deserialize, Serialize};

/// Bar timestamp in seconds since the Unix epoch (naive local time).
pub type Timestamp = i64;

// =============================================================================
// Single Bar View
// =============================================================================

/// One OHLCV bar, used when building or inspecting a series row by row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp.
    pub timestamp: Timestamp,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar.
    pub high: f64,
    /// Lowest price during the bar.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl Bar {
    /// Typical price (HLC/3).
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Whether `low <= min(open, close) <= max(open, close) <= high`.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close) && self.open.max(self.close) <= self.high
    }
}

// =============================================================================
// OHLCV Series
// =============================================================================

/// Column shape problems that make a series unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeriesShapeError {
    /// No bars at all.
    #[error("series {0} is empty")]
    Empty(Symbol),

    /// Columns of different lengths.
    #[error("series {symbol} has mismatched column lengths: {lengths:?}")]
    LengthMismatch {
        /// Series symbol.
        symbol: Symbol,
        /// Lengths of timestamps, open, high, low, close, volume.
        lengths: [usize; 6],
    },
}

/// Historical OHLCV bars for a single symbol, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    /// Symbol identifier.
    pub symbol: Symbol,
    /// Bar timestamps, strictly increasing.
    pub timestamps: Vec<Timestamp>,
    /// Opening prices.
    pub open: Vec<f64>,
    /// High prices.
    pub high: Vec<f64>,
    /// Low prices.
    pub low: Vec<f64>,
    /// Closing prices.
    pub close: Vec<f64>,
    /// Volumes.
    pub volume: Vec<f64>,
}

impl OhlcvSeries {
    /// Create an empty series for a symbol.
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Create an empty series with room for `capacity` bars.
    pub fn with_capacity(symbol: impl Into<Symbol>, capacity: usize) -> Self {
        Self {
            symbol: symbol.into(),
            timestamps: Vec::with_capacity(capacity),
            open: Vec::with_capacity(capacity),
            high: Vec::with_capacity(capacity),
            low: Vec::with_capacity(capacity),
            close: Vec::with_capacity(capacity),
            volume: Vec::with_capacity(capacity),
        }
    }

    /// Build a close-only series; open/high/low mirror close and volume is 1.
    ///
    /// Useful for pair analysis where only closing prices matter.
    pub fn from_closes(symbol: impl Into<Symbol>, closes: &[f64]) -> Self {
        let mut series = Self::with_capacity(symbol, closes.len());
        for (i, &c) in closes.iter().enumerate() {
            series.push(Bar {
                timestamp: i as Timestamp * 86_400,
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1.0,
            });
        }
        series
    }

    /// Append a bar.
    pub fn push(&mut self, bar: Bar) {
        self.timestamps.push(bar.timestamp);
        self.open.push(bar.open);
        self.high.push(bar.high);
        self.low.push(bar.low);
        self.close.push(bar.close);
        self.volume.push(bar.volume);
    }

    /// Number of bars (length of the close column).
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// Whether the series has no bars.
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Row view of bar `i`.
    pub fn bar(&self, i: usize) -> Option<Bar> {
        if i >= self.len() || self.check_shape().is_err() {
            return None;
        }
        Some(Bar {
            timestamp: self.timestamps[i],
            open: self.open[i],
            high: self.high[i],
            low: self.low[i],
            close: self.close[i],
            volume: self.volume[i],
        })
    }

    /// Most recent closing price.
    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }

    /// Verify all columns are non-empty and equally long.
    pub fn check_shape(&self) -> Result<(), SeriesShapeError> {
        let lengths = [
            self.timestamps.len(),
            self.open.len(),
            self.high.len(),
            self.low.len(),
            self.close.len(),
            self.volume.len(),
        ];
        if lengths.iter().any(|&l| l != lengths[4]) {
            return Err(SeriesShapeError::LengthMismatch {
                symbol: self.symbol.clone(),
                lengths,
            });
        }
        if lengths[4] == 0 {
            return Err(SeriesShapeError::Empty(self.symbol.clone()));
        }
        Ok(())
    }

    /// Count bars violating the low/high envelope. These are tolerated but flagged.
    pub fn malformed_bar_count(&self) -> usize {
        (0..self.len())
            .filter_map(|i| self.bar(i))
            .filter(|b| !b.is_well_formed())
            .count()
    }

    /// Whether timestamps are strictly increasing.
    pub fn is_chronological(&self) -> bool {
        self.timestamps.windows(2).all(|w| w[0] < w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: Timestamp, o: f64, h: f64, l: f64, c: f64) -> Bar {
        Bar {
            timestamp: ts,
            open: o,
            high: h,
            low: l,
            close: c,
            volume: 100.0,
        }
    }

    #[test]
    fn test_push_and_shape() {
        let mut s = OhlcvSeries::new("ACME");
        assert!(matches!(s.check_shape(), Err(SeriesShapeError::Empty(_))));

        s.push(bar(1, 10.0, 11.0, 9.0, 10.5));
        s.push(bar(2, 10.5, 12.0, 10.0, 11.5));
        assert_eq!(s.len(), 2);
        assert!(s.check_shape().is_ok());
        assert_eq!(s.last_close(), Some(11.5));
        assert!(s.is_chronological());
    }

    #[test]
    fn test_length_mismatch_detected() {
        let mut s = OhlcvSeries::from_closes("ACME", &[1.0, 2.0, 3.0]);
        s.volume.pop();
        assert!(matches!(
            s.check_shape(),
            Err(SeriesShapeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_malformed_bars_are_counted() {
        let mut s = OhlcvSeries::new("ACME");
        s.push(bar(1, 10.0, 11.0, 9.0, 10.5));
        // close above high
        s.push(bar(2, 10.0, 10.5, 9.5, 11.0));
        assert_eq!(s.malformed_bar_count(), 1);
    }
}
