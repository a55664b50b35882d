//! Error type for the quant crate.
//!
//! Only caller mistakes surface as errors: mismatched lengths, empty required
//! series and nonsensical parameters. Numerically degenerate inputs (zero
//! variance, zero denominators, too-short windows) produce defined fallback
//! values instead.

use types::SeriesShapeError;

/// Invalid input to a kernel, indicator pipeline or pair analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantError {
    /// Two inputs that must be aligned have different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// A required series is empty.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// A parameter is outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An OHLCV series is malformed.
    #[error(transparent)]
    Shape(#[from] SeriesShapeError),
}

/// Result alias for quant operations.
pub type QuantResult<T> = Result<T, QuantError>;

/// Fail with [`QuantError::LengthMismatch`] unless `a` and `b` are equally long.
#[inline]
pub fn ensure_same_len(a: &[f64], b: &[f64]) -> QuantResult<()> {
    if a.len() != b.len() {
        return Err(QuantError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuantError::LengthMismatch { left: 3, right: 4 };
        assert_eq!(err.to_string(), "length mismatch: 3 vs 4");
        assert!(ensure_same_len(&[1.0], &[1.0, 2.0]).is_err());
        assert!(ensure_same_len(&[], &[]).is_ok());
    }
}
