//! Identifier types for symbols and symbol pairs.
//!
//! A [`PairKey`] is the unordered pair `{a, b}` stored in canonical
//! (lexicographic) order. It is the cache key, the deduplication key and
//! the orientation contract for every pair computation: the first symbol is
//! always the regressor `P₁`, the second the regressand `P₂`.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Symbol Type
// =============================================================================

/// Stock ticker symbol (e.g., "AAPL", "GOOGL").
pub type Symbol = String;

/// Sector label used when no sector is known for a symbol.
pub const UNKNOWN_SECTOR: &str = "Unknown";

// =============================================================================
// Pair Key
// =============================================================================

/// Canonical unordered symbol pair.
///
/// Construction always orders the two symbols so that `first <= second`,
/// which makes `PairKey::new("B", "A") == PairKey::new("A", "B")`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    first: Symbol,
    second: Symbol,
}

impl PairKey {
    /// Create a canonical key from two symbols in any order.
    pub fn new(a: impl Into<Symbol>, b: impl Into<Symbol>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The lexicographically smaller symbol (regressor `P₁`).
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger symbol (regressand `P₂`).
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Whether `(a, b)` as given is already in canonical order.
    pub fn is_canonical_order(a: &str, b: &str) -> bool {
        a <= b
    }

    /// Rough heap footprint used by cache memory estimates.
    pub fn heap_bytes(&self) -> usize {
        self.first.capacity() + self.second.capacity()
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}
