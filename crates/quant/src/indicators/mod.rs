//! Indicator library and registry.
//!
//! Indicators are pure functions from a symbol's bars to one output
//! sequence. The [`IndicatorRegistry`] maps each name to its function and
//! display metadata (category, chart hint, units, bounds, colour), so
//! consumers can enumerate features without naming them in code.
//!
//! # Output alignment
//!
//! Every entry declares an [`Alignment`], stated relative to the number of
//! bars `N`:
//!
//! - [`Alignment::Window`]`(w)`: `N - w + 1` samples, sample `k` covering
//!   bars `[k, k + w - 1]`
//! - [`Alignment::FirstDifference`]: `N - 1` samples aligned to the later bar
//! - [`Alignment::Recursive`]: `N` samples, warm-up seeded from the first input
//!
//! Too little history yields an empty sequence, never an error.
//!
//! # Example
//! ```
//! use quant::indicators::{FeatureContext, IndicatorRegistry};
//! use quant::kernels::Kernels;
//! use types::OhlcvSeries;
//!
//! let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
//! let series = OhlcvSeries::from_closes("ACME", &closes);
//! let kernels = Kernels::scalar();
//! let ctx = FeatureContext::new(&series, &kernels);
//!
//! let registry = IndicatorRegistry::standard();
//! let rsi = registry.get("rsi").unwrap();
//! assert_eq!(rsi.compute(&ctx).len(), rsi.alignment.expected_len(40));
//! ```

use std::collections::HashMap;
use std::fmt;

use types::{ChartType, FeatureCategory};

// =============================================================================
// Indicator Modules
// =============================================================================

pub mod atr;
pub mod bollinger;
pub mod candlestick;
mod catalogue;
mod context;
pub mod drawdown;
pub mod ema;
pub mod interaction;
pub mod macd;
pub mod momentum;
pub mod regime;
pub mod rsi;
pub mod sma;
pub mod statistical;
pub mod trend;
pub mod volatility;
pub mod volume;

// =============================================================================
// Re-exports
// =============================================================================

pub use context::FeatureContext;

// =============================================================================
// Alignment
// =============================================================================

/// Output-length rule of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// End-aligned window of `w` bars.
    Window(usize),
    /// One sample per consecutive bar pair.
    FirstDifference,
    /// One sample per bar.
    Recursive,
}

impl Alignment {
    /// Output length for `n` input bars.
    pub fn expected_len(&self, n: usize) -> usize {
        match *self {
            Alignment::Window(w) if w == 0 || n < w => 0,
            Alignment::Window(w) => n - w + 1,
            Alignment::FirstDifference => n.saturating_sub(1),
            Alignment::Recursive => n,
        }
    }

    /// Bars needed for a non-empty output.
    pub fn min_bars(&self) -> usize {
        match *self {
            Alignment::Window(w) => w.max(1),
            Alignment::FirstDifference => 2,
            Alignment::Recursive => 1,
        }
    }
}

// =============================================================================
// Indicator Spec
// =============================================================================

/// Indicator function over a per-symbol context.
pub type IndicatorFn = fn(&FeatureContext<'_>) -> Vec<f64>;

/// Registry entry: a named indicator and its display metadata.
#[derive(Clone)]
pub struct IndicatorSpec {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: FeatureCategory,
    pub chart: ChartType,
    pub units: &'static str,
    pub is_percentage: bool,
    /// Natural value range, when the indicator has one.
    pub bounds: Option<(f64, f64)>,
    pub alignment: Alignment,
    compute: IndicatorFn,
}

impl IndicatorSpec {
    /// Line chart, no units, unbounded.
    pub fn new(
        name: &'static str,
        display_name: &'static str,
        category: FeatureCategory,
        alignment: Alignment,
        compute: IndicatorFn,
    ) -> Self {
        Self {
            name,
            display_name,
            category,
            chart: ChartType::Line,
            units: "",
            is_percentage: false,
            bounds: None,
            alignment,
            compute,
        }
    }

    pub fn chart(mut self, chart: ChartType) -> Self {
        self.chart = chart;
        self
    }

    pub fn units(mut self, units: &'static str) -> Self {
        self.units = units;
        self
    }

    pub fn percentage(mut self) -> Self {
        self.is_percentage = true;
        self.units = "%";
        self
    }

    pub fn bounds(mut self, lo: f64, hi: f64) -> Self {
        self.bounds = Some((lo, hi));
        self
    }

    /// Display colour, taken from the category.
    pub fn color(&self) -> [f32; 3] {
        self.category.color()
    }

    /// Evaluate the indicator.
    pub fn compute(&self, ctx: &FeatureContext<'_>) -> Vec<f64> {
        (self.compute)(ctx)
    }
}

impl fmt::Debug for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorSpec")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("alignment", &self.alignment)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Name-indexed collection of indicator specs, in registration order.
#[derive(Debug, Clone, Default)]
pub struct IndicatorRegistry {
    specs: Vec<IndicatorSpec>,
    index: HashMap<&'static str, usize>,
}

impl IndicatorRegistry {
    /// Registry with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry with the full built-in catalogue.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for spec in catalogue::standard_specs() {
            registry.register(spec);
        }
        registry
    }

    /// Add a spec, replacing and returning any entry with the same name.
    pub fn register(&mut self, spec: IndicatorSpec) -> Option<IndicatorSpec> {
        match self.index.get(spec.name) {
            Some(&i) => Some(std::mem::replace(&mut self.specs[i], spec)),
            None => {
                self.index.insert(spec.name, self.specs.len());
                self.specs.push(spec);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorSpec> {
        self.specs.iter()
    }

    pub fn by_category(&self, category: FeatureCategory) -> impl Iterator<Item = &IndicatorSpec> {
        self.specs.iter().filter(move |s| s.category == category)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
