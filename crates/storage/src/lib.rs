//! Storage layer for the pair scanner
//!
//! **Philosophy:** Declarative, Modular, SoC
//! - Declarative: Table layouts defined upfront in [`schema`]
//! - Modular: Loading and export are independent free functions
//! - SoC: This crate ONLY handles files, no statistics
//!
//! **Input:** one OHLCV CSV per symbol, loaded in parallel ([`loader`])
//!
//! **Output:** three CSV result tables plus an optional JSON document ([`export`])

pub mod error;
pub mod export;
pub mod loader;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use export::{
    ExportOptions, ExportSummary, ResultTable, ResultsDocument, escape_field, export_all, export_json,
    export_table, write_csv,
};
pub use loader::{LoadingMetrics, load_directory, load_file, parse_csv};
