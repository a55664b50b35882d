//! Stat-Arb Lab - Main binary
//!
//! Loads a directory of per-symbol OHLCV CSVs, computes features, scans
//! every admissible pair for correlation and cointegration, and exports the
//! ranked opportunities.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   AnalysisConfig   ┌────────────────┐   result tables
//! │  CLI/TOML  │ ─────────────────► │ AnalysisEngine │ ────────────────► output_directory
//! │  (clap)    │                    │  (arbitrage)   │
//! └────────────┘                    └────────────────┘
//!                                          │ Stage, percent
//!                                          ▼
//!                                   tracing (stderr)
//! ```
//!
//! Logs go to stderr; stdout carries only the human summary.
//!
//! # Exit codes
//!
//! `0` on success, `1` on an invalid configuration or an I/O failure.

mod benchmark;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use arbitrage::{AnalysisEngine, AnalysisReport, ProgressCallback};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::Args;

/// Opportunities listed in the stdout summary.
const TOP_OPPORTUNITIES: usize = 10;

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_directives()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    if args.benchmark {
        return run_benchmark();
    }

    let config = args.resolve().context("failed to load configuration")?;

    if let Some(path) = &args.write_default_config {
        config
            .save_toml(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    info!(
        input = %config.input_data_directory.display(),
        output = %config.output_directory.display(),
        threads = config.num_threads,
        "starting analysis"
    );

    let progress: ProgressCallback = Arc::new(|stage, pct| info!(%stage, "{pct:5.1}%"));
    let mut engine = AnalysisEngine::new(config)
        .context("invalid configuration")?
        .with_progress(progress);
    let report = engine.run().context("analysis failed")?;

    print_summary(&report);
    Ok(())
}

fn run_benchmark() -> anyhow::Result<()> {
    info!(
        len = benchmark::SERIES_LEN,
        iterations = benchmark::ITERATIONS,
        "benchmarking kernels"
    );
    let timings = benchmark::run().context("benchmark failed")?;

    println!("Kernel benchmark ({} points x {} calls)", benchmark::SERIES_LEN, benchmark::ITERATIONS);
    for timing in &timings {
        println!("  {timing}");
    }
    if let [scalar, dispatched] = timings.as_slice() {
        let base = scalar.correlation_secs + scalar.regression_secs;
        let fast = dispatched.correlation_secs + dispatched.regression_secs;
        if fast > 0.0 {
            println!("  speedup {:.2}x ({} over Scalar)", base / fast, dispatched.variant);
        }
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    println!("{}", report.metrics);

    if let Some(export) = &report.export {
        println!(
            "Exported {} records to {} file(s) ({} bytes)",
            export.records,
            export.files.len(),
            export.bytes
        );
    }

    if report.opportunities.is_empty() {
        println!("No arbitrage opportunities found.");
        return;
    }

    println!();
    println!(
        "{:<14} {:>6} {:>8} {:>7} {:>9} {:>10}",
        "Pair", "Grade", "Combined", "Risk", "Hedge", "Cash"
    );
    for opp in report.opportunities.iter().take(TOP_OPPORTUNITIES) {
        println!(
            "{:<14} {:>6} {:>8.2} {:>7.2} {:>9.4} {:>10.2}",
            opp.key().to_string(),
            opp.grade.to_string(),
            opp.combined_score,
            opp.risk_score,
            opp.position_size_stock2,
            opp.cash_required
        );
    }
    if report.opportunities.len() > TOP_OPPORTUNITIES {
        println!("... and {} more", report.opportunities.len() - TOP_OPPORTUNITIES);
    }
}
