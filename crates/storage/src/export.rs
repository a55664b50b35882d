//! Result export to CSV and JSON.
//!
//! A [`ResultTable`] is one of the three result lists; each format is a free
//! function over it. CSV rows use fixed-precision decimals, `TRUE`/`FALSE`
//! booleans and RFC 4180 quoting for text.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::info;
use types::{ArbitrageOpportunity, CointegrationResult, CorrelationResult};

use crate::error::{StorageError, StorageResult};
use crate::schema::{self, files};

/// One of the three exportable result lists.
#[derive(Debug, Clone, Copy)]
pub enum ResultTable<'a> {
    Cointegration(&'a [CointegrationResult]),
    Correlation(&'a [CorrelationResult]),
    Opportunities(&'a [ArbitrageOpportunity]),
}

impl ResultTable<'_> {
    pub fn file_name(&self) -> &'static str {
        match self {
            ResultTable::Cointegration(_) => files::COINTEGRATION,
            ResultTable::Correlation(_) => files::CORRELATION,
            ResultTable::Opportunities(_) => files::OPPORTUNITIES,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ResultTable::Cointegration(_) => &schema::COINTEGRATION_COLUMNS,
            ResultTable::Correlation(_) => &schema::CORRELATION_COLUMNS,
            ResultTable::Opportunities(_) => &schema::OPPORTUNITY_COLUMNS,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResultTable::Cointegration(r) => r.len(),
            ResultTable::Correlation(r) => r.len(),
            ResultTable::Opportunities(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Field Formatting
// =============================================================================

/// Quote a text field containing a comma, quote or newline.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn fixed(value: f64, digits: usize) -> String {
    format!("{value:.digits$}")
}

fn flag(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

fn cointegration_row(r: &CointegrationResult) -> Vec<String> {
    vec![
        escape_field(&r.stock1),
        escape_field(&r.stock2),
        fixed(r.adf_statistic, 6),
        fixed(r.p_value, 6),
        fixed(r.critical_1pct, 6),
        fixed(r.critical_5pct, 6),
        fixed(r.critical_10pct, 6),
        fixed(r.half_life, 2),
        fixed(r.hedge_ratio, 6),
        fixed(r.spread_mean, 6),
        fixed(r.spread_std, 6),
        fixed(r.spread_max, 6),
        fixed(r.spread_min, 6),
        fixed(r.current_spread, 6),
        fixed(r.z_score, 6),
        r.grade.to_string(),
        flag(r.is_cointegrated).to_string(),
        fixed(r.entry_threshold, 6),
        fixed(r.exit_threshold, 6),
        fixed(r.expected_return, 6),
        fixed(r.sharpe_ratio, 6),
        r.historical_trades.to_string(),
        fixed(r.win_rate, 6),
    ]
}

fn correlation_row(r: &CorrelationResult) -> Vec<String> {
    vec![
        escape_field(&r.stock1),
        escape_field(&r.stock2),
        fixed(r.pearson, 6),
        fixed(r.spearman, 6),
        fixed(r.kendall_tau, 6),
        fixed(r.rolling_30, 6),
        fixed(r.rolling_60, 6),
        fixed(r.stability, 6),
        r.breakdown_count.to_string(),
        fixed(r.min_correlation, 6),
        fixed(r.max_correlation, 6),
        r.grade.to_string(),
        escape_field(&r.sector1),
        escape_field(&r.sector2),
        flag(r.same_sector).to_string(),
        fixed(r.price1, 2),
        fixed(r.price2, 2),
        flag(r.affordable).to_string(),
    ]
}

fn opportunity_row(o: &ArbitrageOpportunity) -> Vec<String> {
    vec![
        escape_field(&o.stock1),
        escape_field(&o.stock2),
        fixed(o.cointegration_score, 2),
        fixed(o.correlation_score, 2),
        fixed(o.combined_score, 2),
        fixed(o.profit_potential, 4),
        fixed(o.risk_score, 2),
        fixed(o.entry_z_score, 2),
        fixed(o.exit_z_score, 2),
        fixed(o.stop_loss_z_score, 2),
        fixed(o.position_size_stock1, 0),
        fixed(o.position_size_stock2, 6),
        fixed(o.cash_required, 2),
        fixed(o.expected_sharpe, 4),
        fixed(o.max_drawdown, 4),
        fixed(o.expected_trades_per_year, 0),
        o.market_regime.to_string(),
        o.volatility_regime.to_string(),
        o.grade.to_string(),
    ]
}

// =============================================================================
// CSV
// =============================================================================

/// Write a table (header plus rows) as CSV.
pub fn write_csv<W: Write>(table: ResultTable<'_>, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", table.columns().join(","))?;
    let rows: Box<dyn Iterator<Item = Vec<String>> + '_> = match table {
        ResultTable::Cointegration(r) => Box::new(r.iter().map(cointegration_row)),
        ResultTable::Correlation(r) => Box::new(r.iter().map(correlation_row)),
        ResultTable::Opportunities(r) => Box::new(r.iter().map(opportunity_row)),
    };
    for row in rows {
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}

/// Write `table` to `dir/<table file name>` and return the path.
pub fn export_table(dir: &Path, table: ResultTable<'_>) -> StorageResult<PathBuf> {
    let path = dir.join(table.file_name());
    let file = File::create(&path).map_err(|e| StorageError::io(&path, e))?;
    let mut out = BufWriter::new(file);
    write_csv(table, &mut out)
        .and_then(|()| out.flush())
        .map_err(|e| StorageError::io(&path, e))?;
    Ok(path)
}

// =============================================================================
// JSON
// =============================================================================

/// All three result lists in one document.
#[derive(Debug, Serialize)]
pub struct ResultsDocument<'a, M: Serialize> {
    pub metrics: &'a M,
    pub cointegration: &'a [CointegrationResult],
    pub correlation: &'a [CorrelationResult],
    pub opportunities: &'a [ArbitrageOpportunity],
}

/// Write a pretty-printed JSON document to `path`.
pub fn export_json<T: Serialize>(path: &Path, document: &T) -> StorageResult<()> {
    let file = File::create(path).map_err(|e| StorageError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, document).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|e| StorageError::io(path, e))
}

// =============================================================================
// Bundle
// =============================================================================

/// Which formats an export run writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions<'a> {
    /// Write the three CSV tables.
    pub csv: bool,
    /// Write `<stem>.json` holding the whole document.
    pub json_stem: Option<&'a str>,
}

/// What an export run wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub records: usize,
    pub bytes: u64,
    pub seconds: f64,
}

/// Export `document` into `dir`, creating it if needed.
pub fn export_all<M: Serialize>(
    dir: &Path,
    document: &ResultsDocument<'_, M>,
    options: ExportOptions<'_>,
) -> StorageResult<ExportSummary> {
    let start = Instant::now();
    fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

    let mut summary = ExportSummary {
        records: document.cointegration.len()
            + document.correlation.len()
            + document.opportunities.len(),
        ..ExportSummary::default()
    };
    if options.csv {
        for table in [
            ResultTable::Cointegration(document.cointegration),
            ResultTable::Correlation(document.correlation),
            ResultTable::Opportunities(document.opportunities),
        ] {
            summary.files.push(export_table(dir, table)?);
        }
    }
    if let Some(stem) = options.json_stem {
        let path = dir.join(format!("{stem}.json"));
        export_json(&path, document)?;
        summary.files.push(path);
    }

    summary.bytes = summary
        .files
        .iter()
        .filter_map(|p| fs::metadata(p).ok())
        .map(|m| m.len())
        .sum();
    summary.seconds = start.elapsed().as_secs_f64();
    info!(
        dir = %dir.display(),
        files = summary.files.len(),
        records = summary.records,
        "exported results"
    );
    Ok(summary)
}
