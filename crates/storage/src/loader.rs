//! OHLCV CSV loading.
//!
//! One file per symbol: a header row, then `datetime,open,high,low,close,
//! volume[,symbol,...]`. Parsing is permissive: numbers that do not parse
//! become 0 (volume 1000), rows without a usable timestamp or with too few
//! columns are skipped, and bars that do not move time forward are dropped.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};
use types::{Bar, OhlcvSeries, Timestamp};

use crate::error::{StorageError, StorageResult};
use crate::schema::input;

/// Throughput and volume of one directory load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadingMetrics {
    pub files_loaded: usize,
    pub files_failed: usize,
    pub total_bars: usize,
    pub loading_time_seconds: f64,
    pub files_per_second: f64,
    /// Six f64 columns per bar.
    pub memory_mb: f64,
}

// =============================================================================
// Cell Parsing
// =============================================================================

/// Parse a numeric cell: optional sign, digits, optional fraction.
///
/// Trailing characters after the numeric prefix are ignored. Returns `None`
/// when no digit is found or the value is not finite.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if let Ok(v) = cell.parse::<f64>() {
        return v.is_finite().then_some(v);
    }

    let bytes = cell.as_bytes();
    let mut i = 0;
    let sign = match bytes.first() {
        Some(b'-') => {
            i += 1;
            -1.0
        }
        Some(b'+') => {
            i += 1;
            1.0
        }
        _ => 1.0,
    };

    let mut value = 0.0;
    let mut digits = 0;
    while let Some(d) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
        value = value * 10.0 + f64::from(d - b'0');
        digits += 1;
        i += 1;
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let mut scale = 0.1;
        while let Some(d) = bytes.get(i).filter(|b| b.is_ascii_digit()) {
            value += f64::from(d - b'0') * scale;
            scale *= 0.1;
            digits += 1;
            i += 1;
        }
    }
    (digits > 0).then_some(sign * value)
}

/// Parse `YYYY-MM-DD HH:MM:SS` (or with a `T`), or `YYYY-MM-DD` at 09:30:00,
/// into seconds since the epoch of the naive time.
pub fn parse_timestamp(cell: &str) -> Option<Timestamp> {
    let cell = cell.trim();
    let datetime = NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(cell, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            let (h, m, s) = input::DATE_ONLY_TIME;
            NaiveDate::parse_from_str(cell, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(h, m, s)
        })?;
    Some(datetime.and_utc().timestamp())
}

/// Symbol from a file name: the stem without a `_features` suffix.
pub fn symbol_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.find(input::FEATURES_SUFFIX) {
        Some(pos) => stem[..pos].to_string(),
        None => stem,
    }
}

// =============================================================================
// File Parsing
// =============================================================================

/// Parse CSV text into a series, falling back to `fallback_symbol` when the
/// file has no `symbol` column.
///
/// Returns `None` when no data row survives.
pub fn parse_csv(text: &str, fallback_symbol: &str) -> Option<OhlcvSeries> {
    let mut lines = text.lines();
    let header = lines.next()?;
    let has_symbol_column = header
        .split(',')
        .nth(input::SYMBOL)
        .is_some_and(|h| h.trim().eq_ignore_ascii_case("symbol"));

    let mut series = OhlcvSeries::new(fallback_symbol);
    let mut symbol_set = false;
    let mut skipped = 0usize;
    let mut out_of_order = 0usize;

    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() < input::REQUIRED_COLUMNS {
            skipped += 1;
            continue;
        }
        let Some(timestamp) = parse_timestamp(cells[input::DATETIME]) else {
            skipped += 1;
            continue;
        };
        if series.timestamps.last().is_some_and(|&last| timestamp <= last) {
            out_of_order += 1;
            continue;
        }

        if has_symbol_column && !symbol_set {
            if let Some(sym) = cells.get(input::SYMBOL).map(|s| s.trim()).filter(|s| !s.is_empty()) {
                series.symbol = sym.to_string();
            }
            symbol_set = true;
        }

        let num = |col: usize| parse_number(cells[col]).unwrap_or(0.0);
        series.push(Bar {
            timestamp,
            open: num(input::OPEN),
            high: num(input::HIGH),
            low: num(input::LOW),
            close: num(input::CLOSE),
            volume: parse_number(cells[input::VOLUME]).unwrap_or(input::DEFAULT_VOLUME),
        });
    }

    if skipped > 0 || out_of_order > 0 {
        debug!(
            symbol = %series.symbol,
            skipped,
            out_of_order,
            "dropped CSV rows"
        );
    }
    (!series.is_empty()).then_some(series)
}

/// Load one CSV file.
pub fn load_file(path: &Path) -> StorageResult<OhlcvSeries> {
    let text = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    parse_csv(&text, &symbol_from_path(path)).ok_or_else(|| StorageError::NoValidRows(path.to_path_buf()))
}

/// `*.csv` files directly inside `dir`, sorted by path.
pub fn csv_files(dir: &Path) -> StorageResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| StorageError::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();
    Ok(files)
}

/// Load every CSV in `dir` on `threads` workers (0 = hardware concurrency).
///
/// Files that fail are logged and counted; only an unreadable directory is
/// an error. Series come back in file-name order.
pub fn load_directory(dir: &Path, threads: usize) -> StorageResult<(Vec<OhlcvSeries>, LoadingMetrics)> {
    let start = Instant::now();
    let files = csv_files(dir)?;

    let results = parallel::with_pool(threads, || {
        parallel::map_slice(&files, |path| load_file(path), false)
    })?;

    let mut series = Vec::with_capacity(files.len());
    let mut failed = 0;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(s) => series.push(s),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                failed += 1;
            }
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    let total_bars: usize = series.iter().map(OhlcvSeries::len).sum();
    let metrics = LoadingMetrics {
        files_loaded: series.len(),
        files_failed: failed,
        total_bars,
        loading_time_seconds: elapsed,
        files_per_second: if elapsed > 0.0 {
            series.len() as f64 / elapsed
        } else {
            0.0
        },
        memory_mb: (total_bars * 6 * std::mem::size_of::<f64>()) as f64 / (1024.0 * 1024.0),
    };
    info!(
        dir = %dir.display(),
        loaded = metrics.files_loaded,
        failed = metrics.files_failed,
        bars = metrics.total_bars,
        "loaded OHLCV files"
    );
    Ok((series, metrics))
}
