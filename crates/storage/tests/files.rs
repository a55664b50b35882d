//! Loading and export against a real directory.

use std::fs;

use storage::schema::{self, files};
use storage::{ExportOptions, ResultsDocument, export_all, load_directory};
use types::{ArbitrageOpportunity, CointegrationResult, Grade};

fn write_bars(dir: &std::path::Path, name: &str, closes: &[f64]) {
    let mut text = String::from("datetime,open,high,low,close,volume\n");
    for (i, c) in closes.iter().enumerate() {
        text.push_str(&format!("2024-01-{:02},{c},{c},{c},{c},1000\n", i + 1));
    }
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn test_load_directory_skips_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    write_bars(dir.path(), "MSFT_features.csv", &[300.0, 301.0, 302.0]);
    write_bars(dir.path(), "AAPL.csv", &[150.0, 151.0]);
    fs::write(dir.path().join("BROKEN.csv"), "datetime,open,high,low,close,volume\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let (series, metrics) = load_directory(dir.path(), 2).unwrap();
    let symbols: Vec<&str> = series.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, ["AAPL", "MSFT"]);
    assert_eq!(metrics.files_loaded, 2);
    assert_eq!(metrics.files_failed, 1);
    assert_eq!(metrics.total_bars, 5);
    assert_eq!(series[1].last_close(), Some(302.0));
}

#[test]
fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_directory(&dir.path().join("nope"), 1).unwrap_err();
    assert!(err.path().is_some());
}

#[test]
fn test_export_all_writes_tables_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");

    let coint = vec![CointegrationResult {
        stock1: "AAA".into(),
        stock2: "BBB".into(),
        adf_statistic: -3.9,
        p_value: 0.01,
        half_life: 4.257,
        historical_trades: 12,
        is_cointegrated: true,
        grade: Grade::B,
        ..Default::default()
    }];
    let opps = vec![ArbitrageOpportunity {
        stock1: "AAA".into(),
        stock2: "BBB".into(),
        combined_score: 90.0,
        position_size_stock1: 1.0,
        position_size_stock2: 1.5,
        cash_required: 200.0,
        grade: Grade::A,
        ..Default::default()
    }];
    let metrics = serde_json::json!({ "pairs": 1 });
    let doc = ResultsDocument {
        metrics: &metrics,
        cointegration: &coint,
        correlation: &[],
        opportunities: &opps,
    };

    let options = ExportOptions {
        csv: true,
        json_stem: Some("run"),
    };
    let summary = export_all(&out, &doc, options).unwrap();
    assert_eq!(summary.files.len(), 4);
    assert_eq!(summary.records, 2);
    assert!(summary.bytes > 0);

    let text = fs::read_to_string(out.join(files::COINTEGRATION)).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), schema::COINTEGRATION_COLUMNS.join(","));
    let row: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(row[..4], ["AAA", "BBB", "-3.900000", "0.010000"]);
    assert_eq!(row[7], "4.26");
    assert_eq!(row[15], "B");
    assert_eq!(row[16], "TRUE");
    assert_eq!(row[21], "12");

    let corr = fs::read_to_string(out.join(files::CORRELATION)).unwrap();
    assert_eq!(corr.lines().count(), 1);

    let opp = fs::read_to_string(out.join(files::OPPORTUNITIES)).unwrap();
    let row: Vec<&str> = opp.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(row[4], "90.00");
    assert_eq!(row[10], "1");
    assert_eq!(row[11], "1.500000");
    assert_eq!(row[12], "200.00");
    assert_eq!(row[18], "A");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("run.json")).unwrap()).unwrap();
    assert_eq!(json["metrics"]["pairs"], 1);
    assert_eq!(json["cointegration"][0]["stock1"], "AAA");
    assert_eq!(json["opportunities"][0]["grade"], "A");
}

#[test]
fn test_json_only_export() {
    let dir = tempfile::tempdir().unwrap();
    let doc = ResultsDocument {
        metrics: &(),
        cointegration: &[],
        correlation: &[],
        opportunities: &[],
    };
    let options = ExportOptions {
        csv: false,
        json_stem: Some("only"),
    };
    let summary = export_all(dir.path(), &doc, options).unwrap();
    assert_eq!(summary.files, vec![dir.path().join("only.json")]);
    assert!(!dir.path().join(files::COINTEGRATION).exists());
}
