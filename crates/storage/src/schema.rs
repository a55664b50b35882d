//! File layouts for input and output tables
//!
//! **SoC:** This module ONLY defines layouts, no parsing or writing logic

/// Input CSV column positions.
pub mod input {
    pub const DATETIME: usize = 0;
    pub const OPEN: usize = 1;
    pub const HIGH: usize = 2;
    pub const LOW: usize = 3;
    pub const CLOSE: usize = 4;
    pub const VOLUME: usize = 5;
    /// Optional; falls back to the file stem.
    pub const SYMBOL: usize = 6;
    /// Columns a data row must have.
    pub const REQUIRED_COLUMNS: usize = 6;

    /// Volume used when the cell does not parse.
    pub const DEFAULT_VOLUME: f64 = 1000.0;
    /// Suffix stripped from file stems to derive the symbol.
    pub const FEATURES_SUFFIX: &str = "_features";
    /// Time assigned to date-only timestamps.
    pub const DATE_ONLY_TIME: (u32, u32, u32) = (9, 30, 0);
}

/// Output file names.
pub mod files {
    pub const COINTEGRATION: &str = "cointegration_results.csv";
    pub const CORRELATION: &str = "correlation_results.csv";
    pub const OPPORTUNITIES: &str = "arbitrage_opportunities.csv";
}

/// Cointegration table header.
pub const COINTEGRATION_COLUMNS: [&str; 23] = [
    "Stock1",
    "Stock2",
    "ADF_Statistic",
    "P_Value",
    "Critical_1pct",
    "Critical_5pct",
    "Critical_10pct",
    "Half_Life_Days",
    "Hedge_Ratio",
    "Spread_Mean",
    "Spread_StdDev",
    "Max_Spread",
    "Min_Spread",
    "Current_Spread",
    "Z_Score",
    "Grade",
    "Is_Cointegrated",
    "Entry_Threshold",
    "Exit_Threshold",
    "Expected_Return",
    "Sharpe_Ratio",
    "Historical_Trades",
    "Win_Rate",
];

/// Correlation table header.
pub const CORRELATION_COLUMNS: [&str; 18] = [
    "Stock1",
    "Stock2",
    "Pearson_Correlation",
    "Spearman_Correlation",
    "Kendall_Tau",
    "Rolling_30d",
    "Rolling_60d",
    "Stability",
    "Breakdown_Count",
    "Min_Correlation",
    "Max_Correlation",
    "Grade",
    "Sector1",
    "Sector2",
    "Same_Sector",
    "Price1",
    "Price2",
    "Affordable",
];

/// Opportunities table header.
pub const OPPORTUNITY_COLUMNS: [&str; 19] = [
    "Stock1",
    "Stock2",
    "Cointegration_Score",
    "Correlation_Score",
    "Combined_Score",
    "Profit_Potential",
    "Risk_Score",
    "Entry_Z_Score",
    "Exit_Z_Score",
    "Stop_Loss_Z_Score",
    "Position_Size_Stock1",
    "Position_Size_Stock2",
    "Cash_Required",
    "Expected_Sharpe",
    "Max_Drawdown",
    "Expected_Trades_Per_Year",
    "Market_Regime",
    "Volatility_Regime",
    "Grade",
];
