//! Built-in indicator catalogue. Default parameters are part of each name.

use types::{ChartType, FeatureCategory as Cat};

use super::Alignment::{FirstDifference, Recursive, Window};
use super::volume::ProfileNode;
use super::{
    IndicatorSpec as Spec, atr, bollinger, candlestick, drawdown, ema, interaction, macd,
    momentum, regime, rsi, sma, statistical, trend, volatility, volume,
};
use crate::stats;

pub(super) fn standard_specs() -> Vec<Spec> {
    let mut specs = Vec::with_capacity(96);
    specs.extend(price_specs());
    specs.extend(core_specs());
    specs.extend(statistical_specs());
    specs.extend(trend_specs());
    specs.extend(momentum_specs());
    specs.extend(volatility_specs());
    specs.extend(volume_specs());
    specs.extend(regime_specs());
    specs.extend(interaction_specs());
    specs.extend(risk_specs());
    specs.extend(candlestick_specs());
    specs
}

fn price_specs() -> Vec<Spec> {
    vec![
        Spec::new("open", "Open", Cat::Price, Window(1), |c| c.open().to_vec()).units("$"),
        Spec::new("high", "High", Cat::Price, Window(1), |c| c.high().to_vec()).units("$"),
        Spec::new("low", "Low", Cat::Price, Window(1), |c| c.low().to_vec()).units("$"),
        Spec::new("close", "Close", Cat::Price, Window(1), |c| c.close().to_vec()).units("$"),
        Spec::new("volume", "Volume", Cat::Price, Window(1), |c| c.volume().to_vec())
            .chart(ChartType::Bar)
            .units("shares"),
        Spec::new("typical_price", "Typical Price", Cat::Price, Window(1), |c| {
            c.typical_price().to_vec()
        })
        .units("$"),
    ]
}

fn core_specs() -> Vec<Spec> {
    vec![
        Spec::new("returns", "Returns", Cat::Price, FirstDifference, |c| c.returns().to_vec())
            .chart(ChartType::Histogram),
        Spec::new("log_returns", "Log Returns", Cat::Price, FirstDifference, |c| {
            stats::log_returns(c.close())
        })
        .chart(ChartType::Histogram),
        Spec::new("log_pct_change", "Log % Change", Cat::Statistical, FirstDifference, |c| {
            statistical::log_pct_change(c.close(), 1)
        }),
        Spec::new("sma", "SMA (20)", Cat::Technical, Window(20), |c| c.sma20().to_vec()).units("$"),
        Spec::new("sma_50", "SMA (50)", Cat::Technical, Window(50), |c| {
            c.kernels().rolling_mean(c.close(), 50)
        })
        .units("$"),
        Spec::new("ema_12", "EMA (12)", Cat::Technical, Recursive, |c| c.ema_close(12)).units("$"),
        Spec::new("ema_26", "EMA (26)", Cat::Technical, Recursive, |c| c.ema_close(26)).units("$"),
        Spec::new("rsi", "RSI (14)", Cat::Momentum, Window(15), |c| rsi::rsi(c.close(), 14))
            .bounds(0.0, 100.0),
        Spec::new("volatility", "Volatility (20)", Cat::Volatility, Window(21), |c| {
            c.volatility20().to_vec()
        }),
        Spec::new(
            "close_to_close_volatility_20",
            "Close-to-Close Volatility (20, annualised)",
            Cat::Volatility,
            Window(21),
            |c| volatility::annualize(c.volatility20()),
        ),
        Spec::new("momentum", "Momentum (10)", Cat::Momentum, Window(11), |c| {
            momentum::momentum(c.close(), 10)
        }),
        Spec::new("roc_10", "Rate of Change (10)", Cat::Momentum, Window(11), |c| {
            momentum::rate_of_change(c.close(), 10)
        })
        .percentage(),
        Spec::new("spread", "High-Low Spread", Cat::Price, Window(1), |c| {
            candlestick::candle_amplitude(c.high(), c.low())
        })
        .units("$"),
        Spec::new("internal_bar_strength", "Internal Bar Strength", Cat::Technical, Window(1), |c| {
            candlestick::internal_bar_strength(c.high(), c.low(), c.close())
        })
        .bounds(0.0, 1.0),
        Spec::new("true_range", "True Range", Cat::Volatility, FirstDifference, |c| {
            atr::true_range(c.high(), c.low(), c.close())
        })
        .units("$"),
    ]
}

fn statistical_specs() -> Vec<Spec> {
    vec![
        Spec::new("skewness_30", "Skewness (30)", Cat::Statistical, Window(31), |c| {
            statistical::rolling_skewness(c.returns(), 30)
        }),
        Spec::new("kurtosis_30", "Excess Kurtosis (30)", Cat::Statistical, Window(31), |c| {
            statistical::rolling_kurtosis(c.returns(), 30)
        }),
        Spec::new("log_pct_change_5", "Log % Change (5)", Cat::Statistical, Window(6), |c| {
            statistical::log_pct_change(c.close(), 5)
        }),
        Spec::new(
            "auto_correlation_50_10",
            "Autocorrelation (50, lag 10)",
            Cat::Statistical,
            Window(51),
            |c| statistical::auto_correlation(c.returns(), 50, 10),
        )
        .bounds(-1.0, 1.0),
        Spec::new("z_score_20", "Return Z-Score (20)", Cat::Statistical, Window(21), |c| {
            statistical::z_score(c.returns(), 20)
        }),
        Spec::new("percentile_rank_50", "Percentile Rank (50)", Cat::Statistical, Window(50), |c| {
            statistical::percentile_rank(c.close(), 50)
        })
        .bounds(0.0, 100.0),
        Spec::new(
            "coefficient_of_variation_30",
            "Coefficient of Variation (30)",
            Cat::Statistical,
            Window(30),
            |c| statistical::coefficient_of_variation(c.close(), 30),
        ),
        Spec::new("hurst_exponent_100", "Hurst Exponent (100)", Cat::Statistical, Window(100), |c| {
            statistical::hurst_exponent(c.close(), 100)
        })
        .bounds(0.0, 1.0),
        Spec::new(
            "shannon_entropy_volume_10",
            "Volume Entropy (10)",
            Cat::Statistical,
            Window(10),
            |c| statistical::shannon_entropy(c.volume(), 10),
        ),
    ]
}

fn trend_specs() -> Vec<Spec> {
    vec![
        Spec::new("kama_10_2_30", "KAMA (10, 2, 30)", Cat::Technical, Recursive, |c| {
            ema::kama(c.close(), 10, 2, 30)
        })
        .units("$"),
        Spec::new("linear_slope_20", "Linear Slope (20)", Cat::Technical, Window(20), |c| {
            trend::linear_slope(c.close(), 20)
        }),
        Spec::new("linear_slope_60", "Linear Slope (60)", Cat::Technical, Window(60), |c| {
            trend::linear_slope(c.close(), 60)
        }),
        Spec::new(
            "detrended_price_oscillator_20",
            "Detrended Price Oscillator (20)",
            Cat::Technical,
            Window(20),
            |c| trend::detrended_price_oscillator(c.close(), 20),
        )
        .chart(ChartType::Histogram),
        Spec::new("macd_line_12_26", "MACD Line", Cat::Technical, Recursive, |c| {
            macd::macd(c.close(), 12, 26, 9).line
        }),
        Spec::new("macd_signal_9", "MACD Signal", Cat::Technical, Recursive, |c| {
            macd::macd(c.close(), 12, 26, 9).signal
        }),
        Spec::new("macd_histogram_12_26_9", "MACD Histogram", Cat::Technical, Recursive, |c| {
            macd::macd(c.close(), 12, 26, 9).histogram
        })
        .chart(ChartType::Histogram),
        Spec::new("bollinger_upper_20_2", "Bollinger Upper", Cat::Technical, Window(20), |c| {
            bollinger::bollinger(c.close(), 20, 2.0).upper
        })
        .units("$"),
        Spec::new("bollinger_lower_20_2", "Bollinger Lower", Cat::Technical, Window(20), |c| {
            bollinger::bollinger(c.close(), 20, 2.0).lower
        })
        .units("$"),
        Spec::new("bollinger_percent_b_20", "Bollinger %B", Cat::Technical, Window(20), |c| {
            bollinger::bollinger(c.close(), 20, 2.0).percent_b
        }),
        Spec::new("aroon_oscillator_25", "Aroon Oscillator (25)", Cat::Technical, Window(26), |c| {
            trend::aroon_oscillator(c.high(), c.low(), 25)
        })
        .bounds(-100.0, 100.0),
        Spec::new("trix_15", "TRIX (15)", Cat::Technical, FirstDifference, |c| {
            trend::trix(c.close(), 15)
        })
        .percentage(),
        Spec::new("vortex_indicator_14", "Vortex (14)", Cat::Technical, Window(15), |c| {
            trend::vortex(c.high(), c.low(), c.close(), 14)
        }),
        Spec::new("supertrend_10_3", "Supertrend (10, 3)", Cat::Technical, Window(11), |c| {
            trend::supertrend(c.high(), c.low(), c.close(), 10, 3.0)
        })
        .units("$"),
        Spec::new(
            "ichimoku_senkou_span_A_9_26",
            "Ichimoku Span A (9, 26)",
            Cat::Technical,
            Window(26),
            |c| trend::ichimoku_span_a(c.high(), c.low(), 9, 26),
        )
        .chart(ChartType::Area)
        .units("$"),
        Spec::new(
            "ichimoku_senkou_span_B_26_52",
            "Ichimoku Span B (52)",
            Cat::Technical,
            Window(52),
            |c| trend::ichimoku_span_b(c.high(), c.low(), 52),
        )
        .chart(ChartType::Area)
        .units("$"),
        Spec::new("fisher_transform_10", "Fisher Transform (10)", Cat::Technical, Window(10), |c| {
            trend::fisher_transform(c.high(), c.low(), 10)
        }),
        Spec::new("cci_20", "CCI (20)", Cat::Technical, Window(20), |c| {
            trend::cci(c.typical_price(), 20)
        }),
    ]
}

fn momentum_specs() -> Vec<Spec> {
    vec![
        Spec::new("velocity", "Velocity", Cat::Momentum, FirstDifference, |c| {
            momentum::velocity(c.close())
        })
        .chart(ChartType::Histogram),
        Spec::new("acceleration", "Acceleration", Cat::Momentum, Window(3), |c| {
            momentum::acceleration(c.close())
        })
        .chart(ChartType::Histogram),
        Spec::new(
            "chande_momentum_oscillator_14",
            "Chande Momentum (14)",
            Cat::Momentum,
            Window(15),
            |c| momentum::chande_momentum(c.close(), 14),
        )
        .bounds(-100.0, 100.0),
        Spec::new("stochastic_k_14", "Stochastic %K (14)", Cat::Momentum, Window(14), |c| {
            momentum::stochastic_k(c.high(), c.low(), c.close(), 14)
        })
        .bounds(0.0, 100.0),
        Spec::new("williams_r_14", "Williams %R (14)", Cat::Momentum, Window(14), |c| {
            momentum::williams_r(c.high(), c.low(), c.close(), 14)
        })
        .bounds(-100.0, 0.0),
    ]
}

fn volatility_specs() -> Vec<Spec> {
    vec![
        Spec::new(
            "parkinson_volatility_20",
            "Parkinson Volatility (20)",
            Cat::Volatility,
            Window(20),
            |c| volatility::parkinson(c.high(), c.low(), 20),
        ),
        Spec::new(
            "garman_klass_volatility_20",
            "Garman-Klass Volatility (20)",
            Cat::Volatility,
            Window(20),
            |c| volatility::garman_klass(c.open(), c.high(), c.low(), c.close(), 20),
        ),
        Spec::new("atr_14", "ATR (14)", Cat::Volatility, Window(15), |c| {
            atr::atr(c.high(), c.low(), c.close(), 14)
        })
        .units("$"),
        Spec::new("garch_volatility_21", "GARCH(1,1) Volatility", Cat::Volatility, FirstDifference, |c| {
            c.garch_volatility().to_vec()
        })
        .percentage(),
    ]
}

fn volume_specs() -> Vec<Spec> {
    vec![
        Spec::new("volume_sma_20", "Volume SMA (20)", Cat::Volume, Window(20), |c| {
            c.volume_sma20().to_vec()
        })
        .chart(ChartType::Bar)
        .units("shares"),
        Spec::new("obv", "On-Balance Volume", Cat::Volume, Recursive, |c| {
            volume::obv(c.close(), c.volume())
        })
        .units("shares"),
        Spec::new("on_balance_volume_sma_20", "OBV SMA (20)", Cat::Volume, Window(20), |c| {
            sma::sma(&volume::obv(c.close(), c.volume()), 20)
        })
        .units("shares"),
        Spec::new(
            "volume_weighted_average_price_intraday",
            "VWAP (cumulative)",
            Cat::Volume,
            Recursive,
            |c| volume::cumulative_vwap(c.typical_price(), c.volume()),
        )
        .units("$"),
        Spec::new(
            "volume_profile_high_volume_node_intraday",
            "Volume Profile HVN (20)",
            Cat::Volume,
            Window(20),
            |c| volume::volume_profile_node(c.close(), c.volume(), 20, 10, ProfileNode::High),
        )
        .units("$"),
        Spec::new(
            "volume_profile_low_volume_node_intraday",
            "Volume Profile LVN (20)",
            Cat::Volume,
            Window(20),
            |c| volume::volume_profile_node(c.close(), c.volume(), 20, 10, ProfileNode::Low),
        )
        .units("$"),
        Spec::new(
            "klinger_oscillator_34_55",
            "Klinger Oscillator (34, 55)",
            Cat::Volume,
            FirstDifference,
            |c| volume::klinger(c.typical_price(), c.volume(), 34, 55),
        )
        .chart(ChartType::Histogram),
        Spec::new("money_flow_index_14", "Money Flow Index (14)", Cat::Volume, Window(15), |c| {
            volume::money_flow_index(c.typical_price(), c.volume(), 14)
        })
        .bounds(0.0, 100.0),
        Spec::new(
            "vwap_deviation_stddev_30",
            "VWAP Deviation (30, σ)",
            Cat::Volume,
            Window(30),
            |c| volume::vwap_deviation(c.typical_price(), c.close(), c.volume(), 30),
        ),
    ]
}

fn regime_specs() -> Vec<Spec> {
    vec![
        Spec::new(
            "markov_regime_switching_garch_2_state",
            "GARCH Regime (2-state)",
            Cat::Regime,
            FirstDifference,
            |c| regime::two_state_volatility_regime(c.garch_volatility()),
        )
        .chart(ChartType::Bar)
        .bounds(0.0, 1.0),
        Spec::new("adx_rating_14", "ADX (14)", Cat::Regime, Window(28), |c| {
            trend::adx(c.high(), c.low(), c.close(), 14)
        })
        .bounds(0.0, 100.0),
        Spec::new(
            "chow_test_statistic_breakpoint_detection_50",
            "Chow Break Statistic (50)",
            Cat::Regime,
            Window(50),
            |c| regime::chow_statistic(c.close(), 50),
        ),
        Spec::new(
            "market_regime_hmm_3_states_price_vol",
            "Market Regime (3-state)",
            Cat::Regime,
            Window(21),
            |c| regime::three_state_regime(c.returns(), 20, 0.05),
        )
        .chart(ChartType::Bar)
        .bounds(0.0, 2.0),
        Spec::new(
            "high_volatility_indicator_garch_threshold",
            "High Volatility Flag",
            Cat::Regime,
            FirstDifference,
            |c| regime::threshold_flag(c.garch_volatility(), regime::HIGH_VOLATILITY_THRESHOLD),
        )
        .chart(ChartType::Bar)
        .bounds(0.0, 1.0),
    ]
}

fn interaction_specs() -> Vec<Spec> {
    vec![
        Spec::new(
            "return_x_volume_interaction_10",
            "Return × Volume (10)",
            Cat::Interaction,
            Window(11),
            |c| interaction::volume_weighted_return(c.returns(), c.volume(), 10),
        ),
        Spec::new(
            "volatility_x_rsi_interaction_14",
            "Volatility × RSI (14)",
            Cat::Interaction,
            Window(21),
            |c| interaction::aligned_product(c.volatility20(), &rsi::rsi(c.close(), 14), 0.01),
        ),
        Spec::new(
            "price_to_kama_ratio_20_10_30",
            "Price / KAMA (20, 10, 30)",
            Cat::Interaction,
            Recursive,
            |c| interaction::aligned_ratio(c.close(), &ema::kama(c.close(), 20, 10, 30)),
        ),
        Spec::new(
            "polynomial_regression_price_degree_2_slope",
            "Quadratic Trend Slope (20)",
            Cat::Interaction,
            Window(20),
            |c| trend::quadratic_end_slope(c.close(), 20),
        ),
    ]
}

fn risk_specs() -> Vec<Spec> {
    vec![
        Spec::new(
            "conditional_value_at_risk_cvar_95_20",
            "CVaR 95% (20)",
            Cat::Risk,
            Window(21),
            |c| drawdown::rolling_cvar(c.returns(), 20),
        ),
        Spec::new(
            "drawdown_duration_from_peak_50",
            "Drawdown Duration (50)",
            Cat::Risk,
            Window(50),
            |c| drawdown::rolling_drawdown_duration(c.close(), 50),
        )
        .chart(ChartType::Bar)
        .units("bars"),
        Spec::new("ulcer_index_14", "Ulcer Index (14)", Cat::Risk, Window(14), |c| {
            drawdown::rolling_ulcer(c.close(), 14)
        })
        .bounds(0.0, 1.0),
        Spec::new("sortino_ratio_30", "Sortino Ratio (30)", Cat::Risk, Window(31), |c| {
            drawdown::rolling_sortino(c.returns(), 30)
        }),
        Spec::new("sharpe_ratio_30", "Sharpe Ratio (30)", Cat::Risk, Window(31), |c| {
            drawdown::rolling_sharpe(c.returns(), 30)
        }),
        Spec::new("historical_var_95_20", "Historical VaR 95% (20)", Cat::Risk, Window(21), |c| {
            drawdown::rolling_var(c.returns(), 20)
        }),
    ]
}

fn candlestick_specs() -> Vec<Spec> {
    vec![
        Spec::new("candle_way", "Candle Direction", Cat::Candlestick, Window(1), |c| {
            candlestick::candle_way(c.open(), c.close())
        })
        .chart(ChartType::Bar)
        .bounds(-1.0, 1.0),
        Spec::new("candle_filling", "Candle Body Fill", Cat::Candlestick, Window(1), |c| {
            candlestick::candle_filling(c.open(), c.high(), c.low(), c.close())
        })
        .bounds(0.0, 1.0),
        Spec::new("candle_amplitude", "Candle Amplitude", Cat::Candlestick, Window(1), |c| {
            candlestick::candle_amplitude(c.high(), c.low())
        })
        .units("$"),
    ]
}
