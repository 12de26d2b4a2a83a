//! Technical indicators the strategy actually computes.
//!
//! Checks run in a fixed order (SMA, EMA, RSI, Fibonacci, Volatility, Volume,
//! Momentum) and are independent of each other. Apart from the moving
//! averages, which are identified by their period suffix, an indicator is only
//! reported when the code compares or computes it.

use std::collections::BTreeSet;

use super::model::IndicatorNode;
use super::patterns::capture;
use super::rules::{all_matches, Rule};
use super::source::Source;

const DEFAULT_RSI_PERIOD: &str = "14";

const INDICATOR_RULES: &[Rule<Source, IndicatorNode>] = &[
    Rule {
        name: "sma",
        applies: |src| !src.ma_periods().is_empty(),
        extract: |src| IndicatorNode::new("ind-sma", "SMA", period_summary(&src.ma_periods())),
    },
    Rule {
        name: "ema",
        applies: |src| !src.ema_periods().is_empty(),
        extract: |src| IndicatorNode::new("ind-ema", "EMA", period_summary(&src.ema_periods())),
    },
    Rule { name: "rsi", applies: Source::uses_rsi, extract: rsi },
    Rule { name: "fibonacci", applies: Source::uses_fibonacci, extract: fibonacci },
    Rule { name: "volatility", applies: Source::uses_volatility, extract: volatility },
    Rule { name: "volume", applies: Source::uses_volume, extract: volume },
    Rule { name: "momentum", applies: Source::uses_momentum, extract: momentum },
];

/// `"Period: 9, 21"`
pub fn period_summary(periods: &BTreeSet<u32>) -> String {
    let list: Vec<String> = periods.iter().map(u32::to_string).collect();
    format!("Period: {}", list.join(", "))
}

fn rsi(src: &Source) -> IndicatorNode {
    let p = src.patterns;
    let period = capture(&p.rsi_period, &src.raw).unwrap_or(DEFAULT_RSI_PERIOD);
    let mut params = vec![format!("Period: {}", period)];
    if let Some(level) = capture(&p.rsi_oversold, &src.raw) {
        params.push(format!("Oversold: {}", level));
    }
    if let Some(level) = capture(&p.rsi_overbought, &src.raw) {
        params.push(format!("Overbought: {}", level));
    }
    IndicatorNode::new("ind-rsi", "RSI", params.join(", "))
}

fn fibonacci(src: &Source) -> IndicatorNode {
    let levels = src.fibonacci_levels();
    let params = if levels.is_empty() {
        "Retracement levels".to_string()
    } else {
        format!("Levels: {}", levels.join(", "))
    };
    IndicatorNode::new("ind-fibonacci", "Fibonacci", params)
}

fn volatility(src: &Source) -> IndicatorNode {
    let measures: Vec<&str> = [
        (src.uses_atr(), "ATR"),
        (src.uses_std_dev(), "Std Dev"),
        (src.uses_contraction(), "Range contraction"),
    ]
    .into_iter()
    .filter_map(|(used, label)| used.then_some(label))
    .collect();
    IndicatorNode::new("ind-volatility", "Volatility", measures.join(", "))
}

fn volume(src: &Source) -> IndicatorNode {
    let params = match capture(&src.patterns.volume_multiplier, &src.raw) {
        Some(multiplier) => format!("Spike: {}x average", multiplier),
        None => "Volume vs average".to_string(),
    };
    IndicatorNode::new("ind-volume", "Volume", params)
}

fn momentum(src: &Source) -> IndicatorNode {
    let p = src.patterns;
    let mut params = Vec::new();
    if let Some(threshold) = capture(&p.momentum_long, &src.raw) {
        params.push(format!("Threshold: {}", threshold));
    }
    if let Some(lookback) = capture(&p.momentum_lookback, &src.raw) {
        params.push(format!("Lookback: {}", lookback));
    }
    let params = if params.is_empty() {
        "Rate of change".to_string()
    } else {
        params.join(", ")
    };
    IndicatorNode::new("ind-momentum", "Momentum", params)
}

pub(crate) fn extract_indicators(src: &Source) -> Vec<IndicatorNode> {
    all_matches(INDICATOR_RULES, src)
}
