//! Read-only view of one strategy script plus the evidence checks the
//! extractors share.
//!
//! An indicator counts as "used" only when the code computes or compares it;
//! a word in a comment is not enough.

use regex::Regex;
use std::collections::BTreeSet;

use super::patterns::Patterns;

/// Ratio literal → display label, in ascending order.
const FIBONACCI_LEVELS: &[(&str, &str)] = &[
    ("236", "23.6%"),
    ("382", "38.2%"),
    ("5", "50%"),
    ("618", "61.8%"),
    ("786", "78.6%"),
];

pub(crate) struct Source {
    pub raw: String,
    pub lower: String,
    pub patterns: &'static Patterns,
}

impl Source {
    pub fn new(raw: &str, patterns: &'static Patterns) -> Self {
        Self {
            raw: raw.to_string(),
            lower: raw.to_lowercase(),
            patterns,
        }
    }

    /// Case-insensitive substring test; `needle` must be lower-case.
    pub fn contains(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    pub fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.lower.contains(needle))
    }

    /// Periods from `sma9`, `ma21`, `ma_50` style identifiers.
    pub fn ma_periods(&self) -> BTreeSet<u32> {
        periods(&self.patterns.ma_period, &self.raw)
    }

    /// Periods from `ema12` style identifiers.
    pub fn ema_periods(&self) -> BTreeSet<u32> {
        periods(&self.patterns.ema_period, &self.raw)
    }

    pub fn uses_taapi(&self) -> bool {
        self.contains("taapi")
    }

    /// TAAPI endpoint or bulk-request reference to `indicator`.
    pub fn taapi_indicator(&self, indicator: &str) -> bool {
        let needles = [
            format!("/{}", indicator),
            format!("\"{}\"", indicator),
            format!("'{}'", indicator),
        ];
        self.uses_taapi() && needles.iter().any(|needle| self.contains(needle))
    }

    pub fn uses_rsi(&self) -> bool {
        self.patterns.rsi_comparison.is_match(&self.raw) || self.taapi_indicator("rsi")
    }

    /// Display labels of the retracement ratios written as literals.
    pub fn fibonacci_levels(&self) -> Vec<&'static str> {
        let found: BTreeSet<&str> = self
            .patterns
            .fib_level
            .captures_iter(&self.raw)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        FIBONACCI_LEVELS
            .iter()
            .filter(|(literal, _)| found.contains(literal))
            .map(|(_, label)| *label)
            .collect()
    }

    pub fn uses_fibonacci(&self) -> bool {
        // 0.5 alone is too common to count as a retracement level
        self.fibonacci_levels().iter().any(|label| *label != "50%")
            || self.patterns.fib_assignment.is_match(&self.raw)
            || self.taapi_indicator("fibonacciretracement")
    }

    pub fn uses_atr(&self) -> bool {
        self.patterns.atr_usage.is_match(&self.raw)
    }

    pub fn uses_std_dev(&self) -> bool {
        self.patterns.std_usage.is_match(&self.raw)
    }

    pub fn uses_contraction(&self) -> bool {
        self.patterns.contraction_usage.is_match(&self.raw)
    }

    pub fn uses_volatility(&self) -> bool {
        self.uses_atr() || self.uses_std_dev() || self.uses_contraction()
    }

    pub fn uses_volume(&self) -> bool {
        self.patterns.volume_usage.is_match(&self.raw)
    }

    pub fn uses_momentum(&self) -> bool {
        self.patterns.momentum_usage.is_match(&self.raw)
    }
}

fn periods(re: &Regex, text: &str) -> BTreeSet<u32> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .filter(|period| (1..=500).contains(period))
        .collect()
}
