//! Compiled regular expressions shared by every extractor.
//!
//! Patterns are compiled once per process. A compile failure is surfaced as a
//! [`ParseError`] on every parse rather than a panic.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::error::ParseError;

/// CONFIG keys the config extractor knows how to read.
pub(crate) const CONFIG_FIELDS: &[&str] = &[
    "name",
    "trading_symbol",
    "symbol",
    "timeframe",
    "timeframes",
    "leverage",
    "take_profit",
    "take_profit_pct",
    "stop_loss",
    "stop_loss_pct",
    "polling_mode",
    "position_size_pct",
];

/// String, numeric and list forms of one `"key": value` entry.
pub(crate) struct FieldPattern {
    text: Regex,
    number: Regex,
    list: Regex,
}

impl FieldPattern {
    fn compile(key: &str) -> Result<Self, regex::Error> {
        let key = regex::escape(key);
        Ok(Self {
            text: Regex::new(&format!(
                r#"["']{key}["']\s*:\s*(?:"([^"\n]*)"|'([^'\n]*)')"#
            ))?,
            number: Regex::new(&format!(r#"["']{key}["']\s*:\s*(-?\d+(?:\.\d+)?)"#))?,
            list: Regex::new(&format!(r#"(?s)["']{key}["']\s*:\s*\[(.*?)\]"#))?,
        })
    }

    /// `"key": "value"` or `'key': 'value'`, trimmed.
    pub fn text_value(&self, body: &str) -> Option<String> {
        let caps = self.text.captures(body)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim().to_string())
    }

    /// `"key": 4.5`, returned as the literal text.
    pub fn number_value<'b>(&self, body: &'b str) -> Option<&'b str> {
        self.number
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// `"key": ["a", "b"]`, with quotes and blanks stripped from each item.
    pub fn list_values(&self, body: &str) -> Vec<String> {
        let Some(inner) = self.list.captures(body).and_then(|caps| caps.get(1)) else {
            return Vec::new();
        };
        inner
            .as_str()
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\'').trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub(crate) struct Patterns {
    pub docstring: Regex,
    pub config_start: Regex,
    fields: BTreeMap<&'static str, FieldPattern>,

    pub pnl_take_profit: Regex,
    pub pnl_stop_loss: Regex,
    pub pnl_take_profit_any: Regex,
    pub pnl_stop_loss_any: Regex,

    pub ma_period: Regex,
    pub ema_period: Regex,
    pub ma_cross_pair: Regex,

    pub rsi_comparison: Regex,
    pub rsi_period: Regex,
    pub rsi_oversold: Regex,
    pub rsi_overbought: Regex,

    pub fib_level: Regex,
    pub fib_assignment: Regex,

    pub atr_usage: Regex,
    pub std_usage: Regex,
    pub contraction_usage: Regex,

    pub volume_usage: Regex,
    pub volume_multiplier: Regex,

    pub momentum_usage: Regex,
    pub momentum_long: Regex,
    pub momentum_short: Regex,
    pub momentum_lookback: Regex,
}

impl Patterns {
    pub fn compile() -> Result<Self, regex::Error> {
        let fields = CONFIG_FIELDS
            .iter()
            .map(|key| FieldPattern::compile(key).map(|pattern| (*key, pattern)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            docstring: Regex::new(r#"(?s)"""(.*?)""""#)?,
            config_start: Regex::new(r"\bCONFIG\s*=\s*\{")?,
            fields,

            pnl_take_profit: Regex::new(r"pnl_pct\s*>=\s*(\d+(?:\.\d+)?)")?,
            pnl_stop_loss: Regex::new(r"pnl_pct\s*<=\s*-\s*(\d+(?:\.\d+)?)")?,
            pnl_take_profit_any: Regex::new(r"pnl_pct\s*>=")?,
            pnl_stop_loss_any: Regex::new(r"pnl_pct\s*<=\s*-")?,

            ma_period: Regex::new(r"(?i)(?:^|[^a-z0-9])s?ma_?(\d+)")?,
            ema_period: Regex::new(r"(?i)(?:^|[^a-z0-9])ema_?(\d+)")?,
            ma_cross_pair: Regex::new(
                r"(?i)\b[se]?ma_?(\d+)_(above|below|cross(?:es|ed)?(?:_?(?:above|below|over|under))?)_[se]?ma_?(\d+)",
            )?,

            rsi_comparison: Regex::new(
                r"(?i)(?:^|[^a-z0-9])rsi\w*\s*(?:[<>]=?|==)\s*(?:-?\d|\w*(?:threshold|oversold|overbought|level|limit))|\d\s*[<>]=?\s*(?:[a-z0-9]*_)?rsi",
            )?,
            rsi_period: Regex::new(r#"(?i)rsi_?(?:period|length|window)["']?\s*[:=]\s*(\d+)"#)?,
            rsi_oversold: Regex::new(r"(?i)(?:^|[^a-z0-9])rsi\w*\s*<=?\s*(\d+(?:\.\d+)?)")?,
            rsi_overbought: Regex::new(r"(?i)(?:^|[^a-z0-9])rsi\w*\s*>=?\s*(\d+(?:\.\d+)?)")?,

            fib_level: Regex::new(r"(?:^|[^\d.])0?\.(236|382|5|618|786)\b")?,
            fib_assignment: Regex::new(r"(?i)\b\w*fib\w*\s*=[^=]")?,

            atr_usage: Regex::new(r"(?i)\b(?:\w+_)?atr(?:_\w+)?\s*=[^=]|atr\s*\(")?,
            std_usage: Regex::new(
                r"(?i)\.std\(|\bstdev\(|\bstd_dev\w*\s*=[^=]|\b\w*volatility\w*\s*=[^=]",
            )?,
            contraction_usage: Regex::new(
                r"(?i)\b\w*contraction\w*\s*=[^=]|\b\w*contraction\w*\s*[<>]",
            )?,

            volume_usage: Regex::new(
                r"(?i)\b\w*volume\w*\s*[<>]=?|\b\w*vol(?:ume)?_(?:ratio|ma|avg|sma|spike|mean|surge)\w*\s*=[^=]|\b(?:avg|average|mean)_vol(?:ume)?\w*\s*=[^=]",
            )?,
            volume_multiplier: Regex::new(
                r#"(?i)volume\w*\s*>=?\s*[\w.\[\]'"]*\s*\*\s*(\d+(?:\.\d+)?)"#,
            )?,

            momentum_usage: Regex::new(
                r"(?i)\b\w*momentum\w*\s*(?:=[^=]|[<>]=?)|\.pct_change\(|\broc(?:_\w+)?\s*=[^=]",
            )?,
            momentum_long: Regex::new(r"(?i)momentum\w*\s*>=?\s*(\d+(?:\.\d+)?)")?,
            momentum_short: Regex::new(r"(?i)momentum\w*\s*<=?\s*-\s*(\d+(?:\.\d+)?)")?,
            momentum_lookback: Regex::new(
                r#"(?i)momentum_?(?:period|lookback|window)["']?\s*[:=]\s*(\d+)"#,
            )?,
        })
    }

    pub fn field(&self, key: &'static str) -> Result<&FieldPattern, ParseError> {
        self.fields.get(key).ok_or(ParseError::UnknownField(key))
    }
}

static PATTERNS: LazyLock<Result<Patterns, regex::Error>> = LazyLock::new(Patterns::compile);

/// Process-wide compiled pattern set.
pub(crate) fn patterns() -> Result<&'static Patterns, ParseError> {
    PATTERNS.as_ref().map_err(|e| ParseError::Pattern(e.clone()))
}

/// First capture group of `re` in `text`.
pub(crate) fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
