//! Heuristic extraction of a visual strategy model from Python bot source.
//!
//! Nothing here executes or fully parses Python. Every extractor is a
//! pattern match over the raw text, so unusual code degrades to a partial or
//! empty model instead of an error.

mod config;
mod data_sources;
mod docstring;
mod entry;
mod error;
mod exit;
mod indicators;
pub mod model;
mod patterns;
mod rules;
mod source;
mod strategy_type;

use serde::Serialize;
use tracing::{debug, warn};

pub use data_sources::default_source;
pub use error::ParseError;
pub use exit::DYNAMIC;
pub use indicators::period_summary;
pub use model::*;
pub use strategy_type::CUSTOM_STRATEGY;

use self::config::extract_config;
use self::data_sources::extract_data_sources;
use self::docstring::{docstring_title, extract_docstring};
use self::entry::extract_entry_conditions;
use self::exit::{extract_exit_conditions, stop_loss_level, take_profit_level};
use self::indicators::extract_indicators;
use self::patterns::patterns;
use self::source::Source;
use self::strategy_type::infer_strategy_type;

const DEFAULT_POSITION_SIZE: &str = "10%";

/// Result of one parse.
///
/// Serializes as `{"status": "parsed", "strategy": {...}}` or
/// `{"status": "empty"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ParseOutcome {
    Parsed { strategy: Box<ParsedStrategy> },
    /// Blank input, or code with no name, entry condition or indicator.
    Empty,
}

impl ParseOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ParseOutcome::Empty)
    }

    pub fn strategy(&self) -> Option<&ParsedStrategy> {
        match self {
            ParseOutcome::Parsed { strategy } => Some(&**strategy),
            ParseOutcome::Empty => None,
        }
    }

    pub fn into_strategy(self) -> Option<ParsedStrategy> {
        match self {
            ParseOutcome::Parsed { strategy } => Some(*strategy),
            ParseOutcome::Empty => None,
        }
    }
}

/// Parse strategy source into a [`ParsedStrategy`].
///
/// Never fails: internal errors are logged and reported as
/// [`ParseOutcome::Empty`].
pub fn parse(code: &str) -> ParseOutcome {
    if code.trim().is_empty() {
        return ParseOutcome::Empty;
    }

    match try_parse(code) {
        Ok(Some(strategy)) => ParseOutcome::Parsed {
            strategy: Box::new(strategy),
        },
        Ok(None) => {
            debug!("strategy code has nothing to visualize");
            ParseOutcome::Empty
        }
        Err(e) => {
            warn!(error = %e, "failed to parse strategy code");
            ParseOutcome::Empty
        }
    }
}

/// Convenience form of [`parse`] for callers that only need the model.
pub fn parse_strategy_code(code: &str) -> Option<ParsedStrategy> {
    parse(code).into_strategy()
}

fn try_parse(code: &str) -> Result<Option<ParsedStrategy>, ParseError> {
    let patterns = patterns()?;
    let src = Source::new(code, patterns);

    let docstring = extract_docstring(patterns, code);
    let config = extract_config(&src)?;
    let strategy_type = infer_strategy_type(&src);
    let data_sources = extract_data_sources(&src);
    let indicators = extract_indicators(&src);
    let entry_conditions = extract_entry_conditions(&docstring, &src);
    let exit_conditions = extract_exit_conditions(&config, &src);

    if config.name.is_empty() && entry_conditions.is_empty() && indicators.is_empty() {
        return Ok(None);
    }

    let risk_params = RiskParams {
        take_profit: take_profit_level(&config, &src).unwrap_or_default(),
        stop_loss: stop_loss_level(&config, &src).unwrap_or_default(),
        leverage: leverage_label(&config.leverage),
        position_size: position_size_label(config.position_size_pct),
    };

    let name = if !config.name.is_empty() {
        config.name.clone()
    } else {
        docstring_title(&docstring)
            .map(str::to_string)
            .unwrap_or_else(|| strategy_type.clone())
    };

    debug!(
        name = %name,
        strategy_type = %strategy_type,
        data_sources = data_sources.len(),
        indicators = indicators.len(),
        entries = entry_conditions.len(),
        exits = exit_conditions.len(),
        "parsed strategy"
    );

    Ok(Some(ParsedStrategy {
        name,
        strategy_type,
        config,
        data_sources,
        indicators,
        entry_conditions,
        exit_conditions,
        risk_params,
    }))
}

/// Trimmed module docstring of `code`, or an empty string.
pub fn strategy_docstring(code: &str) -> String {
    patterns()
        .map(|p| extract_docstring(p, code))
        .unwrap_or_default()
}

/// `20` → `"20x"`; text that already carries the suffix is kept as is.
pub fn leverage_label(leverage: &Leverage) -> String {
    let text = leverage.to_string();
    if text.ends_with(['x', 'X']) {
        text
    } else {
        format!("{}x", text)
    }
}

/// Values up to 1 are fractions of equity, larger ones are percentages.
pub fn position_size_label(position_size_pct: Option<f64>) -> String {
    match position_size_pct {
        Some(value) if value.is_finite() && value > 0.0 => {
            let pct = if value <= 1.0 { value * 100.0 } else { value };
            format!("{:.0}%", pct.round())
        }
        _ => DEFAULT_POSITION_SIZE.to_string(),
    }
}
