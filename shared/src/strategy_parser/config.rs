//! Extraction of the `CONFIG = { ... }` dict literal.

use tracing::debug;

use super::error::ParseError;
use super::model::{Leverage, StrategyConfig};
use super::patterns::{capture, Patterns};
use super::source::Source;

/// Body of the `CONFIG` dict, between its outer braces.
///
/// Braces inside string literals and comments are ignored. An unbalanced
/// literal is treated as absent.
pub(crate) fn config_block<'s>(patterns: &Patterns, code: &'s str) -> Option<&'s str> {
    let start = patterns.config_start.find(code)?.end();
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_comment = false;

    for (offset, c) in code[start..].char_indices() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '#' => in_comment = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&code[start..start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn text_field(p: &Patterns, key: &'static str, body: &str) -> Result<Option<String>, ParseError> {
    Ok(p.field(key)?.text_value(body).filter(|v| !v.is_empty()))
}

fn number_field(p: &Patterns, key: &'static str, body: &str) -> Result<Option<f64>, ParseError> {
    p.field(key)?
        .number_value(body)
        .map(|raw| {
            raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                field: key,
                value: raw.to_string(),
            })
        })
        .transpose()
}

/// Numeric threshold literal rendered as a signed percentage.
fn signed_pct(p: &Patterns, key: &'static str, body: &str, sign: char) -> Result<Option<String>, ParseError> {
    Ok(p.field(key)?.number_value(body).map(|raw| {
        format!("{}{}%", sign, raw.trim_start_matches(['+', '-']))
    }))
}

fn threshold(p: &Patterns, keys: [&'static str; 2], body: &str, sign: char) -> Result<String, ParseError> {
    for key in keys {
        if let Some(value) = text_field(p, key, body)? {
            return Ok(value);
        }
        if let Some(value) = signed_pct(p, key, body, sign)? {
            return Ok(value);
        }
    }
    Ok(String::new())
}

fn read_block(p: &Patterns, body: &str) -> Result<StrategyConfig, ParseError> {
    let name = text_field(p, "name", body)?.unwrap_or_default();

    let trading_symbol = match text_field(p, "trading_symbol", body)? {
        Some(symbol) => symbol,
        None => text_field(p, "symbol", body)?.unwrap_or_default(),
    };

    let timeframe = match text_field(p, "timeframe", body)? {
        Some(tf) => tf,
        None => p.field("timeframes")?.list_values(body).join(", "),
    };

    let leverage = match number_field(p, "leverage", body)? {
        Some(n) => Leverage::Number(n),
        None => text_field(p, "leverage", body)?
            .map(Leverage::Text)
            .unwrap_or_default(),
    };

    Ok(StrategyConfig {
        name,
        trading_symbol,
        timeframe,
        leverage,
        take_profit: threshold(p, ["take_profit", "take_profit_pct"], body, '+')?,
        stop_loss: threshold(p, ["stop_loss", "stop_loss_pct"], body, '-')?,
        polling_mode: text_field(p, "polling_mode", body)?.unwrap_or_default(),
        position_size_pct: number_field(p, "position_size_pct", body)?,
    })
}

pub(crate) fn extract_config(src: &Source) -> Result<StrategyConfig, ParseError> {
    let p = src.patterns;
    let mut config = match config_block(p, &src.raw) {
        Some(body) => read_block(p, body)?,
        None => {
            debug!("no CONFIG literal found");
            StrategyConfig::default()
        }
    };

    // Thresholds written inline, e.g. `if pnl_pct >= 4.0:`
    if config.take_profit.is_empty() {
        if let Some(value) = capture(&p.pnl_take_profit, &src.raw) {
            config.take_profit = format!("+{}%", value);
        }
    }
    if config.stop_loss.is_empty() {
        if let Some(value) = capture(&p.pnl_stop_loss, &src.raw) {
            config.stop_loss = format!("-{}%", value);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy_parser::patterns::patterns;

    fn extract(code: &str) -> StrategyConfig {
        extract_config(&Source::new(code, patterns().unwrap())).unwrap()
    }

    const FULL: &str = r#"
CONFIG = {
    "name": "BTC Golden Cross",
    "trading_symbol": "BTCUSDT",
    "timeframe": "1h",
    "leverage": 20,
    "take_profit": "+5%",
    "stop_loss": "-2%",
    "polling_mode": "interval",
    "position_size_pct": 0.15,
    "meta": {"tags": ["trend", "{not a brace}"]},  # comment with } brace
}

def run():
    if pnl_pct >= 3.0:
        close()
"#;

    #[test]
    fn test_full_config() {
        let config = extract(FULL);
        assert_eq!(config.name, "BTC Golden Cross");
        assert_eq!(config.trading_symbol, "BTCUSDT");
        assert_eq!(config.timeframe, "1h");
        assert_eq!(config.leverage, Leverage::Number(20.0));
        assert_eq!(config.take_profit, "+5%");
        assert_eq!(config.stop_loss, "-2%");
        assert_eq!(config.polling_mode, "interval");
        assert_eq!(config.position_size_pct, Some(0.15));
    }

    #[test]
    fn test_block_stops_at_matching_brace() {
        let body = config_block(patterns().unwrap(), FULL).unwrap();
        assert!(body.contains("\"meta\""));
        assert!(!body.contains("def run"));
    }

    #[test]
    fn test_inline_thresholds_when_config_is_silent() {
        let config = extract("CONFIG = {}\nif pnl_pct >= 4.0: tp()\nif pnl_pct <= -2.5: sl()");
        assert_eq!(config.take_profit, "+4.0%");
        assert_eq!(config.stop_loss, "-2.5%");
        assert_eq!(config.name, "");
    }

    #[test]
    fn test_timeframes_array_and_symbol_fallback() {
        let config = extract("CONFIG = {\n    'symbol': 'ETHUSDT',\n    'timeframes': ['15m', '1h', '4h'],\n}");
        assert_eq!(config.trading_symbol, "ETHUSDT");
        assert_eq!(config.timeframe, "15m, 1h, 4h");
    }

    #[test]
    fn test_numeric_thresholds_and_string_leverage() {
        let config = extract("CONFIG = {\n \"leverage\": \"15x\",\n \"take_profit_pct\": 6,\n \"stop_loss\": -3.5,\n}");
        assert_eq!(config.leverage, Leverage::Text("15x".to_string()));
        assert_eq!(config.take_profit, "+6%");
        assert_eq!(config.stop_loss, "-3.5%");
    }

    #[test]
    fn test_defaults_without_config() {
        let config = extract("print('hello')");
        assert_eq!(config, StrategyConfig::default());
        assert_eq!(config.leverage.to_string(), "10");
    }

    #[test]
    fn test_unbalanced_config_is_ignored() {
        let config = extract("CONFIG = {\n    \"name\": \"Broken\",\n");
        assert_eq!(config.name, "");
    }
}
