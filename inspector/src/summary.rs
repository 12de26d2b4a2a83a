use std::fmt::Write;

use shared::strategy_parser::{ConditionNode, ParsedStrategy};

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn write_conditions(out: &mut String, title: &str, conditions: &[ConditionNode]) {
    let _ = writeln!(out, "\n{}:", title);
    if conditions.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for c in conditions {
        let _ = writeln!(out, "  - [{} / {}] {}", c.direction, c.trigger_type, c.description);
        for line in &c.conditions {
            if line != &c.description {
                let _ = writeln!(out, "      * {}", line);
            }
        }
    }
}

/// Plain-text rendering for terminals.
pub fn render_summary(strategy: &ParsedStrategy) -> String {
    let mut out = String::new();
    let config = &strategy.config;
    let risk = &strategy.risk_params;

    let _ = writeln!(out, "{}  [{}]", strategy.name, strategy.strategy_type);
    let _ = writeln!(
        out,
        "Symbol: {} | Timeframe: {} | Polling: {}",
        or_dash(&config.trading_symbol),
        or_dash(&config.timeframe),
        or_dash(&config.polling_mode)
    );
    let _ = writeln!(
        out,
        "Risk: TP {} | SL {} | Leverage {} | Size {}",
        or_dash(&risk.take_profit),
        or_dash(&risk.stop_loss),
        risk.leverage,
        risk.position_size
    );

    let _ = writeln!(out, "\nData sources:");
    for ds in &strategy.data_sources {
        let _ = writeln!(out, "  - {} ({})", ds.api, ds.fields.join(", "));
    }

    let _ = writeln!(out, "\nIndicators:");
    if strategy.indicators.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for ind in &strategy.indicators {
        let _ = writeln!(out, "  - {}: {}", ind.name, ind.params);
    }

    write_conditions(&mut out, "Entry conditions", &strategy.entry_conditions);
    write_conditions(&mut out, "Exit conditions", &strategy.exit_conditions);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::strategy_parser::parse_strategy_code;

    #[test]
    fn test_summary_sections() {
        let code = "CONFIG = {\"name\": \"Dip\", \"timeframe\": \"4h\", \"stop_loss\": \"-3%\"}\nif rsi < 30:\n    buy()";
        let text = render_summary(&parse_strategy_code(code).unwrap());

        assert!(text.starts_with("Dip  [Custom Strategy]\n"));
        assert!(text.contains("Timeframe: 4h"));
        assert!(text.contains("Risk: TP - | SL -3% | Leverage 10x | Size 10%"));
        assert!(text.contains("  - Exchange API (Price, Volume)"));
        assert!(text.contains("  - RSI: Period: 14, Oversold: 30"));
        assert!(text.contains("Entry conditions:\n  (none)"));
        assert!(text.contains("  - [both / stop loss] Stop loss at -3%"));
    }
}
