//! Exit conditions: profit target, stop loss, then pattern-specific exits.

use super::model::{ConditionNode, Direction, StrategyConfig, TriggerType};
use super::rules::{all_matches, Rule};
use super::source::Source;

/// Shown when the code manages a threshold it computes at runtime.
pub const DYNAMIC: &str = "Dynamic";

const FIB_BREAK_KEYWORDS: &[&str] = &[
    "breaks below",
    "break_below",
    "broke_below",
    "breakdown",
    "fib_break",
    "level_break",
    "below_fib",
    "fib_stop",
];

const CONTRACTION_STOP_KEYWORDS: &[&str] = &["stop", "zone", "range_low"];

const REVERSAL_KEYWORDS: &[&str] = &[
    "reverse",
    "reversal",
    "close_long",
    "close_short",
    "opposite_signal",
    "opposite signal",
    "exit_on_signal",
];

const EXIT_RULES: &[Rule<Source, ConditionNode>] = &[
    Rule {
        name: "fibonacci_break",
        applies: |src| src.uses_fibonacci() && src.contains_any(FIB_BREAK_KEYWORDS),
        extract: |_| {
            ConditionNode::exit(
                "exit-fibonacci-break",
                Direction::Both,
                TriggerType::StopLoss,
                vec!["Price breaks through the next Fibonacci level".to_string()],
                "Stop when the retracement level fails",
            )
        },
    },
    Rule {
        name: "contraction_stop",
        applies: |src| src.contains("contraction") && src.contains_any(CONTRACTION_STOP_KEYWORDS),
        extract: |_| {
            ConditionNode::exit(
                "exit-contraction-stop",
                Direction::Both,
                TriggerType::StopLoss,
                vec!["Price falls back into the contraction zone".to_string()],
                "Stop below the contraction range",
            )
        },
    },
    Rule {
        name: "reversal",
        applies: |src| src.contains_any(REVERSAL_KEYWORDS),
        extract: |_| {
            ConditionNode::exit(
                "exit-reversal",
                Direction::Both,
                TriggerType::Reversal,
                vec!["Opposite entry signal appears".to_string()],
                "Close on signal reversal",
            )
        },
    },
];

/// Configured profit target, else [`DYNAMIC`] when the code checks PnL
/// against a computed value.
pub(crate) fn take_profit_level(config: &StrategyConfig, src: &Source) -> Option<String> {
    if !config.take_profit.is_empty() {
        return Some(config.take_profit.clone());
    }
    src.patterns
        .pnl_take_profit_any
        .is_match(&src.raw)
        .then(|| DYNAMIC.to_string())
}

pub(crate) fn stop_loss_level(config: &StrategyConfig, src: &Source) -> Option<String> {
    if !config.stop_loss.is_empty() {
        return Some(config.stop_loss.clone());
    }
    src.patterns
        .pnl_stop_loss_any
        .is_match(&src.raw)
        .then(|| DYNAMIC.to_string())
}

fn take_profit(level: &str) -> ConditionNode {
    let (condition, description) = if level == DYNAMIC {
        ("PnL reaches the dynamic target".to_string(), "Dynamic take profit".to_string())
    } else {
        (format!("PnL >= {}", level), format!("Take profit at {}", level))
    };
    ConditionNode::exit(
        "exit-take-profit",
        Direction::Both,
        TriggerType::TakeProfit,
        vec![condition],
        description,
    )
}

fn stop_loss(level: &str) -> ConditionNode {
    let (condition, description) = if level == DYNAMIC {
        ("PnL falls to the dynamic stop".to_string(), "Dynamic stop loss".to_string())
    } else {
        (format!("PnL <= {}", level), format!("Stop loss at {}", level))
    };
    ConditionNode::exit(
        "exit-stop-loss",
        Direction::Both,
        TriggerType::StopLoss,
        vec![condition],
        description,
    )
}

pub(crate) fn extract_exit_conditions(config: &StrategyConfig, src: &Source) -> Vec<ConditionNode> {
    let mut exits = Vec::new();
    if let Some(level) = take_profit_level(config, src) {
        exits.push(take_profit(&level));
    }
    if let Some(level) = stop_loss_level(config, src) {
        exits.push(stop_loss(&level));
    }
    exits.extend(all_matches(EXIT_RULES, src));
    exits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy_parser::patterns::patterns;

    fn extract(config: &StrategyConfig, code: &str) -> Vec<ConditionNode> {
        extract_exit_conditions(config, &Source::new(code, patterns().unwrap()))
    }

    fn ids(conditions: &[ConditionNode]) -> Vec<&str> {
        conditions.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_configured_thresholds() {
        let config = StrategyConfig {
            take_profit: "+5%".to_string(),
            stop_loss: "-2%".to_string(),
            ..Default::default()
        };
        let exits = extract(&config, "print('no exits in code')");
        assert_eq!(ids(&exits), vec!["exit-take-profit", "exit-stop-loss"]);
        assert_eq!(exits[0].conditions, vec!["PnL >= +5%"]);
        assert_eq!(exits[1].description, "Stop loss at -2%");
        assert!(exits.iter().all(|e| e.direction == Direction::Both));
    }

    #[test]
    fn test_dynamic_thresholds() {
        let code = "if pnl_pct >= target:\n    close()\nif pnl_pct <= -risk:\n    close()";
        let exits = extract(&StrategyConfig::default(), code);
        assert_eq!(exits[0].description, "Dynamic take profit");
        assert_eq!(exits[1].description, "Dynamic stop loss");
    }

    #[test]
    fn test_no_thresholds() {
        assert!(extract(&StrategyConfig::default(), "x = 1").is_empty());
    }

    #[test]
    fn test_pattern_exits_in_order() {
        let code = r#"
fib_levels = [0.382, 0.618]
if price_breaks_below_fib:
    fib_stop = True
contraction_low = lows.min()
if price < contraction_low:
    stop()
if momentum_reversal:
    close_long()
"#;
        let exits = extract(&StrategyConfig::default(), code);
        assert_eq!(
            ids(&exits),
            vec!["exit-fibonacci-break", "exit-contraction-stop", "exit-reversal"]
        );
        assert_eq!(exits[2].trigger_type, TriggerType::Reversal);
    }
}
