//! Coarse strategy category from keyword matching.

use super::rules::{first_match, Rule};
use super::source::Source;

pub const CUSTOM_STRATEGY: &str = "Custom Strategy";

/// More specific categories come first: VCP must win over the generic
/// breakout rule, Fibonacci over anything that merely crosses averages.
const TYPE_RULES: &[Rule<Source, &str>] = &[
    Rule { name: "fibonacci", applies: is_fibonacci, extract: |_| "Fibonacci Retracement" },
    Rule { name: "vcp", applies: is_vcp, extract: |_| "VCP Breakout" },
    Rule { name: "ma_crossover", applies: is_ma_crossover, extract: |_| "MA Crossover" },
    Rule { name: "grid", applies: is_grid, extract: |_| "Grid Trading" },
    Rule { name: "mean_reversion", applies: is_mean_reversion, extract: |_| "Mean Reversion" },
    Rule { name: "rsi_reversal", applies: is_rsi_reversal, extract: |_| "RSI Reversal" },
    Rule { name: "momentum", applies: is_momentum, extract: |_| "Momentum" },
    Rule { name: "breakout", applies: is_breakout, extract: |_| "Breakout" },
    Rule { name: "dca", applies: is_dca, extract: |_| "DCA" },
];

fn is_fibonacci(src: &Source) -> bool {
    src.contains_any(&["fibonacci", "fib_level"])
}

fn is_vcp(src: &Source) -> bool {
    src.contains_any(&["vcp", "volatility contraction"])
}

fn is_ma_crossover(src: &Source) -> bool {
    let ma_keyword = src.contains_any(&["sma", "ema", "moving average", "moving_average"])
        || !src.ma_periods().is_empty();
    ma_keyword && src.contains("cross")
}

fn is_grid(src: &Source) -> bool {
    src.contains("grid")
}

fn is_mean_reversion(src: &Source) -> bool {
    src.contains_any(&["mean reversion", "mean_reversion"])
}

fn is_rsi_reversal(src: &Source) -> bool {
    src.contains("rsi") && src.contains_any(&["oversold", "overbought"])
}

fn is_momentum(src: &Source) -> bool {
    src.contains("momentum")
}

fn is_breakout(src: &Source) -> bool {
    src.contains("breakout")
}

fn is_dca(src: &Source) -> bool {
    src.contains_any(&["dca", "dollar cost"])
}

pub(crate) fn infer_strategy_type(src: &Source) -> String {
    first_match(TYPE_RULES, src)
        .unwrap_or(CUSTOM_STRATEGY)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy_parser::patterns::patterns;

    fn infer(code: &str) -> String {
        infer_strategy_type(&Source::new(code, patterns().unwrap()))
    }

    #[test]
    fn test_specific_before_generic() {
        assert_eq!(infer("# VCP breakout on contraction"), "VCP Breakout");
        assert_eq!(infer("# simple breakout of the daily range"), "Breakout");
        assert_eq!(infer("fib_levels = [0.618]  # breakout confirm"), "Fibonacci Retracement");
    }

    #[test]
    fn test_ma_crossover_needs_both_keywords() {
        assert_eq!(infer("if ma5_above_ma10 and crossed:"), "MA Crossover");
        assert_eq!(infer("ema_fast = ema(close, 12)"), CUSTOM_STRATEGY);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(infer("MOMENTUM_THRESHOLD = 2.0"), "Momentum");
        assert_eq!(infer("# RSI oversold bounce"), "RSI Reversal");
    }

    #[test]
    fn test_fallback() {
        assert_eq!(infer("print('hello')"), CUSTOM_STRATEGY);
        assert_eq!(infer(""), CUSTOM_STRATEGY);
    }
}
