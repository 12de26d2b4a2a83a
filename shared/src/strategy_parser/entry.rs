//! Entry conditions.
//!
//! Two phases, in strict priority: the author's "Entry Logic:" docstring
//! section, and only when that yields nothing, heuristics over the code.

use std::collections::BTreeSet;

use tracing::debug;

use super::model::{ConditionNode, Direction, TriggerType};
use super::patterns::capture;
use super::rules::{all_matches, Rule};
use super::source::Source;

const ENTRY_HEADING: &str = "entry logic:";
const BULLETS: &[&str] = &["- ", "* ", "• "];
const MIN_LINE_CHARS: usize = 5;

const CROSSOVER_KEYWORDS: &[&str] = &[
    "crossover",
    "crossed_above",
    "crossed_below",
    "cross_above",
    "cross_below",
    "golden_cross",
    "death_cross",
];

const CODE_RULES: &[Rule<Source, Vec<ConditionNode>>] = &[
    Rule { name: "ma_crossover", applies: has_crossover, extract: crossover },
    Rule { name: "fibonacci_level", applies: Source::uses_fibonacci, extract: fibonacci_level },
    Rule { name: "vcp_breakout", applies: has_vcp, extract: vcp_breakout },
    Rule { name: "momentum_threshold", applies: has_momentum_threshold, extract: momentum_threshold },
];

pub(crate) fn extract_entry_conditions(docstring: &str, src: &Source) -> Vec<ConditionNode> {
    let documented = from_docstring(docstring);
    if !documented.is_empty() {
        debug!(count = documented.len(), "entry conditions taken from docstring");
        return documented;
    }
    from_code(src)
}

/// Conditions authored in the docstring's "Entry Logic:" section.
pub(crate) fn from_docstring(docstring: &str) -> Vec<ConditionNode> {
    entry_logic_lines(docstring)
        .into_iter()
        .map(strip_bullet)
        .filter(|text| text.chars().count() > MIN_LINE_CHARS)
        .filter_map(|text| classify(text).map(|direction| (direction, text)))
        .enumerate()
        .map(|(i, (direction, text))| {
            ConditionNode::entry(
                format!("entry-doc-{}", i + 1),
                direction,
                TriggerType::Signal,
                vec![text.to_string()],
                text,
            )
        })
        .collect()
}

/// Conditions inferred from code patterns; every matching rule contributes.
pub(crate) fn from_code(src: &Source) -> Vec<ConditionNode> {
    all_matches(CODE_RULES, src).into_iter().flatten().collect()
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_bullet(trimmed: &str) -> bool {
    BULLETS.iter().any(|bullet| trimmed.starts_with(bullet))
}

/// Lines after the heading up to the next heading at the same or a lower
/// indentation. Text following the heading on its own line counts too.
fn entry_logic_lines(docstring: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut heading_indent = None;

    for line in docstring.lines() {
        match heading_indent {
            None => {
                if let Some(pos) = line.to_ascii_lowercase().find(ENTRY_HEADING) {
                    heading_indent = Some(indent(line));
                    let rest = line[pos + ENTRY_HEADING.len()..].trim();
                    if !rest.is_empty() {
                        lines.push(rest);
                    }
                }
            }
            Some(base) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if indent(line) <= base && trimmed.ends_with(':') && !is_bullet(trimmed) {
                    break;
                }
                lines.push(trimmed);
            }
        }
    }
    lines
}

fn strip_bullet(line: &str) -> &str {
    BULLETS
        .iter()
        .find_map(|bullet| line.strip_prefix(bullet))
        .map(str::trim)
        .unwrap_or(line)
}

fn classify(text: &str) -> Option<Direction> {
    let lower = text.to_lowercase();
    if lower.contains("long") || lower.contains("buy") {
        Some(Direction::Long)
    } else if lower.contains("short") || lower.contains("sell") {
        Some(Direction::Short)
    } else {
        None
    }
}

fn has_crossover(src: &Source) -> bool {
    src.patterns.ma_cross_pair.is_match(&src.raw) || src.contains_any(CROSSOVER_KEYWORDS)
}

/// Fast and slow average labels, from an explicit `ma5_above_ma10` style
/// name when present, else from the extreme periods seen in the code.
fn crossover_pair(src: &Source) -> (String, String) {
    if let Some(caps) = src.patterns.ma_cross_pair.captures(&src.raw) {
        return (format!("MA{}", &caps[1]), format!("MA{}", &caps[3]));
    }
    let periods: BTreeSet<u32> = src.ma_periods().into_iter().chain(src.ema_periods()).collect();
    match (periods.first(), periods.last()) {
        (Some(fast), Some(slow)) if fast != slow => (format!("MA{}", fast), format!("MA{}", slow)),
        _ => ("Fast MA".to_string(), "Slow MA".to_string()),
    }
}

fn crossover(src: &Source) -> Vec<ConditionNode> {
    let (fast, slow) = crossover_pair(src);
    vec![
        ConditionNode::entry(
            "entry-crossover-long",
            Direction::Long,
            TriggerType::Crossover,
            vec![format!("{} crosses above {}", fast, slow)],
            "Bullish moving average crossover",
        ),
        ConditionNode::entry(
            "entry-crossover-short",
            Direction::Short,
            TriggerType::Crossover,
            vec![format!("{} crosses below {}", fast, slow)],
            "Bearish moving average crossover",
        ),
    ]
}

fn fibonacci_level(src: &Source) -> Vec<ConditionNode> {
    let levels = src.fibonacci_levels();
    let mut conditions = vec![if levels.is_empty() {
        "Price retraces to a Fibonacci level".to_string()
    } else {
        format!("Price retraces to {}", levels.join(" / "))
    }];
    // Confirmations only when the code evaluates them on its own
    if src.uses_rsi() {
        conditions.push("RSI confirms the reversal".to_string());
    }
    if src.uses_volume() {
        conditions.push("Volume confirms the move".to_string());
    }
    vec![ConditionNode::entry(
        "entry-fibonacci",
        Direction::Both,
        TriggerType::Signal,
        conditions,
        "Entry at a Fibonacci retracement level",
    )]
}

fn has_vcp(src: &Source) -> bool {
    src.contains("vcp") || (src.uses_contraction() && src.contains("breakout"))
}

fn vcp_breakout(src: &Source) -> Vec<ConditionNode> {
    let mut conditions = vec!["Price breaks above the contraction range high".to_string()];
    if src.uses_volume() {
        conditions.push("Volume expands on the breakout".to_string());
    }
    vec![ConditionNode::entry(
        "entry-vcp-breakout",
        Direction::Long,
        TriggerType::Signal,
        conditions,
        "Volatility contraction breakout",
    )]
}

fn has_momentum_threshold(src: &Source) -> bool {
    let p = src.patterns;
    p.momentum_long.is_match(&src.raw) || p.momentum_short.is_match(&src.raw)
}

fn momentum_threshold(src: &Source) -> Vec<ConditionNode> {
    let p = src.patterns;
    let mut conditions = Vec::new();
    if let Some(threshold) = capture(&p.momentum_long, &src.raw) {
        conditions.push(ConditionNode::entry(
            "entry-momentum-long",
            Direction::Long,
            TriggerType::Signal,
            vec![format!("Momentum > {}", threshold)],
            "Momentum above threshold",
        ));
    }
    if let Some(threshold) = capture(&p.momentum_short, &src.raw) {
        conditions.push(ConditionNode::entry(
            "entry-momentum-short",
            Direction::Short,
            TriggerType::Signal,
            vec![format!("Momentum < -{}", threshold)],
            "Momentum below negative threshold",
        ));
    }
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy_parser::patterns::patterns;

    fn ids(conditions: &[ConditionNode]) -> Vec<&str> {
        conditions.iter().map(|c| c.id.as_str()).collect()
    }

    fn from_source(code: &str) -> Vec<ConditionNode> {
        from_code(&Source::new(code, patterns().unwrap()))
    }

    const DOC: &str = "Golden Cross\n\nEntry Logic:\n- Go LONG when MA5 crosses above MA10\n- Go short when MA5 crosses below MA10\n- n/a\n- Wait for the close\n\nExit Logic:\n- Sell at +5%";

    #[test]
    fn test_docstring_section() {
        let conditions = from_docstring(DOC);
        assert_eq!(ids(&conditions), vec!["entry-doc-1", "entry-doc-2"]);
        assert_eq!(conditions[0].direction, Direction::Long);
        assert_eq!(conditions[1].direction, Direction::Short);
        assert_eq!(conditions[0].conditions, vec!["Go LONG when MA5 crosses above MA10"]);
        assert_eq!(conditions[0].trigger_type, TriggerType::Signal);
    }

    #[test]
    fn test_section_stops_at_next_heading() {
        // "Sell at +5%" belongs to Exit Logic and must not become a short entry
        let conditions = from_docstring(DOC);
        assert!(conditions.iter().all(|c| !c.description.contains("+5%")));
    }

    #[test]
    fn test_indented_docstring_and_inline_text() {
        let doc = "Bot\n    Entry Logic: buy the dip below 0.618\n        * sell rallies into resistance\n    Risk:\n        - long leverage";
        let conditions = from_docstring(doc);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].conditions, vec!["buy the dip below 0.618"]);
        assert_eq!(conditions[1].direction, Direction::Short);
    }

    #[test]
    fn test_no_section() {
        assert!(from_docstring("Just a description with long words").is_empty());
    }

    #[test]
    fn test_crossover_pair_from_name() {
        let conditions = from_source("if ma5_above_ma10 and not prev_ma5_above_ma10:\n    open_long()");
        assert_eq!(ids(&conditions), vec!["entry-crossover-long", "entry-crossover-short"]);
        assert_eq!(conditions[0].conditions, vec!["MA5 crosses above MA10"]);
        assert_eq!(conditions[1].conditions, vec!["MA5 crosses below MA10"]);
        assert_eq!(conditions[0].trigger_type, TriggerType::Crossover);
    }

    #[test]
    fn test_crossover_pair_from_periods() {
        let conditions = from_source("sma9 = f(9)\nsma21 = f(21)\nif golden_cross(sma9, sma21): go()");
        assert_eq!(conditions[0].conditions, vec!["MA9 crosses above MA21"]);
    }

    #[test]
    fn test_fibonacci_confirmations_need_evidence() {
        let bare = from_source("levels = [0.382, 0.618]\n# rsi and volume would help");
        assert_eq!(bare.len(), 1);
        assert_eq!(bare[0].conditions, vec!["Price retraces to 38.2% / 61.8%"]);

        let confirmed = from_source("levels = [0.618]\nif rsi < 35 and volume > avg_volume:\n    buy()");
        assert_eq!(
            confirmed[0].conditions,
            vec![
                "Price retraces to 61.8%",
                "RSI confirms the reversal",
                "Volume confirms the move",
            ]
        );
    }

    #[test]
    fn test_vcp_and_momentum() {
        let conditions = from_source(
            "# VCP setup\ncontraction = highs.max() - lows.min()\nif momentum > 1.5: long()\nif momentum < -1.5: short()",
        );
        assert_eq!(
            ids(&conditions),
            vec!["entry-vcp-breakout", "entry-momentum-long", "entry-momentum-short"]
        );
        assert_eq!(conditions[2].conditions, vec!["Momentum < -1.5"]);
    }

    #[test]
    fn test_docstring_suppresses_code_rules() {
        let code = format!("\"\"\"{}\"\"\"\nif ma5_above_ma10:\n    pass", DOC);
        let src = Source::new(&code, patterns().unwrap());
        let conditions = extract_entry_conditions(DOC, &src);
        assert_eq!(ids(&conditions), vec!["entry-doc-1", "entry-doc-2"]);
    }
}
