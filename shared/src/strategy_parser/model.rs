//! Value types produced by one parse of a strategy script.
//!
//! The JSON shape of these types is what the flow-chart UI consumes, so the
//! serde attributes here are part of the external contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leverage as written in the CONFIG literal: either a bare number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Leverage {
    Number(f64),
    Text(String),
}

impl Default for Leverage {
    fn default() -> Self {
        Leverage::Text("10".to_string())
    }
}

impl fmt::Display for Leverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leverage::Number(n) if n.fract() == 0.0 => write!(f, "{:.0}", n),
            Leverage::Number(n) => write!(f, "{}", n),
            Leverage::Text(s) => f.write_str(s),
        }
    }
}

/// Parameters pulled from the `CONFIG = { ... }` literal.
///
/// Absent string fields are empty strings, never `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub trading_symbol: String,
    pub timeframe: String,
    pub leverage: Leverage,
    pub take_profit: String,
    pub stop_loss: String,
    pub polling_mode: String,
    /// Raw `position_size_pct` value, usually a fraction such as `0.15`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_size_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Datasource,
    Indicator,
    Condition,
    Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub api: String,
    pub fields: Vec<String>,
}

impl DataSourceNode {
    pub fn new(id: &str, api: &str, fields: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            node_type: NodeType::Datasource,
            api: api.to_string(),
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    /// Display summary such as `"Period: 9, 21"`
    pub params: String,
}

impl IndicatorNode {
    pub fn new(id: &str, name: &str, params: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            node_type: NodeType::Indicator,
            name: name.to_string(),
            params: params.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    Both,
}

impl Direction {
    /// Whether a condition with this direction can follow one with `other`.
    pub fn compatible_with(self, other: Direction) -> bool {
        self == Direction::Both || other == Direction::Both || self == other
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Long => "long",
            Direction::Short => "short",
            Direction::Both => "both",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCategory {
    Entry,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Signal,
    TakeProfit,
    StopLoss,
    Reversal,
    Crossover,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerType::Signal => "signal",
            TriggerType::TakeProfit => "take profit",
            TriggerType::StopLoss => "stop loss",
            TriggerType::Reversal => "reversal",
            TriggerType::Crossover => "crossover",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub direction: Direction,
    pub category: ConditionCategory,
    pub trigger_type: TriggerType,
    pub conditions: Vec<String>,
    pub description: String,
}

impl ConditionNode {
    pub fn entry(
        id: impl Into<String>,
        direction: Direction,
        trigger_type: TriggerType,
        conditions: Vec<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Condition,
            direction,
            category: ConditionCategory::Entry,
            trigger_type,
            conditions,
            description: description.into(),
        }
    }

    pub fn exit(
        id: impl Into<String>,
        direction: Direction,
        trigger_type: TriggerType,
        conditions: Vec<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category: ConditionCategory::Exit,
            ..Self::entry(id, direction, trigger_type, conditions, description)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Buy,
    Sell,
    Hold,
}

/// Action node type understood by the diagram renderer.
///
/// No extractor produces these yet; buy/sell/hold inference is waiting on a
/// product decision about where it belongs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub action: ActionKind,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskParams {
    pub take_profit: String,
    pub stop_loss: String,
    pub leverage: String,
    pub position_size: String,
}

/// Root aggregate returned by a successful parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStrategy {
    pub name: String,
    pub strategy_type: String,
    pub config: StrategyConfig,
    pub data_sources: Vec<DataSourceNode>,
    pub indicators: Vec<IndicatorNode>,
    pub entry_conditions: Vec<ConditionNode>,
    pub exit_conditions: Vec<ConditionNode>,
    pub risk_params: RiskParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leverage_display() {
        assert_eq!(Leverage::Number(20.0).to_string(), "20");
        assert_eq!(Leverage::Number(2.5).to_string(), "2.5");
        assert_eq!(Leverage::Text("15x".to_string()).to_string(), "15x");
        assert_eq!(Leverage::default().to_string(), "10");
    }

    #[test]
    fn test_condition_node_json_shape() {
        let node = ConditionNode::exit(
            "exit-take-profit",
            Direction::Both,
            TriggerType::TakeProfit,
            vec!["PnL reaches +5%".to_string()],
            "Take profit at +5%",
        );
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "condition");
        assert_eq!(json["category"], "exit");
        assert_eq!(json["triggerType"], "take_profit");
        assert_eq!(json["direction"], "both");
    }

    #[test]
    fn test_leverage_serializes_untagged() {
        let config = StrategyConfig {
            leverage: Leverage::Number(5.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["leverage"], 5.0);
        assert!(json.get("position_size_pct").is_none());

        let text = serde_json::to_value(StrategyConfig::default()).unwrap();
        assert_eq!(text["leverage"], "10");
    }
}
