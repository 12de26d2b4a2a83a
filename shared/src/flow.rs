//! Node/edge diagram of a parsed strategy, in the shape the flow-chart UI
//! renders directly.

use serde::{Deserialize, Serialize};

use crate::strategy_parser::{ConditionNode, Direction, ParsedStrategy};

pub const COLUMN_WIDTH: f64 = 280.0;
pub const ROW_HEIGHT: f64 = 140.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowNodeKind {
    Datasource,
    Indicator,
    Entry,
    Exit,
}

impl FlowNodeKind {
    fn column(self) -> usize {
        match self {
            FlowNodeKind::Datasource => 0,
            FlowNodeKind::Indicator => 1,
            FlowNodeKind::Entry => 2,
            FlowNodeKind::Exit => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    pub id: String,
    pub kind: FlowNodeKind,
    pub label: String,
    pub details: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl FlowEdge {
    fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("{}->{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn push(&mut self, kind: FlowNodeKind, id: &str, label: &str, details: Vec<String>, direction: Option<Direction>) {
        let row = self.nodes.iter().filter(|n| n.kind == kind).count();
        self.nodes.push(FlowNode {
            id: id.to_string(),
            kind,
            label: label.to_string(),
            details,
            direction,
            position: Position {
                x: kind.column() as f64 * COLUMN_WIDTH,
                y: row as f64 * ROW_HEIGHT,
            },
        });
    }

    fn push_condition(&mut self, kind: FlowNodeKind, condition: &ConditionNode) {
        self.push(
            kind,
            &condition.id,
            &condition.description,
            condition.conditions.clone(),
            Some(condition.direction),
        );
    }
}

/// Lay out a strategy as columns: data sources, indicators, entries, exits.
pub fn build_flow(strategy: &ParsedStrategy) -> FlowGraph {
    let mut graph = FlowGraph::default();

    for ds in &strategy.data_sources {
        graph.push(FlowNodeKind::Datasource, &ds.id, &ds.api, ds.fields.clone(), None);
    }
    for ind in &strategy.indicators {
        graph.push(FlowNodeKind::Indicator, &ind.id, &ind.name, vec![ind.params.clone()], None);
    }
    for entry in &strategy.entry_conditions {
        graph.push_condition(FlowNodeKind::Entry, entry);
    }
    for exit in &strategy.exit_conditions {
        graph.push_condition(FlowNodeKind::Exit, exit);
    }

    // Without indicators, data feeds the entries directly
    let data_targets: Vec<&str> = if strategy.indicators.is_empty() {
        strategy.entry_conditions.iter().map(|e| e.id.as_str()).collect()
    } else {
        strategy.indicators.iter().map(|i| i.id.as_str()).collect()
    };
    for ds in &strategy.data_sources {
        for target in &data_targets {
            graph.edges.push(FlowEdge::new(&ds.id, target));
        }
    }

    for ind in &strategy.indicators {
        for entry in &strategy.entry_conditions {
            graph.edges.push(FlowEdge::new(&ind.id, &entry.id));
        }
    }

    for entry in &strategy.entry_conditions {
        for exit in &strategy.exit_conditions {
            if entry.direction.compatible_with(exit.direction) {
                graph.edges.push(FlowEdge::new(&entry.id, &exit.id));
            }
        }
    }

    graph
}
