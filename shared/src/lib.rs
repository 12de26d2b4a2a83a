pub mod config;
pub mod flow;
pub mod loader;
pub mod logging;
pub mod report;
pub mod strategy_parser;

pub use config::Config;
pub use flow::{build_flow, FlowEdge, FlowGraph, FlowNode};
pub use loader::{load_strategy, LoadedStrategy, LoaderError};
pub use logging::init_logging;
pub use report::{render_report, StrategyReportTemplate};
pub use strategy_parser::{parse, parse_strategy_code, ParseOutcome, ParsedStrategy};
