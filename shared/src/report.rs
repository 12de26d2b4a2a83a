use askama::Template;
use chrono::Utc;
use pulldown_cmark::{html, Event, Options, Parser};

use crate::strategy_parser::{
    strategy_docstring, ConditionNode, DataSourceNode, IndicatorNode, ParsedStrategy, RiskParams,
};

/// Convert markdown text to HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);

    // Raw HTML in a strategy docstring is shown as text, never passed through
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

#[derive(Template)]
#[template(path = "strategy_report.html.jinja", escape = "html")]
pub struct StrategyReportTemplate {
    pub name: String,
    pub strategy_type: String,
    pub generated_at: String,
    pub risk: RiskParams,
    pub config_rows: Vec<(String, String)>,
    pub data_sources: Vec<DataSourceNode>,
    pub indicators: Vec<IndicatorNode>,
    pub entry_conditions: Vec<ConditionNode>,
    pub exit_conditions: Vec<ConditionNode>,
    /// Rendered by pulldown-cmark, inserted unescaped
    pub docstring_html: Option<String>,
}

impl StrategyReportTemplate {
    pub fn new(strategy: &ParsedStrategy, code: &str) -> Self {
        let config = &strategy.config;
        let config_rows = [
            ("Name", config.name.clone()),
            ("Symbol", config.trading_symbol.clone()),
            ("Timeframe", config.timeframe.clone()),
            ("Leverage", config.leverage.to_string()),
            ("Take profit", config.take_profit.clone()),
            ("Stop loss", config.stop_loss.clone()),
            ("Polling mode", config.polling_mode.clone()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.to_string(), value))
        .collect();

        let docstring = strategy_docstring(code);
        let docstring_html = (!docstring.is_empty()).then(|| markdown_to_html(&docstring));

        Self {
            name: strategy.name.clone(),
            strategy_type: strategy.strategy_type.clone(),
            generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            risk: strategy.risk_params.clone(),
            config_rows,
            data_sources: strategy.data_sources.clone(),
            indicators: strategy.indicators.clone(),
            entry_conditions: strategy.entry_conditions.clone(),
            exit_conditions: strategy.exit_conditions.clone(),
            docstring_html,
        }
    }
}

pub fn render_report(strategy: &ParsedStrategy, code: &str) -> Result<String, askama::Error> {
    StrategyReportTemplate::new(strategy, code).render()
}
