use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::flow::{build_flow, FlowGraph};
use shared::strategy_parser::{parse, ParseOutcome};
use shared::{loader, render_report};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FlowResponse {
    Parsed { graph: FlowGraph },
    Empty,
}

/// Body after the size check every code-carrying route applies.
fn accepted_code(
    state: &AppState,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(req) = body?;
    let limit = state.config.max_code_bytes;
    if req.code.len() > limit {
        return Err(ApiError::PayloadTooLarge { limit });
    }
    Ok(req.code)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn parse_code(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<ParseOutcome>, ApiError> {
    let code = accepted_code(&state, body)?;
    debug!(bytes = code.len(), "parse request");
    Ok(Json(parse(&code)))
}

pub async fn flow(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CodeRequest>, JsonRejection>,
) -> Result<Json<FlowResponse>, ApiError> {
    let code = accepted_code(&state, body)?;
    let response = match parse(&code).strategy() {
        Some(strategy) => FlowResponse::Parsed {
            graph: build_flow(strategy),
        },
        None => FlowResponse::Empty,
    };
    Ok(Json(response))
}

pub async fn list_strategies(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let names = loader::list_strategies(&state.config).await?;
    Ok(Json(json!({ "strategies": names })))
}

pub async fn get_strategy(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ParseOutcome>, ApiError> {
    let loaded = loader::load_strategy(&name, &state.config).await?;
    Ok(Json(parse(&loaded.code)))
}

pub async fn strategy_report(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Html<String>, ApiError> {
    let loaded = loader::load_strategy(&name, &state.config).await?;
    let outcome = parse(&loaded.code);
    let strategy = outcome
        .strategy()
        .ok_or_else(|| ApiError::NotFound(format!("strategy '{}' has nothing to report", name)))?;

    let html = render_report(strategy, &loaded.code).map_err(|e| {
        tracing::error!(error = %e, strategy = %name, "report rendering failed");
        ApiError::Internal("failed to render report".into())
    })?;
    info!("Rendered report for strategy '{}'", name);
    Ok(Html(html))
}
