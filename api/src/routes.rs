use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Room for JSON escaping on top of the raw code limit; the exact limit is
/// enforced on the decoded code.
const BODY_OVERHEAD: usize = 4096;

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .max_code_bytes
        .saturating_mul(2)
        .saturating_add(BODY_OVERHEAD);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/strategy/parse", post(handlers::parse_code))
        .route("/api/strategy/flow", post(handlers::flow))
        .route("/api/strategies", get(handlers::list_strategies))
        .route("/api/strategies/:name", get(handlers::get_strategy))
        .route("/api/strategies/:name/report", get(handlers::strategy_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
