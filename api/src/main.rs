mod error;
mod handlers;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::{init_logging, Config};
use tracing::info;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(&config);

    info!("Starting strategy visualizer API...");
    info!(
        strategies = %config.strategies_path.display(),
        presets = %config.presets_path.display(),
        max_code_bytes = config.max_code_bytes,
        "Strategy sources configured"
    );

    let addr = config.api_bind_addr.clone();
    let app = routes::router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
