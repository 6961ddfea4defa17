//! Liveness endpoint
//!
//! Answers `200 OK` on every path so hosting platforms see the process as alive.

use axum::{routing::get, Router};
use streak_common::{AppError, AppResult, ServerConfig};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the health router
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .fallback(health_check)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Bind the configured address and serve until the task is dropped
pub async fn run_server(config: &ServerConfig) -> AppResult<()> {
    let addr = config.address();

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener).await
}

/// Serve the health router on an already bound listener
pub async fn serve(listener: TcpListener) -> AppResult<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Health server listening on http://{}", addr);
    }

    axum::serve(listener, create_router())
        .await
        .map_err(|e| AppError::Server(format!("Server error: {e}")))
}
