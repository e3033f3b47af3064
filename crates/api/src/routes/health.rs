use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the content store database is reachable.
    pub db_healthy: bool,
    /// Active queue backend, `durable` or `memory`.
    pub queue: &'static str,
}

/// GET /health -- returns service, database, and queue health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = swipegen_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        queue: state.queue.backend(),
    })
}

/// Mount health check routes at the root level.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
