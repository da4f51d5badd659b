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
    /// Number of live (non-expired) tasks in the store.
    pub live_tasks: usize,
}

/// GET /health -- liveness probe.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let live_tasks = state.query.list_jobs().await.len();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        live_tasks,
    })
}

/// Mount the health check route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
