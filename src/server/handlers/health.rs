//! Health handler.

use axum::extract::State;
use axum::Json;

use super::super::state::{AppState, HealthResponse};

/// Liveness plus the dispatchable capabilities and service counters
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        capabilities: state.dispatcher.dispatchable(),
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        live_chat_sessions: state.hub.session_count(),
        stats: state.stats.snapshot(),
    })
}
