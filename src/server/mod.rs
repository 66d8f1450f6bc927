//! HTTP server.
//!
//! Routes:
//! - `GET /api/{capability}` - registry-gated capability dispatch
//! - `POST /api/send-message`, `GET /api/messages`, `GET /api/chat-users` - chat
//! - `GET /ws/chat` - live chat websocket
//! - `GET /health` - liveness, capabilities and counters

mod handlers;
mod state;

use std::any::Any;

use anyhow::{Context, Result};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;

use crate::chat::{chat_users_handler, messages_handler, send_message_handler, ws_chat_handler};
use crate::config::ServeConfig;
use crate::error_handling::ApiError;
use handlers::{api_handler, health_handler};

pub use state::{AppState, HealthResponse};

/// Renders a panic inside a handler or capability as a 500 envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    log::error!("Handler panicked: {detail}");
    ApiError::InternalFault("internal error".to_string()).into_response()
}

/// Builds the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/send-message", post(send_message_handler))
        .route("/api/messages", get(messages_handler))
        .route("/api/chat-users", get(chat_users_handler))
        .route("/api/:capability", get(api_handler))
        .route("/ws/chat", get(ws_chat_handler))
        .route("/health", get(health_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// Serves `state` on an already bound listener until the process ends.
///
/// # Errors
///
/// Returns an error if the server stops with an I/O failure.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    log::info!("Listening on http://{addr}/");
    log::info!("  - Capabilities: http://{addr}/api/{{name}}");
    log::info!("  - Health: http://{addr}/health");

    axum::serve(listener, router(state))
        .await
        .context("Server error")
}

/// Builds the application from `config` and serves it.
///
/// # Errors
///
/// Returns an error if initialization fails or the address cannot be bound.
pub async fn run_server(config: ServeConfig) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    serve(listener, state).await
}
