//! HTTP rendering of request errors.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::types::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed with {}: {}", status.as_u16(), self);
        } else {
            log::debug!("Request rejected with {}: {}", status.as_u16(), self);
        }
        (
            status,
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
