//! Capability endpoint.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};

use super::super::state::AppState;
use crate::error_handling::ApiError;

/// `GET /api/{capability}?<params>`
///
/// Answers `{success: true, data}`; hard failures are rendered by
/// [`ApiError`]'s response impl.
pub async fn api_handler(
    State(state): State<AppState>,
    Path(capability): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let data = state
        .dispatcher
        .dispatch(&capability, &params, &state.pool)
        .await?;
    Ok(Json(json!({ "success": true, "data": data })))
}
