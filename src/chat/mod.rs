//! Account-to-account chat.
//!
//! Messages are persisted in SQLite and pushed to the live websocket
//! sessions of both participants through [`ChatHub`].

mod handlers;
mod hub;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error_handling::{ApiError, DatabaseError};

pub use handlers::{chat_users_handler, messages_handler, send_message_handler, ws_chat_handler};
pub use hub::ChatHub;

/// Failures specific to the chat endpoints.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Receiver not found")]
    ReceiverNotFound,

    #[error("Cannot send message to yourself")]
    SelfMessage,
}

impl From<DatabaseError> for ChatError {
    fn from(e: DatabaseError) -> Self {
        ChatError::Api(ApiError::from(e))
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match &self {
            ChatError::Api(api) => return api.clone().into_response(),
            ChatError::ReceiverNotFound => StatusCode::NOT_FOUND,
            ChatError::SelfMessage => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
