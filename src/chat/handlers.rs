//! Chat HTTP and websocket handlers.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ChatError;
use crate::auth::require_account;
use crate::config::CHAT_HISTORY_LIMIT;
use crate::error_handling::ApiError;
use crate::server::AppState;
use crate::storage::{
    chat_partners, find_by_email, format_timestamp, insert_message, recent_messages,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageForm {
    pub receiver_email: String,
    pub message: String,
    pub apikey: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub apikey: Option<String>,
    pub chat_with: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub apikey: Option<String>,
}

/// `POST /api/send-message`
pub async fn send_message_handler(
    State(state): State<AppState>,
    Form(form): Form<SendMessageForm>,
) -> Result<Json<Value>, ChatError> {
    let mut conn = state.pool.acquire().await.map_err(ApiError::from)?;
    let sender = require_account(&mut conn, Some(&form.apikey)).await?;
    let receiver = find_by_email(&mut conn, &form.receiver_email)
        .await?
        .ok_or(ChatError::ReceiverNotFound)?;
    if receiver.id == sender.id {
        return Err(ChatError::SelfMessage);
    }

    let stored = insert_message(&mut conn, sender.id, receiver.id, &form.message).await?;
    let message = json!({
        "id": stored.id,
        "senderEmail": sender.email,
        "receiverEmail": receiver.email,
        "message": stored.message,
        "createdAt": format_timestamp(stored.created_at),
    });

    let frame = json!({ "type": "message", "message": message }).to_string();
    let delivered = state.hub.broadcast(&[sender.id, receiver.id], &frame);
    log::debug!("Message {} pushed to {delivered} live session(s)", stored.id);

    Ok(Json(json!({ "success": true, "message": message })))
}

/// `GET /api/messages`
///
/// An unknown `chatWith` email is ignored and the full history returned.
pub async fn messages_handler(
    State(state): State<AppState>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Value>, ChatError> {
    let mut conn = state.pool.acquire().await.map_err(ApiError::from)?;
    let account = require_account(&mut conn, query.apikey.as_deref()).await?;

    let chat_with = match query.chat_with.as_deref().filter(|e| !e.is_empty()) {
        Some(email) => find_by_email(&mut conn, email).await?.map(|a| a.id),
        None => None,
    };
    let messages = recent_messages(&mut conn, account.id, chat_with, CHAT_HISTORY_LIMIT).await?;

    Ok(Json(json!({ "success": true, "messages": messages })))
}

/// `GET /api/chat-users`
pub async fn chat_users_handler(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<Value>, ChatError> {
    let mut conn = state.pool.acquire().await.map_err(ApiError::from)?;
    let account = require_account(&mut conn, query.apikey.as_deref()).await?;
    let users = chat_partners(&mut conn, account.id).await?;

    Ok(Json(json!({ "success": true, "users": users })))
}

/// `GET /ws/chat`
///
/// The key is checked before the upgrade; a bad key gets a plain 401.
pub async fn ws_chat_handler(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let account = {
        let mut conn = match state.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => return ApiError::from(e).into_response(),
        };
        match require_account(&mut conn, query.apikey.as_deref()).await {
            Ok(account) => account,
            Err(e) => return e.into_response(),
        }
    };

    upgrade.on_upgrade(move |socket| chat_session(socket, state, account.id))
}

async fn chat_session(socket: WebSocket, state: AppState, account_id: i64) {
    let (session_id, mut frames) = state.hub.add(account_id);
    let (mut sink, mut stream) = socket.split();

    let mut forward = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if sink.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Incoming frames are ignored; messages are sent over HTTP
    let mut drain = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut forward => drain.abort(),
        _ = &mut drain => forward.abort(),
    }

    state.hub.remove(account_id, session_id);
}
