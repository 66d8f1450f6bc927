//! Chat message persistence.
//!
//! Messages are stored with millisecond timestamps; ties are broken by id so
//! ordering is stable for messages written in the same millisecond.

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};

use crate::error_handling::DatabaseError;
use crate::storage::{format_timestamp, now_ms};

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    pub created_at: i64,
}

/// A message as presented to one of its participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: i64,
    pub sender_email: String,
    pub receiver_email: String,
    pub message: String,
    pub created_at: String,
    pub is_sent: bool,
}

/// A conversation partner and the latest message exchanged with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPartner {
    pub email: String,
    pub last_message: String,
    pub last_message_time: String,
}

#[derive(FromRow)]
struct MessageRow {
    id: i64,
    sender_id: i64,
    sender_email: String,
    receiver_email: String,
    message: String,
    created_at: i64,
}

pub async fn insert_message(
    conn: &mut SqliteConnection,
    sender_id: i64,
    receiver_id: i64,
    message: &str,
) -> Result<ChatMessage, DatabaseError> {
    let stored = sqlx::query_as::<_, ChatMessage>(
        "INSERT INTO chat_messages (sender_id, receiver_id, message, created_at)
         VALUES (?, ?, ?, ?)
         RETURNING id, sender_id, receiver_id, message, created_at",
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(message)
    .bind(now_ms())
    .fetch_one(&mut *conn)
    .await?;
    Ok(stored)
}

/// Returns the latest `limit` messages involving `account_id`, oldest first.
///
/// With `chat_with`, only messages exchanged with that account are returned.
pub async fn recent_messages(
    conn: &mut SqliteConnection,
    account_id: i64,
    chat_with: Option<i64>,
    limit: i64,
) -> Result<Vec<MessageView>, DatabaseError> {
    let rows = sqlx::query_as::<_, MessageRow>(
        "SELECT m.id, m.sender_id, s.email AS sender_email, r.email AS receiver_email,
                m.message, m.created_at
         FROM chat_messages m
         JOIN accounts s ON s.id = m.sender_id
         JOIN accounts r ON r.id = m.receiver_id
         WHERE (m.sender_id = ?1 OR m.receiver_id = ?1)
           AND (?2 IS NULL OR m.sender_id = ?2 OR m.receiver_id = ?2)
         ORDER BY m.created_at DESC, m.id DESC
         LIMIT ?3",
    )
    .bind(account_id)
    .bind(chat_with)
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .rev()
        .map(|row| MessageView {
            id: row.id,
            is_sent: row.sender_id == account_id,
            sender_email: row.sender_email,
            receiver_email: row.receiver_email,
            message: row.message,
            created_at: format_timestamp(row.created_at),
        })
        .collect())
}

/// Lists everyone `account_id` has exchanged messages with, most recent first.
pub async fn chat_partners(
    conn: &mut SqliteConnection,
    account_id: i64,
) -> Result<Vec<ChatPartner>, DatabaseError> {
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        "WITH involved AS (
             SELECT id, message, created_at,
                    CASE WHEN sender_id = ?1 THEN receiver_id ELSE sender_id END AS partner_id
             FROM chat_messages
             WHERE sender_id = ?1 OR receiver_id = ?1
         ),
         ranked AS (
             SELECT partner_id, message, created_at,
                    ROW_NUMBER() OVER (PARTITION BY partner_id ORDER BY created_at DESC, id DESC) AS rn
             FROM involved
         )
         SELECT a.email, ranked.message, ranked.created_at
         FROM ranked
         JOIN accounts a ON a.id = ranked.partner_id
         WHERE ranked.rn = 1
         ORDER BY ranked.created_at DESC",
    )
    .bind(account_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(email, last_message, created_at)| ChatPartner {
            email,
            last_message,
            last_message_time: format_timestamp(created_at),
        })
        .collect())
}
