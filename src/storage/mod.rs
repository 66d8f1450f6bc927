//! Database operations.
//!
//! This module provides:
//! - Connection pool setup (SQLite, WAL mode)
//! - Embedded schema migrations
//! - Account lookups and creation
//! - Chat message persistence and history queries

mod accounts;
mod messages;
mod migrations;
mod pool;
#[cfg(test)]
pub(crate) mod test_helpers;

use sqlx::pool::PoolConnection;
use sqlx::Sqlite;

// Re-export commonly used items
pub use accounts::{find_by_email, find_by_id, find_by_key, insert_account, Account};
pub use messages::{chat_partners, insert_message, recent_messages, ChatMessage, ChatPartner, MessageView};
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;

/// Per-request data-access handle: one pooled connection, returned to the
/// pool when dropped.
pub type DataAccess = PoolConnection<Sqlite>;

/// Current time in milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Formats a stored millisecond timestamp as RFC 3339.
pub fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_default()
}
