//! API key validation.
//!
//! A key is valid when exactly one account owns it. There is no rate
//! limiting, expiry or scoping.

use std::collections::HashMap;

use sqlx::SqliteConnection;

use crate::config::API_KEY_PARAM;
use crate::error_handling::ApiError;
use crate::storage::{find_by_key, Account};

/// Resolves `api_key` to its account.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` when the key is absent, empty or unknown,
/// and `ApiError::InternalFault` if the account store cannot be queried.
pub async fn require_account(
    conn: &mut SqliteConnection,
    api_key: Option<&str>,
) -> Result<Account, ApiError> {
    let Some(key) = api_key.filter(|k| !k.is_empty()) else {
        return Err(ApiError::Unauthorized);
    };
    find_by_key(conn, key).await?.ok_or(ApiError::Unauthorized)
}

/// Validates the `apiKey` query parameter of a capability call.
pub async fn require_api_key(
    conn: &mut SqliteConnection,
    params: &HashMap<String, String>,
) -> Result<Account, ApiError> {
    require_account(conn, params.get(API_KEY_PARAM).map(String::as_str)).await
}
