//! Account store.
//!
//! Accounts are looked up by exact API key match. They are created only by the
//! `issue-key` admin command.

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};

use crate::error_handling::DatabaseError;
use crate::storage::now_ms;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub api_key: String,
    pub created_at: i64,
}

/// Finds the account owning `api_key`, if any.
pub async fn find_by_key(
    conn: &mut SqliteConnection,
    api_key: &str,
) -> Result<Option<Account>, DatabaseError> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, api_key, created_at FROM accounts WHERE api_key = ?",
    )
    .bind(api_key)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(account)
}

pub async fn find_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<Account>, DatabaseError> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, api_key, created_at FROM accounts WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(account)
}

pub async fn find_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Account>, DatabaseError> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, email, api_key, created_at FROM accounts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(account)
}

/// Inserts a new account.
///
/// # Errors
///
/// Returns `DatabaseError::DuplicateEmail` if the email is already registered,
/// or `DatabaseError::SqlError` for any other failure.
pub async fn insert_account(
    conn: &mut SqliteConnection,
    email: &str,
    api_key: &str,
) -> Result<Account, DatabaseError> {
    let result = sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (email, api_key, created_at) VALUES (?, ?, ?)
         RETURNING id, email, api_key, created_at",
    )
    .bind(email)
    .bind(api_key)
    .bind(now_ms())
    .fetch_one(&mut *conn)
    .await;

    match result {
        Ok(account) => Ok(account),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            // api_key collisions are practically impossible with v4 UUIDs
            if db.message().contains("accounts.email") {
                Err(DatabaseError::DuplicateEmail(email.to_string()))
            } else {
                Err(DatabaseError::SqlError(sqlx::Error::Database(db)))
            }
        }
        Err(e) => Err(DatabaseError::SqlError(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::create_test_pool;

    #[tokio::test]
    async fn test_insert_and_find_by_key() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.expect("conn");

        let created = insert_account(&mut conn, "ana@example.com", "key-1")
            .await
            .expect("insert");
        assert!(created.id > 0);
        assert!(created.created_at > 0);

        let found = find_by_key(&mut conn, "key-1").await.expect("query");
        assert_eq!(found, Some(created.clone()));

        let by_email = find_by_email(&mut conn, "ana@example.com")
            .await
            .expect("query");
        assert_eq!(by_email.map(|a| a.id), Some(created.id));

        let by_id = find_by_id(&mut conn, created.id).await.expect("query");
        assert_eq!(by_id.map(|a| a.email), Some("ana@example.com".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_key_is_none() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.expect("conn");
        insert_account(&mut conn, "ana@example.com", "key-1")
            .await
            .expect("insert");

        assert_eq!(find_by_key(&mut conn, "KEY-1").await.expect("query"), None);
        assert_eq!(find_by_key(&mut conn, "").await.expect("query"), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.expect("conn");
        insert_account(&mut conn, "ana@example.com", "key-1")
            .await
            .expect("insert");

        let err = insert_account(&mut conn, "ana@example.com", "key-2")
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, DatabaseError::DuplicateEmail(ref e) if e == "ana@example.com"));
    }
}
