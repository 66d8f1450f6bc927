//! Shared test helpers for database-backed tests.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::storage::{insert_account, run_migrations, Account};

/// Creates an in-memory database pool with migrations applied.
///
/// A single connection that never expires keeps the in-memory database alive
/// for the whole test.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Creates an account with a fixed key and returns it.
pub async fn create_test_account(pool: &SqlitePool, email: &str, api_key: &str) -> Account {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    insert_account(&mut conn, email, api_key)
        .await
        .expect("Failed to insert test account")
}
