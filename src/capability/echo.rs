//! `echo`: returns the `msg` parameter. Useful for checking a key.

use std::collections::HashMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use super::Capability;
use crate::auth::require_api_key;
use crate::error_handling::ApiError;

pub struct Echo;

impl Capability for Echo {
    fn run<'a>(
        &'a self,
        params: &'a HashMap<String, String>,
        db: &'a mut SqliteConnection,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        async move {
            require_api_key(db, params).await?;
            let msg = params
                .get("msg")
                .ok_or_else(|| ApiError::UnprocessableInput(vec!["msg".to_string()]))?;
            Ok(json!({ "message": msg }))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{create_test_account, create_test_pool};

    #[tokio::test]
    async fn test_echo_returns_message() {
        let pool = create_test_pool().await;
        create_test_account(&pool, "ana@example.com", "k1").await;
        let mut conn = pool.acquire().await.expect("conn");

        let params = HashMap::from([
            ("msg".to_string(), "hello".to_string()),
            ("apiKey".to_string(), "k1".to_string()),
        ]);
        let result = Echo.run(&params, &mut conn).await.expect("echo");
        assert_eq!(result, json!({"message": "hello"}));
    }

    #[tokio::test]
    async fn test_echo_rejects_unknown_key() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.expect("conn");

        let params = HashMap::from([
            ("msg".to_string(), "hello".to_string()),
            ("apiKey".to_string(), "nope".to_string()),
        ]);
        let err = Echo.run(&params, &mut conn).await.expect_err("bad key");
        assert_eq!(err, ApiError::Unauthorized);
    }
}
