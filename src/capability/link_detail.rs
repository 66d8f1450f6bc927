//! `link_detail`: probes a site and returns its report.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use sqlx::SqliteConnection;

use super::Capability;
use crate::auth::require_api_key;
use crate::error_handling::ApiError;
use crate::probe::SiteProber;

pub struct LinkDetail {
    prober: Arc<SiteProber>,
}

impl LinkDetail {
    pub fn new(prober: Arc<SiteProber>) -> Self {
        Self { prober }
    }
}

impl Capability for LinkDetail {
    fn run<'a>(
        &'a self,
        params: &'a HashMap<String, String>,
        db: &'a mut SqliteConnection,
    ) -> BoxFuture<'a, Result<Value, ApiError>> {
        async move {
            // Key first: nothing leaves the process for an unknown caller
            let account = require_api_key(db, params).await?;
            let url = params
                .get("url")
                .ok_or_else(|| ApiError::UnprocessableInput(vec!["url".to_string()]))?;

            log::info!("link_detail for account {}: {}", account.id, url);
            let report = self
                .prober
                .probe(url, params.get("cookies").map(String::as_str))
                .await?;
            Ok(report.to_payload())
        }
        .boxed()
    }
}
