//! Capability dispatch.
//!
//! Takes a capability name and the raw query parameters, checks them against
//! the registry, resolves the compiled implementation and runs it with a
//! pooled database connection.
//!
//! Checks happen in a fixed order, and each failing check stops the request
//! before the capability runs:
//! 1. name registered, else `NotFound`
//! 2. name compiled in, else `InternalFault`
//! 3. every declared parameter present, else `UnprocessableInput`

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use sqlx::SqlitePool;
use strum::IntoEnumIterator;

use crate::capability::{CapabilityName, CapabilitySet};
use crate::error_handling::{ApiError, ServiceStats};
use crate::registry::CapabilityRegistry;
use crate::storage::DataAccess;

pub struct Dispatcher {
    registry: CapabilityRegistry,
    capabilities: CapabilitySet,
    stats: Arc<ServiceStats>,
}

impl Dispatcher {
    pub fn new(
        registry: CapabilityRegistry,
        capabilities: CapabilitySet,
        stats: Arc<ServiceStats>,
    ) -> Self {
        Self {
            registry,
            capabilities,
            stats,
        }
    }

    /// Logs every mismatch between the registry and the compiled set.
    ///
    /// Returns the number of mismatches found.
    pub fn validate(&self) -> usize {
        let mut mismatches = 0;
        for name in self.registry.names() {
            if self.capabilities.resolve(name).is_none() {
                log::warn!("Registry entry '{name}' has no implementation; calls will fail");
                mismatches += 1;
            }
        }
        for name in CapabilityName::iter() {
            let name = name.to_string();
            if !self.registry.contains(&name) {
                log::warn!("Capability '{name}' is compiled in but not registered; it is unreachable");
                mismatches += 1;
            }
        }
        mismatches
    }

    /// Registered names that resolve to an implementation, sorted.
    pub fn dispatchable(&self) -> Vec<String> {
        self.registry
            .names()
            .into_iter()
            .filter(|name| self.capabilities.resolve(name).is_some())
            .map(str::to_string)
            .collect()
    }

    /// Runs capability `name` and returns its result.
    ///
    /// Soft failures come back as `Ok({"error": message})`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InternalFault`, `UnprocessableInput` from the checks
    /// above, plus `Unauthorized` and `InternalFault` from the capability.
    pub async fn dispatch(
        &self,
        name: &str,
        params: &HashMap<String, String>,
        pool: &SqlitePool,
    ) -> Result<Value, ApiError> {
        self.stats.increment_requests();
        let result = self.dispatch_inner(name, params, pool).await;
        match result {
            Ok(value) => Ok(value),
            Err(e) if e.is_soft() => {
                self.stats.record_api_error(&e);
                log::info!("Capability '{name}' reported: {e}");
                Ok(json!({ "error": e.message() }))
            }
            Err(e) => {
                self.stats.record_api_error(&e);
                Err(e)
            }
        }
    }

    async fn dispatch_inner(
        &self,
        name: &str,
        params: &HashMap<String, String>,
        pool: &SqlitePool,
    ) -> Result<Value, ApiError> {
        let required = self
            .registry
            .required_params(name)
            .ok_or_else(|| ApiError::NotFound(name.to_string()))?;

        let capability = self.capabilities.resolve(name).ok_or_else(|| {
            log::error!("Registered capability '{name}' has no implementation");
            ApiError::InternalFault("no implementation".to_string())
        })?;

        let missing: Vec<String> = required
            .iter()
            .filter(|param| !params.contains_key(param.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::UnprocessableInput(missing));
        }

        let mut conn: DataAccess = pool.acquire().await?;
        log::debug!("Dispatching '{name}'");
        capability.run(params, &mut conn).await
    }
}
