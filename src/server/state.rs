//! Shared server state.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::capability::CapabilitySet;
use crate::chat::ChatHub;
use crate::config::ServeConfig;
use crate::dispatch::Dispatcher;
use crate::error_handling::{ServiceStats, StatsSnapshot};
use crate::probe::SiteProber;
use crate::registry::CapabilityRegistry;
use crate::storage::init_db_pool_with_path;

/// Everything handlers share. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub dispatcher: Arc<Dispatcher>,
    pub hub: Arc<ChatHub>,
    pub stats: Arc<ServiceStats>,
    pub start_time: Arc<Instant>,
}

impl AppState {
    pub fn new(pool: SqlitePool, dispatcher: Arc<Dispatcher>, stats: Arc<ServiceStats>) -> Self {
        Self {
            pool,
            dispatcher,
            hub: Arc::new(ChatHub::new()),
            stats,
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Opens the database, loads the registry and wires up the built-in
    /// capabilities.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or migrated, or an HTTP client
    /// cannot be built. A bad registry file is not an error.
    pub async fn from_config(config: &ServeConfig) -> Result<Self> {
        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;

        let stats = Arc::new(ServiceStats::new());
        let prober = SiteProber::from_config(config, Arc::clone(&stats))
            .context("Failed to initialize site prober")?;

        let registry = CapabilityRegistry::load(&config.registry);
        let dispatcher = Dispatcher::new(
            registry,
            CapabilitySet::standard(Arc::new(prober)),
            Arc::clone(&stats),
        );
        dispatcher.validate();

        Ok(Self::new(pool, Arc::new(dispatcher), stats))
    }
}

/// JSON response for `/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub capabilities: Vec<String>,
    pub uptime_seconds: f64,
    pub live_chat_sessions: usize,
    pub stats: StatsSnapshot,
}
