//! Compiled capability implementations.
//!
//! The set of callable capabilities is closed: [`CapabilityName`] lists every
//! implementation built into the binary, and the registry decides which of
//! them are exposed and with which required parameters.

mod echo;
mod link_detail;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use sqlx::SqliteConnection;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error_handling::ApiError;
use crate::probe::SiteProber;

pub use echo::Echo;
pub use link_detail::LinkDetail;

/// A named operation reachable through `/api/{name}`.
///
/// Implementations validate the caller's API key themselves, before any
/// external call.
pub trait Capability: Send + Sync {
    fn run<'a>(
        &'a self,
        params: &'a HashMap<String, String>,
        db: &'a mut SqliteConnection,
    ) -> BoxFuture<'a, Result<Value, ApiError>>;
}

/// Names of the compiled capabilities. Parsing is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CapabilityName {
    Echo,
    LinkDetail,
}

/// Name to implementation table.
#[derive(Default, Clone)]
pub struct CapabilitySet {
    entries: HashMap<CapabilityName, Arc<dyn Capability>>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in capability, with `link_detail` backed by `prober`.
    pub fn standard(prober: Arc<SiteProber>) -> Self {
        Self::new()
            .with(CapabilityName::Echo, Arc::new(Echo))
            .with(CapabilityName::LinkDetail, Arc::new(LinkDetail::new(prober)))
    }

    pub fn with(mut self, name: CapabilityName, capability: Arc<dyn Capability>) -> Self {
        self.entries.insert(name, capability);
        self
    }

    /// Resolves a registry name. Anything that is not exactly a compiled
    /// name resolves to nothing.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Capability>> {
        let name = CapabilityName::from_str(name).ok()?;
        self.entries.get(&name).cloned()
    }

    /// Names with an implementation, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().map(|n| n.to_string()).collect();
        names.sort();
        names
    }
}
