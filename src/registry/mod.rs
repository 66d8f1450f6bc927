//! Capability registry.
//!
//! The registry declares which capabilities are exposed and which query
//! parameters each one requires. It is loaded once at startup from a JSON
//! object (`{"name": ["param", ...]}`) and never changes afterwards.

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};

/// Name → ordered list of required parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityRegistry {
    entries: HashMap<String, Vec<String>>,
}

impl CapabilityRegistry {
    /// Builds a registry from explicit entries.
    pub fn from_entries<I, N, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<P>)>,
        N: Into<String>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, params)| (name.into(), params.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Parses a registry from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parse error if the text is not an object of string arrays.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(text)?;
        Ok(Self { entries })
    }

    /// Loads the registry file at `path`.
    ///
    /// A missing or malformed file yields an empty registry (every call then
    /// answers "not found") and a warning in the log; the server still starts.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Capability registry {} unreadable ({e}); no capabilities will be served",
                    path.display()
                );
                return Self::default();
            }
        };

        match Self::from_json(&text) {
            Ok(registry) => {
                info!(
                    "Loaded {} capabilities from {}",
                    registry.len(),
                    path.display()
                );
                registry
            }
            Err(e) => {
                warn!(
                    "Capability registry {} is malformed ({e}); no capabilities will be served",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Required parameters for `name`, or `None` if not registered.
    pub fn required_params(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
