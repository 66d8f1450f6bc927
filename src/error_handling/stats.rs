//! Service statistics tracking.
//!
//! Thread-safe counters for request errors, enrichment failures, missing page
//! metadata and fetch events. Shared across handlers via `Arc` and reported by
//! the health endpoint.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use strum::IntoEnumIterator;

use super::types::{ApiError, ErrorType, InfoType, WarningType};

/// Thread-safe service statistics.
///
/// Every counter exists from construction, so increments never allocate and
/// never need a lock.
///
/// # Categories
///
/// - **Errors**: request failures and failed enrichments
/// - **Warnings**: optional page metadata that was missing
/// - **Info**: notable fetch events (blocks, proxy fallbacks, redirects)
pub struct ServiceStats {
    requests: AtomicUsize,
    errors: HashMap<ErrorType, AtomicUsize>,
    warnings: HashMap<WarningType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

/// Point-in-time copy of the counters, keyed by stable snake_case names.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub requests: usize,
    pub errors: BTreeMap<&'static str, usize>,
    pub warnings: BTreeMap<&'static str, usize>,
    pub info: BTreeMap<&'static str, usize>,
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceStats {
    pub fn new() -> Self {
        ServiceStats {
            requests: AtomicUsize::new(0),
            errors: ErrorType::iter().map(|e| (e, AtomicUsize::new(0))).collect(),
            warnings: WarningType::iter()
                .map(|w| (w, AtomicUsize::new(0)))
                .collect(),
            info: InfoType::iter().map(|i| (i, AtomicUsize::new(0))).collect(),
        }
    }

    /// Count one dispatched capability request.
    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("No counter registered for error type {:?}", error);
        }
    }

    pub fn increment_warning(&self, warning: WarningType) {
        if let Some(counter) = self.warnings.get(&warning) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("No counter registered for warning type {:?}", warning);
        }
    }

    pub fn increment_info(&self, info_type: InfoType) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("No counter registered for info type {:?}", info_type);
        }
    }

    /// Count an [`ApiError`] under its category.
    pub fn record_api_error(&self, error: &ApiError) {
        self.increment_error(error.error_type());
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        self.warnings
            .get(&warning)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Copy all counters. Individual counters are read independently, so the
    /// snapshot is not atomic across categories.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.total_requests(),
            errors: ErrorType::iter()
                .map(|e| (e.as_str(), self.get_error_count(e)))
                .collect(),
            warnings: WarningType::iter()
                .map(|w| (w.as_str(), self.get_warning_count(w)))
                .collect(),
            info: InfoType::iter()
                .map(|i| (i.as_str(), self.get_info_count(i)))
                .collect(),
        }
    }
}
