//! Error handling and service statistics.
//!
//! This module provides:
//! - Error type definitions (request errors, enrichment errors, startup errors)
//! - HTTP rendering of request errors
//! - Service statistics tracking (errors, warnings, info metrics)
//!
//! Request errors are split into:
//! - **Hard**: rendered as `{success: false, error}` with a status code
//! - **Soft**: upstream trouble, reported as `{error}` inside a successful envelope

mod response;
mod stats;
mod types;

// Re-export public API
pub use stats::{ServiceStats, StatsSnapshot};
pub use types::{
    ApiError, DatabaseError, EnrichmentError, ErrorType, InfoType, InitializationError,
    WarningType,
};
