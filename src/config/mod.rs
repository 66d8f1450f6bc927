//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, proxy sources, etc.)
//! - HTTP header constants
//! - CLI option types and parsing

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Cli, Command, IssueKeyArgs, LogFormat, LogLevel, ServeConfig};
