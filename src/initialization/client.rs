//! HTTP client initialization.
//!
//! This module provides functions to initialize the HTTP clients used by the
//! prober: one for page fetches and one for small JSON lookups.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{IP_INFO_TIMEOUT_SECS, TCP_CONNECT_TIMEOUT_SECS};

/// Initializes the HTTP client used for direct page fetches.
///
/// Creates a `reqwest::Client` configured with:
/// - Request timeout from the server configuration
/// - TCP connect timeout
/// - Redirect following enabled (up to 10 hops)
/// - Rustls TLS backend (no native TLS)
///
/// No default User-Agent is set; the fetcher rotates one per request.
///
/// # Arguments
///
/// * `timeout_seconds` - Per-request timeout
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(timeout_seconds: u64) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

/// Initializes the HTTP client for IP ownership and proxy list lookups.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_lookup_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(IP_INFO_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .build()
}
