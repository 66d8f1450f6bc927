//! api_hub library: an API-key gated capability gateway.
//!
//! Requests to `/api/{name}` are checked against a JSON registry of
//! capabilities and their required parameters, then dispatched to a compiled
//! implementation. The main capability, `link_detail`, probes a web site:
//! it fetches the page (falling back to public proxies when the direct
//! request is blocked), extracts static page signals and enriches them with
//! DNS, TLS, WHOIS and hosting data. A small account-to-account chat layer
//! shares the same accounts and API keys.
//!
//! # Example
//!
//! ```no_run
//! use api_hub::{run_server, ServeConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = ServeConfig {
//!     listen: "127.0.0.1:8080".parse()?,
//!     ..Default::default()
//! };
//! run_server(config).await
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime, and
//! [`initialization::init_crypto_provider`] must run before the first TLS
//! certificate inspection.

mod auth;
pub mod capability;
mod chat;
pub mod config;
pub mod dispatch;
mod dns;
mod error_handling;
pub mod initialization;
mod parse;
pub mod probe;
pub mod registry;
mod server;
pub mod storage;
mod tls;
mod whois;

// Re-export public API
pub use config::{Cli, Command, IssueKeyArgs, LogFormat, LogLevel, ServeConfig};
pub use dns::{DnsRecordType, RecordLookup};
pub use error_handling::{
    ApiError, DatabaseError, EnrichmentError, ErrorType, InfoType, InitializationError,
    ServiceStats, StatsSnapshot, WarningType,
};
pub use server::{router, run_server, serve, AppState, HealthResponse};
