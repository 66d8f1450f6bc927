//! Error type definitions.
//!
//! This module defines the request-level error taxonomy, the per-field
//! enrichment error, and the error, warning and info counters tracked while
//! serving requests.

use axum::http::StatusCode;
use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// An account with this email already exists.
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),
}

/// Request-level failures.
///
/// Only [`ApiError::Unauthorized`] and the dispatcher-level variants cross a
/// capability boundary as hard failures. [`ApiError::FetchExhausted`] and
/// [`ApiError::UpstreamFault`] are soft: the dispatcher turns them into an
/// `{error: message}` payload inside a successful envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Capability name is not in the registry.
    #[error("API '{0}' not found")]
    NotFound(String),

    /// One or more declared parameters are missing, in declared order.
    #[error("Missing required parameter(s): {}", .0.join(", "))]
    UnprocessableInput(Vec<String>),

    /// API key missing or not registered.
    #[error("Invalid API key")]
    Unauthorized,

    /// Direct fetch was blocked and no proxy attempt got through.
    #[error("Fetch exhausted: {0}")]
    FetchExhausted(String),

    /// A third-party service failed or returned garbage.
    #[error("Upstream error: {0}")]
    UpstreamFault(String),

    /// Anything unanticipated. The message is short and never a backtrace.
    #[error("Internal error: {0}")]
    InternalFault(String),
}

impl ApiError {
    /// HTTP status used when this error is rendered as a hard failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UnprocessableInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::FetchExhausted(_) | ApiError::UpstreamFault(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Soft failures are reported inside a successful envelope.
    pub fn is_soft(&self) -> bool {
        matches!(self, ApiError::FetchExhausted(_) | ApiError::UpstreamFault(_))
    }

    /// Message placed in the `{error}` payload when reported softly.
    pub fn message(&self) -> String {
        match self {
            ApiError::FetchExhausted(msg)
            | ApiError::UpstreamFault(msg)
            | ApiError::InternalFault(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Counter category for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            ApiError::NotFound(_) => ErrorType::CapabilityNotFound,
            ApiError::UnprocessableInput(_) => ErrorType::MissingParameter,
            ApiError::Unauthorized => ErrorType::Unauthorized,
            ApiError::FetchExhausted(_) => ErrorType::FetchExhausted,
            ApiError::UpstreamFault(_) => ErrorType::UpstreamFault,
            ApiError::InternalFault(_) => ErrorType::InternalFault,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        log::error!("Database failure while serving request: {e}");
        ApiError::InternalFault("database unavailable".to_string())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::from(DatabaseError::SqlError(e))
    }
}

/// Failure of a single best-effort enrichment (DNS type, WHOIS, TLS, ...).
///
/// Never surfaced as a request-level error; the probe payload flattens it to
/// an empty value and lists it under `enrichment_errors`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    /// The lookup did not finish within its timeout.
    #[error("timed out")]
    Timeout,

    /// The lookup ran and failed.
    #[error("{0}")]
    Lookup(String),
}

impl EnrichmentError {
    pub fn lookup(e: impl std::fmt::Display) -> Self {
        EnrichmentError::Lookup(e.to_string())
    }
}

/// Types of errors counted while serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    CapabilityNotFound,
    MissingParameter,
    Unauthorized,
    FetchExhausted,
    UpstreamFault,
    InternalFault,
    // Enrichment failures (never fatal)
    DnsLookupError,
    WhoisLookupError,
    TlsCertificateError,
    HostingLookupError,
}

/// Types of warnings: optional page metadata that was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)] // All variants start with "Missing" by design
pub enum WarningType {
    MissingMetaKeywords,
    MissingMetaDescription,
    MissingTitle,
}

/// Notable events that are neither errors nor warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// Direct fetch answered with the blocking status
    BotDetection403,
    /// A proxy attempt got through after a block
    ProxyFallbackSucceeded,
    /// Final URL differs from the requested one
    HttpRedirect,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::CapabilityNotFound => "capability_not_found",
            ErrorType::MissingParameter => "missing_parameter",
            ErrorType::Unauthorized => "unauthorized",
            ErrorType::FetchExhausted => "fetch_exhausted",
            ErrorType::UpstreamFault => "upstream_fault",
            ErrorType::InternalFault => "internal_fault",
            ErrorType::DnsLookupError => "dns_lookup_error",
            ErrorType::WhoisLookupError => "whois_lookup_error",
            ErrorType::TlsCertificateError => "tls_certificate_error",
            ErrorType::HostingLookupError => "hosting_lookup_error",
        }
    }
}

impl WarningType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MissingMetaKeywords => "missing_meta_keywords",
            WarningType::MissingMetaDescription => "missing_meta_description",
            WarningType::MissingTitle => "missing_title",
        }
    }
}

impl InfoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::BotDetection403 => "bot_detection_403",
            InfoType::ProxyFallbackSucceeded => "proxy_fallback_succeeded",
            InfoType::HttpRedirect => "http_redirect",
        }
    }
}
