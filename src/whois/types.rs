//! WHOIS data structures.

use serde::Serialize;

/// Registration details for a domain.
///
/// Dates are normalized to RFC 3339 when their format is recognized and kept
/// verbatim otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WhoisRecord {
    pub domain: String,
    pub registrar: Option<String>,
    pub registrant: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,
    /// Domain status codes (e.g., "clientTransferProhibited")
    pub status: Vec<String>,
    pub name_servers: Vec<String>,
}
