//! WHOIS/RDAP domain lookup using the `whois-service` crate.
//!
//! `whois-service` tries RDAP first and falls back to WHOIS, discovering the
//! right server through IANA bootstrap data.

mod parse;
mod types;

use whois_service::WhoisClient;

use crate::config::WHOIS_TIMEOUT;
use crate::error_handling::EnrichmentError;

pub use parse::whois_domain;
pub use types::WhoisRecord;

/// Performs a WHOIS lookup for a domain.
///
/// # Arguments
///
/// * `domain` - The domain to look up (e.g., "example.com")
///
/// # Errors
///
/// Returns `EnrichmentError::Timeout` if the lookup exceeds the WHOIS timeout,
/// or `EnrichmentError::Lookup` if the client cannot be created or the query
/// fails.
pub async fn lookup_whois(domain: &str) -> Result<WhoisRecord, EnrichmentError> {
    log::debug!("Starting WHOIS lookup for domain: {}", domain);

    let lookup = async {
        let client = WhoisClient::new()
            .await
            .map_err(|e| EnrichmentError::Lookup(format!("Failed to create WHOIS client: {e}")))?;
        client.lookup(domain).await.map_err(EnrichmentError::lookup)
    };

    match tokio::time::timeout(WHOIS_TIMEOUT, lookup).await {
        Ok(Ok(response)) => {
            log::debug!("WHOIS lookup successful for {}", domain);
            Ok(parse::convert_response(domain, &response))
        }
        Ok(Err(e)) => {
            log::warn!("WHOIS lookup failed for {}: {}", domain, e);
            Err(e)
        }
        Err(_) => {
            log::warn!("WHOIS lookup timed out for {}", domain);
            Err(EnrichmentError::Timeout)
        }
    }
}
