//! IP address resolution and reverse DNS lookup.

use std::net::IpAddr;
use std::time::Duration;

use crate::config::{DNS_TIMEOUT_SECS, UNKNOWN_IP};
use crate::dns::RecordLookup;

/// Resolves a hostname to an IP address.
///
/// # Returns
///
/// The first address as a string, or [`UNKNOWN_IP`] if resolution fails or
/// times out.
pub async fn resolve_host_to_ip(host: &str, lookup: &dyn RecordLookup) -> String {
    match tokio::time::timeout(Duration::from_secs(DNS_TIMEOUT_SECS), lookup.lookup_ip(host)).await
    {
        Ok(Ok(ip)) => ip.to_string(),
        Ok(Err(e)) => {
            log::debug!("Could not resolve {host}: {e}");
            UNKNOWN_IP.to_string()
        }
        Err(_) => {
            log::debug!("Resolving {host} timed out");
            UNKNOWN_IP.to_string()
        }
    }
}

/// Performs a reverse DNS lookup (PTR record) for an IP address.
///
/// # Returns
///
/// The reverse DNS name, or `None` if the address is unparseable, has no PTR
/// record, or the lookup fails.
pub async fn reverse_dns_lookup(ip: &str, lookup: &dyn RecordLookup) -> Option<String> {
    let addr: IpAddr = ip.parse().ok()?;
    match tokio::time::timeout(Duration::from_secs(DNS_TIMEOUT_SECS), lookup.lookup_ptr(addr)).await
    {
        Ok(Ok(name)) => name,
        Ok(Err(e)) => {
            log::warn!("Failed to perform reverse DNS lookup for {ip}: {e}");
            None
        }
        Err(_) => None,
    }
}
