//! DNS resolution and record querying.
//!
//! This module provides async DNS operations using `hickory-resolver`:
//! - IP address resolution (A/AAAA records)
//! - Per-type record queries (A, AAAA, CNAME, MX, NS, TXT, SOA)
//! - Reverse lookups (PTR records)
//! - SPF/DMARC extraction from TXT records
//!
//! Lookups go through the [`RecordLookup`] trait so callers can substitute a
//! fixed answer set in tests.

mod extract;
mod records;
mod resolution;

// Re-export public API
pub use extract::{extract_dmarc_record, extract_spf_record};
pub use records::{lookup_all_records, DnsRecordType, DnsRecords, RecordLookup};
pub use resolution::{resolve_host_to_ip, reverse_dns_lookup};

#[cfg(test)]
mod tests;
