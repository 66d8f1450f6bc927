//! DNS record queries.
//!
//! Every record type is looked up independently; an answer-less name yields an
//! empty list, while timeouts and resolver failures are reported per type.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::config::DNS_TIMEOUT_SECS;
use crate::error_handling::EnrichmentError;

/// Record types collected for every probed hostname.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum DnsRecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    TXT,
    SOA,
}

impl From<DnsRecordType> for RecordType {
    fn from(t: DnsRecordType) -> Self {
        match t {
            DnsRecordType::A => RecordType::A,
            DnsRecordType::AAAA => RecordType::AAAA,
            DnsRecordType::CNAME => RecordType::CNAME,
            DnsRecordType::MX => RecordType::MX,
            DnsRecordType::NS => RecordType::NS,
            DnsRecordType::TXT => RecordType::TXT,
            DnsRecordType::SOA => RecordType::SOA,
        }
    }
}

/// Outcome of every record type lookup for one name.
pub type DnsRecords = BTreeMap<DnsRecordType, Result<Vec<String>, EnrichmentError>>;

/// Source of DNS answers.
pub trait RecordLookup: Send + Sync {
    /// Records of `record_type` for `name`, rendered as strings.
    ///
    /// Returns `Ok(vec![])` when the name exists but has no such records, or
    /// does not exist at all.
    fn lookup_records<'a>(
        &'a self,
        name: &'a str,
        record_type: DnsRecordType,
    ) -> BoxFuture<'a, Result<Vec<String>, EnrichmentError>>;

    /// First address `host` resolves to.
    fn lookup_ip<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<IpAddr, EnrichmentError>>;

    /// First PTR name for `ip`, if any.
    fn lookup_ptr(&self, ip: IpAddr) -> BoxFuture<'_, Result<Option<String>, EnrichmentError>>;
}

/// Maps a resolver error onto the enrichment taxonomy.
///
/// "no records found" is expected for many names and is not a failure.
fn classify_error(
    name: &str,
    what: &str,
    e: hickory_resolver::error::ResolveError,
) -> Result<Vec<String>, EnrichmentError> {
    let error_msg = e.to_string();
    if error_msg.contains("no records found") || error_msg.contains("NXDomain") {
        Ok(Vec::new())
    } else if error_msg.contains("timeout") || error_msg.contains("timed out") {
        log::warn!("{what} lookup timed out for {name}: {e}");
        Err(EnrichmentError::Timeout)
    } else {
        log::warn!("Failed to lookup {what} records for {name}: {e}");
        Err(EnrichmentError::lookup(e))
    }
}

fn render_rdata(rdata: &RData) -> Option<String> {
    match rdata {
        // TXT records can contain multiple strings - join them
        RData::TXT(txt) => Some(
            txt.iter()
                .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                .collect::<Vec<String>>()
                .join(""),
        ),
        RData::MX(mx) => Some(format!("{} {}", mx.preference(), mx.exchange().to_utf8())),
        RData::A(_)
        | RData::AAAA(_)
        | RData::CNAME(_)
        | RData::NS(_)
        | RData::SOA(_) => Some(rdata.to_string()),
        _ => None,
    }
}

/// Renders the records of an answer that match `record_type`.
///
/// An A or AAAA answer for an aliased name also carries the CNAME chain;
/// those records belong to the CNAME type and are skipped here.
pub(crate) fn render_answer<'r>(
    record_type: DnsRecordType,
    answer: impl Iterator<Item = &'r RData>,
) -> Vec<String> {
    let wanted = RecordType::from(record_type);
    let mut records: Vec<String> = answer
        .filter(|rdata| rdata.record_type() == wanted)
        .filter_map(render_rdata)
        .collect();
    if record_type == DnsRecordType::MX {
        // Lower preference = higher priority
        records.sort_by_key(|r| {
            r.split_once(' ')
                .and_then(|(p, _)| p.parse::<u16>().ok())
                .unwrap_or(u16::MAX)
        });
    }
    records
}

impl RecordLookup for TokioAsyncResolver {
    fn lookup_records<'a>(
        &'a self,
        name: &'a str,
        record_type: DnsRecordType,
    ) -> BoxFuture<'a, Result<Vec<String>, EnrichmentError>> {
        async move {
            let what = record_type.to_string();
            match self.lookup(name, RecordType::from(record_type)).await {
                Ok(lookup) => Ok(render_answer(record_type, lookup.iter())),
                Err(e) => classify_error(name, &what, e),
            }
        }
        .boxed()
    }

    fn lookup_ip<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<IpAddr, EnrichmentError>> {
        async move {
            let response = TokioAsyncResolver::lookup_ip(self, host)
                .await
                .map_err(EnrichmentError::lookup)?;
            response
                .iter()
                .next()
                .ok_or_else(|| EnrichmentError::Lookup("No IP addresses found".to_string()))
        }
        .boxed()
    }

    fn lookup_ptr(&self, ip: IpAddr) -> BoxFuture<'_, Result<Option<String>, EnrichmentError>> {
        async move {
            match self.reverse_lookup(ip).await {
                Ok(response) => Ok(response.iter().next().map(|name| name.to_utf8())),
                Err(e) => match classify_error(&ip.to_string(), "PTR", e) {
                    Ok(_) => Ok(None),
                    Err(err) => Err(err),
                },
            }
        }
        .boxed()
    }
}

/// Looks up every [`DnsRecordType`] for `name` concurrently.
///
/// Each type is bounded by the DNS timeout on its own; one slow or failing
/// type never affects the others.
pub async fn lookup_all_records(lookup: &dyn RecordLookup, name: &str) -> DnsRecords {
    let queries = DnsRecordType::iter().map(|record_type| async move {
        let outcome = match tokio::time::timeout(
            Duration::from_secs(DNS_TIMEOUT_SECS),
            lookup.lookup_records(name, record_type),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(EnrichmentError::Timeout),
        };
        (record_type, outcome)
    });

    join_all(queries).await.into_iter().collect()
}
