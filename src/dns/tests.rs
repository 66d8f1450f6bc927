//! DNS module tests.

use std::net::{IpAddr, Ipv4Addr};

use futures::future::BoxFuture;
use futures::FutureExt;

use super::*;
use crate::error_handling::EnrichmentError;

/// Answers A queries only; everything else has no records.
struct OnlyARecords;

impl RecordLookup for OnlyARecords {
    fn lookup_records<'a>(
        &'a self,
        _name: &'a str,
        record_type: DnsRecordType,
    ) -> BoxFuture<'a, Result<Vec<String>, EnrichmentError>> {
        async move {
            match record_type {
                DnsRecordType::A => Ok(vec!["93.184.216.34".to_string()]),
                _ => Ok(Vec::new()),
            }
        }
        .boxed()
    }

    fn lookup_ip<'a>(&'a self, _host: &'a str) -> BoxFuture<'a, Result<IpAddr, EnrichmentError>> {
        async { Ok(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))) }.boxed()
    }

    fn lookup_ptr(&self, _ip: IpAddr) -> BoxFuture<'_, Result<Option<String>, EnrichmentError>> {
        async { Ok(Some("edge.example.net".to_string())) }.boxed()
    }
}

/// Every query fails.
struct BrokenResolver;

impl RecordLookup for BrokenResolver {
    fn lookup_records<'a>(
        &'a self,
        _name: &'a str,
        record_type: DnsRecordType,
    ) -> BoxFuture<'a, Result<Vec<String>, EnrichmentError>> {
        async move {
            if record_type == DnsRecordType::TXT {
                Err(EnrichmentError::Timeout)
            } else {
                Err(EnrichmentError::Lookup("SERVFAIL".to_string()))
            }
        }
        .boxed()
    }

    fn lookup_ip<'a>(&'a self, _host: &'a str) -> BoxFuture<'a, Result<IpAddr, EnrichmentError>> {
        async { Err(EnrichmentError::Lookup("no route".to_string())) }.boxed()
    }

    fn lookup_ptr(&self, _ip: IpAddr) -> BoxFuture<'_, Result<Option<String>, EnrichmentError>> {
        async { Err(EnrichmentError::Timeout) }.boxed()
    }
}

#[tokio::test]
async fn test_only_a_resolves_other_types_empty() {
    let records = lookup_all_records(&OnlyARecords, "example.com").await;

    assert_eq!(records.len(), 7);
    assert_eq!(
        records.get(&DnsRecordType::A),
        Some(&Ok(vec!["93.184.216.34".to_string()]))
    );
    for (record_type, outcome) in &records {
        if *record_type != DnsRecordType::A {
            assert_eq!(outcome, &Ok(Vec::new()), "{record_type} should be empty");
        }
    }
}

#[tokio::test]
async fn test_failures_are_reported_per_type() {
    let records = lookup_all_records(&BrokenResolver, "example.com").await;

    assert_eq!(records.len(), 7);
    assert_eq!(
        records.get(&DnsRecordType::TXT),
        Some(&Err(EnrichmentError::Timeout))
    );
    assert!(matches!(
        records.get(&DnsRecordType::MX),
        Some(Err(EnrichmentError::Lookup(_)))
    ));
}

#[tokio::test]
async fn test_resolve_host_to_ip() {
    assert_eq!(
        resolve_host_to_ip("example.com", &OnlyARecords).await,
        "93.184.216.34"
    );
    assert_eq!(
        resolve_host_to_ip("example.com", &BrokenResolver).await,
        "Unknown"
    );
}

#[tokio::test]
async fn test_reverse_dns_lookup() {
    assert_eq!(
        reverse_dns_lookup("93.184.216.34", &OnlyARecords).await,
        Some("edge.example.net".to_string())
    );
    assert_eq!(reverse_dns_lookup("93.184.216.34", &BrokenResolver).await, None);
    assert_eq!(reverse_dns_lookup("Unknown", &OnlyARecords).await, None);
}

#[test]
fn test_aliased_answer_keeps_only_queried_type() {
    use hickory_resolver::proto::rr::rdata::{A, CNAME, MX};
    use hickory_resolver::proto::rr::{Name, RData};

    let alias = Name::from_ascii("github.com.").expect("name");
    let answer = [
        RData::CNAME(CNAME(alias.clone())),
        RData::A(A(Ipv4Addr::new(140, 82, 112, 3))),
        RData::A(A(Ipv4Addr::new(140, 82, 112, 4))),
    ];

    assert_eq!(
        records::render_answer(DnsRecordType::A, answer.iter()),
        vec!["140.82.112.3".to_string(), "140.82.112.4".to_string()]
    );
    assert_eq!(
        records::render_answer(DnsRecordType::CNAME, answer.iter()),
        vec!["github.com.".to_string()]
    );

    let mx = [
        RData::MX(MX::new(20, Name::from_ascii("alt.mail.example.").expect("name"))),
        RData::MX(MX::new(10, Name::from_ascii("mail.example.").expect("name"))),
    ];
    assert_eq!(
        records::render_answer(DnsRecordType::MX, mx.iter()),
        vec!["10 mail.example.".to_string(), "20 alt.mail.example.".to_string()]
    );
}

#[test]
fn test_record_type_names() {
    use strum::IntoEnumIterator;
    let names: Vec<String> = DnsRecordType::iter().map(|t| t.to_string()).collect();
    assert_eq!(names, vec!["A", "AAAA", "CNAME", "MX", "NS", "TXT", "SOA"]);
}
