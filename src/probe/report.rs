//! Probe report and its JSON payload.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};
use url::Url;

use super::cookies::CookieJar;
use super::fetch::FetchOrigin;
use super::hosting::HostingInfo;
use crate::config::{MAX_HEADER_COUNT, MAX_HEADER_VALUE_LENGTH, MAX_IMAGES_IN_PAYLOAD, MAX_LINKS_IN_PAYLOAD};
use crate::dns::DnsRecords;
use crate::error_handling::EnrichmentError;
use crate::parse::PageSignals;
use crate::tls::CertificateInfo;
use crate::whois::WhoisRecord;

/// State of one best-effort enrichment.
///
/// Keeps "not attempted", "ran and found nothing" and "failed" apart until
/// the report is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment<T> {
    NotAttempted,
    Completed(T),
    Failed(EnrichmentError),
}

impl<T> From<Result<T, EnrichmentError>> for Enrichment<T> {
    fn from(result: Result<T, EnrichmentError>) -> Self {
        match result {
            Ok(value) => Enrichment::Completed(value),
            Err(e) => Enrichment::Failed(e),
        }
    }
}

impl<T> Enrichment<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            Enrichment::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EnrichmentError> {
        match self {
            Enrichment::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<T: Serialize> Enrichment<T> {
    /// Completed values serialize as themselves, everything else as null.
    fn to_json(&self) -> Value {
        self.completed()
            .and_then(|value| serde_json::to_value(value).ok())
            .unwrap_or(Value::Null)
    }
}

/// Everything learned about one site.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Exactly what the caller passed
    pub requested_url: String,
    /// Requested URL after scheme normalization
    pub url: Url,
    pub final_url: Url,
    pub status_code: u16,
    pub hostname: String,
    /// `"Unknown"` when resolution failed
    pub ip_address: String,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub content_length: usize,
    pub response_time_ms: f64,
    pub origin: FetchOrigin,
    pub proxy_attempts: usize,
    pub cookies: CookieJar,
    pub signals: PageSignals,
    pub technologies: Vec<String>,
    pub dns_records: DnsRecords,
    pub spf_record: Option<String>,
    pub dmarc_record: Option<String>,
    pub ssl: Enrichment<CertificateInfo>,
    pub whois: Enrichment<WhoisRecord>,
    pub hosting: Enrichment<HostingInfo>,
}

/// Charset named in a `Content-Type` value, if any.
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    })
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

impl ProbeReport {
    pub fn redirected(&self) -> bool {
        self.final_url != self.url
    }

    pub fn encoding(&self) -> Option<String> {
        self.content_type.as_deref().and_then(charset_from_content_type)
    }

    /// Names and messages of the enrichments that failed.
    pub fn enrichment_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        for (record_type, result) in &self.dns_records {
            if let Err(e) = result {
                errors.insert(format!("dns_{record_type}"), e.to_string());
            }
        }
        if let Some(e) = self.ssl.error() {
            errors.insert("ssl_certificate".to_string(), e.to_string());
        }
        if let Some(e) = self.whois.error() {
            errors.insert("whois".to_string(), e.to_string());
        }
        if let Some(e) = self.hosting.error() {
            errors.insert("hosting".to_string(), e.to_string());
        }
        errors
    }

    fn headers_json(&self) -> Value {
        // Repeated headers keep their first value
        let mut map = Map::new();
        for (name, value) in self.headers.iter().take(MAX_HEADER_COUNT) {
            map.entry(name.clone())
                .or_insert_with(|| Value::String(truncate_chars(value, MAX_HEADER_VALUE_LENGTH)));
        }
        Value::Object(map)
    }

    fn dns_json(&self) -> Value {
        let map: Map<String, Value> = self
            .dns_records
            .iter()
            .map(|(record_type, result)| {
                let values = result.as_ref().map(Vec::as_slice).unwrap_or_default();
                (record_type.to_string(), json!(values))
            })
            .collect();
        Value::Object(map)
    }

    /// Flattens the report into the `link_detail` result object.
    ///
    /// Failed and skipped enrichments become empty lists or null here; the
    /// failures are listed under `enrichment_errors`.
    pub fn to_payload(&self) -> Value {
        let signals = &self.signals;
        let redirected = self.redirected();
        let (fetched_via, proxy) = match &self.origin {
            FetchOrigin::Direct => ("direct", Value::Null),
            FetchOrigin::Proxy(addr) => ("proxy", json!(addr.as_str())),
        };

        let mut payload = json!({
            "url": self.final_url.as_str(),
            "original_url": self.requested_url,
            "status_code": self.status_code,
            "title": signals.title.as_deref().unwrap_or("No title found"),
            "description": signals.description.as_deref().unwrap_or(""),
            "keywords": signals.keywords.as_deref().unwrap_or(""),
            "hostname": self.hostname,
            "ip_address": self.ip_address,
            "is_dynamic": signals.is_dynamic(),
            "website_type": signals.website_type(),
            "has_javascript": signals.has_javascript,
            "has_forms": signals.has_forms,
            "mobile_friendly": signals.mobile_friendly,
            "content_length": self.content_length,
            "content_type": self.content_type.as_deref().unwrap_or(""),
            "encoding": self.encoding(),
            "headers": self.headers_json(),
            "meta_tags": signals.meta_tags,
        });
        let extra = json!({
            "links_count": signals.links.len(),
            "images_count": signals.images.len(),
            "links": signals.links.iter().take(MAX_LINKS_IN_PAYLOAD).collect::<Vec<_>>(),
            "images": signals.images.iter().take(MAX_IMAGES_IN_PAYLOAD).collect::<Vec<_>>(),
            "stylesheets": signals.stylesheets,
            "scripts": signals.scripts,
            "technologies": self.technologies,
            "cookies": self.cookies.as_map(),
            "response_time_ms": self.response_time_ms,
            "redirected": redirected,
            "final_url": redirected.then(|| self.final_url.as_str()),
            "dns_records": self.dns_json(),
            "spf_record": self.spf_record,
            "dmarc_record": self.dmarc_record,
            "ssl_certificate": self.ssl.to_json(),
            "whois": self.whois.to_json(),
            "hosting": self.hosting.to_json(),
            "fetched_via": fetched_via,
            "proxy": proxy,
            "proxy_attempts": self.proxy_attempts,
            "enrichment_errors": self.enrichment_errors(),
        });

        // Split in two to stay clear of the json! macro recursion limit
        if let (Value::Object(base), Value::Object(extra)) = (&mut payload, extra) {
            base.extend(extra);
        }
        payload
    }
}
