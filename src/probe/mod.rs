//! Site prober behind the `link_detail` capability.
//!
//! This module provides:
//! - Resilient page fetching with proxy fallback (`fetch`, `transport`, `proxy`)
//! - Per-operation cookie handling (`cookies`)
//! - Technology and hosting inference (`technology`, `hosting`)
//! - The probe report and its JSON payload (`report`)
//!
//! [`SiteProber::probe`] fetches a page, parses it statically, then runs the
//! enrichments (IP, DNS, TLS, WHOIS, hosting) concurrently. No enrichment can
//! fail the probe.

mod cookies;
mod fetch;
mod hosting;
mod proxy;
mod report;
mod technology;
mod transport;

use std::sync::Arc;

use url::Url;

use crate::config::{ServeConfig, IP_INFO_ENDPOINT, PROXY_LIST_SOURCES};
use crate::dns::{
    extract_dmarc_record, extract_spf_record, lookup_all_records, resolve_host_to_ip,
    DnsRecordType, RecordLookup,
};
use crate::error_handling::{
    ApiError, EnrichmentError, ErrorType, InfoType, InitializationError, ServiceStats,
};
use crate::initialization::{init_lookup_client, init_probe_client, init_resolver};
use crate::parse::extract_page_signals;
use crate::tls::{get_ssl_certificate_info, CertificateInfo};
use crate::whois::{lookup_whois, whois_domain, WhoisRecord};

// Re-export public API
pub use cookies::CookieJar;
pub use fetch::{FetchError, FetchOrigin, FetchOutcome, ResilientFetcher, RetryPolicy};
pub use hosting::{cdn_from_headers, platform_for_host, HostingInfo, HostingLookup};
pub use proxy::{parse_proxy_list, ProxySource, PublicProxyLists};
pub use report::{charset_from_content_type, Enrichment, ProbeReport};
pub use technology::detect_technologies;
pub use transport::{
    PageRequest, PageResponse, PageTransport, ProxyAddr, ReqwestTransport, TransportError,
};

/// Prepends `https://` when `raw` has no scheme, then parses it.
///
/// # Errors
///
/// Returns `ApiError::UpstreamFault` if the result is not an absolute
/// http(s) URL with a host.
pub fn normalize_url(raw: &str) -> Result<Url, ApiError> {
    let raw = raw.trim();
    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate)
        .map_err(|e| ApiError::UpstreamFault(format!("Request failed: invalid URL {raw}: {e}")))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::UpstreamFault(format!(
            "Request failed: invalid URL {raw}: missing host"
        )));
    }
    Ok(url)
}

pub struct SiteProber {
    fetcher: ResilientFetcher,
    dns: Arc<dyn RecordLookup>,
    hosting: HostingLookup,
    stats: Arc<ServiceStats>,
    whois_enabled: bool,
}

impl SiteProber {
    pub fn new(
        fetcher: ResilientFetcher,
        dns: Arc<dyn RecordLookup>,
        hosting: HostingLookup,
        stats: Arc<ServiceStats>,
    ) -> Self {
        Self {
            fetcher,
            dns,
            hosting,
            stats,
            whois_enabled: true,
        }
    }

    pub fn with_whois(mut self, enabled: bool) -> Self {
        self.whois_enabled = enabled;
        self
    }

    /// Builds the production prober: `reqwest` transport, public proxy lists,
    /// system DNS and the `ip-api.com` ownership endpoint.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if an HTTP client
    /// cannot be built.
    pub fn from_config(
        config: &ServeConfig,
        stats: Arc<ServiceStats>,
    ) -> Result<Self, InitializationError> {
        let probe_client = init_probe_client(config.timeout_seconds)?;
        let lookup_client = init_lookup_client()?;
        let dns: Arc<dyn RecordLookup> = init_resolver();

        let fetcher = ResilientFetcher::new(
            Arc::new(ReqwestTransport::new(probe_client)),
            Arc::new(PublicProxyLists::new(
                lookup_client.clone(),
                PROXY_LIST_SOURCES.iter().map(|s| s.to_string()).collect(),
            )),
            RetryPolicy::from(config),
        );
        let hosting = HostingLookup::new(lookup_client, IP_INFO_ENDPOINT, Arc::clone(&dns));

        Ok(Self::new(fetcher, dns, hosting, stats).with_whois(!config.skip_whois))
    }

    async fn certificate(&self, url: &Url, host: &str) -> Enrichment<CertificateInfo> {
        if url.scheme() != "https" {
            return Enrichment::NotAttempted;
        }
        let port = url.port_or_known_default().unwrap_or(443);
        get_ssl_certificate_info(host, port)
            .await
            .map_err(|e| {
                log::debug!("TLS inspection of {host}:{port} failed: {e:#}");
                EnrichmentError::lookup(format!("{e:#}"))
            })
            .into()
    }

    async fn whois(&self, host: &str) -> Enrichment<WhoisRecord> {
        if !self.whois_enabled || host.parse::<std::net::IpAddr>().is_ok() {
            return Enrichment::NotAttempted;
        }
        lookup_whois(whois_domain(host)).await.into()
    }

    fn count_enrichment_failures(&self, report: &ProbeReport) {
        for result in report.dns_records.values() {
            if result.is_err() {
                self.stats.increment_error(ErrorType::DnsLookupError);
            }
        }
        if report.ssl.error().is_some() {
            self.stats.increment_error(ErrorType::TlsCertificateError);
        }
        if report.whois.error().is_some() {
            self.stats.increment_error(ErrorType::WhoisLookupError);
        }
        if report.hosting.error().is_some() {
            self.stats.increment_error(ErrorType::HostingLookupError);
        }
    }

    /// Probes `raw_url`.
    ///
    /// # Errors
    ///
    /// - `ApiError::FetchExhausted` if the site blocked us and every proxy
    ///   attempt failed
    /// - `ApiError::UpstreamFault` if the URL is invalid, the direct request
    ///   failed, or the final status is not 200
    pub async fn probe(
        &self,
        raw_url: &str,
        client_cookies: Option<&str>,
    ) -> Result<ProbeReport, ApiError> {
        let url = normalize_url(raw_url)?;
        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
            .unwrap_or_default();
        let jar = client_cookies
            .map(CookieJar::from_client_header)
            .unwrap_or_default();

        let outcome = self.fetcher.fetch(&url, jar).await.map_err(|e| match e {
            FetchError::Exhausted { .. } => {
                self.stats.increment_info(InfoType::BotDetection403);
                ApiError::FetchExhausted(e.to_string())
            }
            FetchError::Direct(_) => ApiError::UpstreamFault(e.to_string()),
        })?;

        if outcome.blocked {
            self.stats.increment_info(InfoType::BotDetection403);
        }
        if outcome.origin.is_proxy() {
            self.stats.increment_info(InfoType::ProxyFallbackSucceeded);
        }

        let FetchOutcome {
            response,
            origin,
            cookies,
            proxy_attempts,
            ..
        } = outcome;

        if response.status != 200 {
            return Err(ApiError::UpstreamFault(format!(
                "Failed to fetch URL. Status code: {}",
                response.status
            )));
        }
        if response.final_url != url {
            self.stats.increment_info(InfoType::HttpRedirect);
        }

        let signals = extract_page_signals(&response.body, &self.stats);
        let technologies = detect_technologies(&response.body, &response.headers);

        let dmarc_name = format!("_dmarc.{host}");
        let (ip_address, dns_records, dmarc_txt, ssl, whois) = tokio::join!(
            resolve_host_to_ip(&host, self.dns.as_ref()),
            lookup_all_records(self.dns.as_ref(), &host),
            self.dns.lookup_records(&dmarc_name, DnsRecordType::TXT),
            self.certificate(&url, &host),
            self.whois(&host),
        );
        let hosting: Enrichment<HostingInfo> = self
            .hosting
            .lookup(&ip_address, &host, &response.headers)
            .await
            .into();

        let spf_record = dns_records
            .get(&DnsRecordType::TXT)
            .and_then(|txt| txt.as_ref().ok())
            .and_then(|txt| extract_spf_record(txt));
        let dmarc_record = dmarc_txt
            .ok()
            .and_then(|txt| extract_dmarc_record(&txt));

        let content_type = response
            .header("content-type")
            .map(str::to_string);

        let report = ProbeReport {
            requested_url: raw_url.to_string(),
            url,
            final_url: response.final_url,
            status_code: response.status,
            hostname: host,
            ip_address,
            content_type,
            content_length: response.body_bytes,
            response_time_ms: response.elapsed.as_secs_f64() * 1000.0,
            headers: response.headers,
            origin,
            proxy_attempts,
            cookies,
            signals,
            technologies,
            dns_records,
            spf_record,
            dmarc_record,
            ssl,
            whois,
            hosting,
        };
        self.count_enrichment_failures(&report);
        Ok(report)
    }
}

#[cfg(test)]
mod tests;
