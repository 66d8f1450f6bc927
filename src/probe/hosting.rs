//! Hosting provider inference.
//!
//! Combines a reverse DNS (PTR) lookup, an IP ownership query against an
//! `ip-api.com` compatible endpoint, well-known platform domains, and CDN
//! response-header fingerprints.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{CDN_HEADER_FINGERPRINTS, HEADER_SERVER, UNKNOWN_IP};
use crate::dns::{reverse_dns_lookup, RecordLookup};
use crate::error_handling::EnrichmentError;

/// Hostname suffixes that identify the hosting platform outright.
const PLATFORM_DOMAINS: &[(&str, &str)] = &[
    ("github.io", "GitHub Pages"),
    ("vercel.app", "Vercel"),
    ("netlify.app", "Netlify"),
    ("herokuapp.com", "Heroku"),
    ("pages.dev", "Cloudflare Pages"),
    ("web.app", "Firebase Hosting"),
    ("firebaseapp.com", "Firebase Hosting"),
    ("blogspot.com", "Google Blogger"),
    ("wixsite.com", "Wix"),
    ("myshopify.com", "Shopify"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostingInfo {
    /// Best guess at who serves the site
    pub provider: Option<String>,
    pub organization: Option<String>,
    pub isp: Option<String>,
    pub asn: Option<String>,
    pub country: Option<String>,
    pub reverse_dns: Option<String>,
    pub cdn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    isp: Option<String>,
    #[serde(default)]
    org: Option<String>,
    #[serde(default, rename = "as")]
    asn: Option<String>,
}

/// Platform implied by the hostname, if any.
pub fn platform_for_host(host: &str) -> Option<&'static str> {
    let host = host.trim_end_matches('.').to_lowercase();
    PLATFORM_DOMAINS
        .iter()
        .find(|(suffix, _)| host == *suffix || host.ends_with(&format!(".{suffix}")))
        .map(|(_, platform)| *platform)
}

/// CDN implied by response headers, if any.
pub fn cdn_from_headers(headers: &[(String, String)]) -> Option<&'static str> {
    for (header, provider) in CDN_HEADER_FINGERPRINTS {
        if headers.iter().any(|(name, _)| name == header) {
            return Some(provider);
        }
    }
    headers
        .iter()
        .find(|(name, value)| name == HEADER_SERVER && value.to_lowercase().contains("cloudflare"))
        .map(|_| "Cloudflare")
}

/// Looks up who hosts an address.
pub struct HostingLookup {
    client: reqwest::Client,
    endpoint: String,
    dns: Arc<dyn RecordLookup>,
}

impl HostingLookup {
    /// `endpoint` is the base URL; the address is appended as a path segment.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, dns: Arc<dyn RecordLookup>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            dns,
        }
    }

    async fn ip_owner(&self, ip: &str) -> Result<IpApiResponse, EnrichmentError> {
        let url = format!(
            "{}/{}?fields=status,message,country,isp,org,as",
            self.endpoint.trim_end_matches('/'),
            ip
        );
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                EnrichmentError::Timeout
            } else {
                EnrichmentError::lookup(e)
            }
        })?;
        let body: IpApiResponse = response
            .error_for_status()
            .map_err(EnrichmentError::lookup)?
            .json()
            .await
            .map_err(EnrichmentError::lookup)?;
        if body.status != "success" {
            return Err(EnrichmentError::Lookup(
                body.message
                    .unwrap_or_else(|| "IP ownership lookup failed".to_string()),
            ));
        }
        Ok(body)
    }

    /// Infers hosting for `host` served from `ip` with response `headers`.
    ///
    /// Platform and CDN fingerprints override the ownership data. The lookup
    /// fails only when nothing at all could be determined.
    pub async fn lookup(
        &self,
        ip: &str,
        host: &str,
        headers: &[(String, String)],
    ) -> Result<HostingInfo, EnrichmentError> {
        let platform = platform_for_host(host);
        let cdn = cdn_from_headers(headers);

        let (reverse_dns, owner) = if ip == UNKNOWN_IP {
            (None, Err(EnrichmentError::Lookup("IP address unknown".to_string())))
        } else {
            tokio::join!(reverse_dns_lookup(ip, self.dns.as_ref()), self.ip_owner(ip))
        };

        let owner = match owner {
            Ok(owner) => Some(owner),
            Err(e) if platform.is_none() && cdn.is_none() && reverse_dns.is_none() => {
                return Err(e);
            }
            Err(e) => {
                log::debug!("IP ownership lookup for {ip} failed: {e}");
                None
            }
        };

        let organization = owner.as_ref().and_then(|o| o.org.clone()).filter(|s| !s.is_empty());
        let isp = owner.as_ref().and_then(|o| o.isp.clone()).filter(|s| !s.is_empty());
        let provider = platform
            .or(cdn)
            .map(str::to_string)
            .or_else(|| organization.clone())
            .or_else(|| isp.clone());

        Ok(HostingInfo {
            provider,
            organization,
            isp,
            asn: owner.as_ref().and_then(|o| o.asn.clone()),
            country: owner.and_then(|o| o.country),
            reverse_dns,
            cdn: cdn.map(str::to_string),
        })
    }
}
