//! Proxy candidate sources.
//!
//! Candidates come from public, unauthenticated lists with one `ip:port` per
//! line. Content fetched through them is untrusted.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use regex::Regex;

use super::transport::ProxyAddr;
use crate::config::{MAX_PROXY_LIST_SIZE, PROXY_LIST_TIMEOUT_SECS};

/// Supplies proxy candidates for the fallback path.
pub trait ProxySource: Send + Sync {
    /// Gathers candidates, stopping once at least `min` are known or every
    /// source has been consulted. May return fewer than `min`, or none.
    fn candidates(&self, min: usize) -> BoxFuture<'_, Vec<ProxyAddr>>;
}

/// Leading `host:port` token of an annotated list line (`1.2.3.4:80 US-H +`).
static LEADING_ADDR: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9.\-]+:\d{1,5})(?:\s|$)")
        .map_err(|e| log::error!("Invalid proxy line pattern: {e}"))
        .ok()
});

/// Parses a proxy list body, skipping blank, commented and malformed lines.
///
/// Anything after the address on a line (country, anonymity flags) is
/// ignored.
pub fn parse_proxy_list(text: &str) -> Vec<ProxyAddr> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match LEADING_ADDR.as_ref() {
            Some(re) => re
                .captures(line)
                .and_then(|caps| caps.get(1))
                .and_then(|addr| ProxyAddr::parse(addr.as_str())),
            None => ProxyAddr::parse(line),
        })
        .collect()
}

/// Downloads the configured public proxy lists in order.
pub struct PublicProxyLists {
    client: reqwest::Client,
    sources: Vec<String>,
    max_list_bytes: usize,
}

impl PublicProxyLists {
    pub fn new(client: reqwest::Client, sources: Vec<String>) -> Self {
        Self {
            client,
            sources,
            max_list_bytes: MAX_PROXY_LIST_SIZE,
        }
    }

    pub fn with_max_list_bytes(mut self, max_list_bytes: usize) -> Self {
        self.max_list_bytes = max_list_bytes;
        self
    }

    /// Downloads one list, reading at most `max_list_bytes`. A truncated
    /// body loses its trailing partial line.
    async fn fetch_list(&self, source: &str) -> Result<String, reqwest::Error> {
        let mut response = self
            .client
            .get(source)
            .timeout(Duration::from_secs(PROXY_LIST_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = self.max_list_bytes - bytes.len();
            if chunk.len() >= room {
                bytes.extend_from_slice(&chunk[..room]);
                let keep = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
                bytes.truncate(keep);
                log::debug!(
                    "Proxy list {} truncated at {} bytes",
                    source,
                    self.max_list_bytes
                );
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn collect(&self, min: usize) -> Vec<ProxyAddr> {
        let mut seen: HashSet<ProxyAddr> = HashSet::new();
        let mut candidates = Vec::new();

        for source in &self.sources {
            if candidates.len() >= min {
                break;
            }
            match self.fetch_list(source).await {
                Ok(body) => {
                    let before = candidates.len();
                    for proxy in parse_proxy_list(&body) {
                        if seen.insert(proxy.clone()) {
                            candidates.push(proxy);
                        }
                    }
                    log::debug!(
                        "Proxy list {} contributed {} candidate(s)",
                        source,
                        candidates.len() - before
                    );
                }
                Err(e) => log::warn!("Failed to fetch proxy list {source}: {e}"),
            }
        }

        log::info!("Collected {} proxy candidate(s)", candidates.len());
        candidates
    }
}

impl ProxySource for PublicProxyLists {
    fn candidates(&self, min: usize) -> BoxFuture<'_, Vec<ProxyAddr>> {
        self.collect(min).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_proxy_list() {
        let body = "1.1.1.1:80\n\n# header\n  2.2.2.2:3128  \nnot-a-proxy\n3.3.3.3:99999\n";
        let parsed: Vec<String> = parse_proxy_list(body).iter().map(|p| p.to_string()).collect();
        assert_eq!(parsed, vec!["1.1.1.1:80", "2.2.2.2:3128"]);
    }

    #[test]
    fn test_parse_annotated_proxy_list() {
        let body = "4.4.4.4:8080 US-H-S +\n5.5.5.5:3128\tanonymous\n6.6.6.6:80x\n";
        let parsed: Vec<String> = parse_proxy_list(body).iter().map(|p| p.to_string()).collect();
        assert_eq!(parsed, vec!["4.4.4.4:8080", "5.5.5.5:3128"]);
    }

    #[tokio::test]
    async fn test_collect_stops_once_enough_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1.1.1.1:80\n2.2.2.2:80\n"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("3.3.3.3:80\n"))
            .expect(0)
            .mount(&server)
            .await;

        let lists = PublicProxyLists::new(
            reqwest::Client::new(),
            vec![format!("{}/a.txt", server.uri()), format!("{}/b.txt", server.uri())],
        );
        let candidates = lists.candidates(2).await;
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_list_is_cut_at_a_line_boundary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big.txt"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("1.1.1.1:80\n2.2.2.2:80\n3.3.3.3:8080\n4.4.4.4:80\n"),
            )
            .mount(&server)
            .await;

        // Room for two full lines and "3.3.3.3:8" of the third
        let lists = PublicProxyLists::new(
            reqwest::Client::new(),
            vec![format!("{}/big.txt", server.uri())],
        )
        .with_max_list_bytes(31);
        let parsed: Vec<String> = lists
            .candidates(50)
            .await
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(parsed, vec!["1.1.1.1:80", "2.2.2.2:80"]);
    }

    #[tokio::test]
    async fn test_collect_skips_failed_sources_and_dedups() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down.txt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1.1.1.1:80\n1.1.1.1:80\n"))
            .mount(&server)
            .await;

        let lists = PublicProxyLists::new(
            reqwest::Client::new(),
            vec![format!("{}/down.txt", server.uri()), format!("{}/a.txt", server.uri())],
        );
        let candidates = lists.candidates(50).await;
        assert_eq!(candidates.len(), 1);
    }
}
