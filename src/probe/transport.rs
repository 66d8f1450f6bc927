//! Page transport.
//!
//! [`PageTransport`] performs one HTTP GET, directly or through an HTTP
//! proxy. The production implementation uses `reqwest`; tests substitute a
//! scripted transport.

use std::fmt;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use thiserror::Error;
use url::Url;

use crate::config::{BROWSER_HEADERS, MAX_RESPONSE_BODY_SIZE, PROXY_REQUEST_TIMEOUT_SECS, TCP_CONNECT_TIMEOUT_SECS};

/// A proxy candidate, `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyAddr(String);

impl ProxyAddr {
    /// Parses one `host:port` line; anything else is rejected.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (host, port) = line.rsplit_once(':')?;
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return None;
        }
        port.parse::<u16>().ok().filter(|p| *p != 0)?;
        Some(Self(line.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProxyAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One GET to perform.
#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub url: &'a Url,
    pub user_agent: &'a str,
    pub cookie_header: Option<String>,
    pub proxy: Option<&'a ProxyAddr>,
}

/// A fetched page. The body is capped at the response size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub final_url: Url,
    /// Header names are lowercase; repeated headers appear repeatedly
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// Bytes read from the wire, after decompression and capping
    pub body_bytes: usize,
    pub elapsed: Duration,
}

impl PageResponse {
    /// First value of header `name` (lowercase).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .filter(|(n, _)| n == "set-cookie")
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("invalid proxy {0}")]
    InvalidProxy(String),

    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return TransportError::Timeout;
        }
        // reqwest's Display omits the underlying cause
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        TransportError::Request(message)
    }
}

/// Performs single page fetches.
pub trait PageTransport: Send + Sync {
    fn fetch<'a>(
        &'a self,
        request: PageRequest<'a>,
    ) -> BoxFuture<'a, Result<PageResponse, TransportError>>;
}

/// `reqwest`-backed transport.
///
/// Direct requests reuse one pooled client. Each proxied request gets its own
/// short-lived client, since a `reqwest::Client` binds its proxy at build time.
pub struct ReqwestTransport {
    direct: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(direct: reqwest::Client) -> Self {
        Self { direct }
    }

    fn proxied_client(proxy: &ProxyAddr) -> Result<reqwest::Client, TransportError> {
        let proxy_url = format!("http://{proxy}");
        let proxy = reqwest::Proxy::all(&proxy_url)
            .map_err(|_| TransportError::InvalidProxy(proxy.to_string()))?;
        reqwest::Client::builder()
            .proxy(proxy)
            .timeout(Duration::from_secs(PROXY_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(TransportError::from)
    }

    fn request_headers(request: &PageRequest<'_>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in BROWSER_HEADERS {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        if let Ok(ua) = HeaderValue::from_str(request.user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        if let Some(cookie) = request
            .cookie_header
            .as_deref()
            .and_then(|c| HeaderValue::from_str(c).ok())
        {
            headers.insert(COOKIE, cookie);
        }
        headers
    }

    async fn execute(&self, request: PageRequest<'_>) -> Result<PageResponse, TransportError> {
        let client = match request.proxy {
            Some(proxy) => Self::proxied_client(proxy)?,
            None => self.direct.clone(),
        };

        let started = Instant::now();
        let mut response = client
            .get(request.url.clone())
            .headers(Self::request_headers(&request))
            .send()
            .await?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect();

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = MAX_RESPONSE_BODY_SIZE - bytes.len();
            if chunk.len() >= room {
                bytes.extend_from_slice(&chunk[..room]);
                log::debug!(
                    "Body of {} truncated at {} bytes",
                    final_url,
                    MAX_RESPONSE_BODY_SIZE
                );
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        let elapsed = started.elapsed();

        Ok(PageResponse {
            status,
            final_url,
            headers,
            body_bytes: bytes.len(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
            elapsed,
        })
    }
}

impl PageTransport for ReqwestTransport {
    fn fetch<'a>(
        &'a self,
        request: PageRequest<'a>,
    ) -> BoxFuture<'a, Result<PageResponse, TransportError>> {
        self.execute(request).boxed()
    }
}
