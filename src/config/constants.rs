//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including timeouts, size limits, proxy sources and the user-agent pool.

use std::time::Duration;

// Paths and addresses (used as defaults)
pub const DB_PATH: &str = "./api_hub.db";
pub const DEFAULT_REGISTRY_PATH: &str = "assets/apis.json";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";

// Network operation timeouts
/// Direct page fetch timeout in seconds
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Timeout for a single request routed through a proxy candidate
pub const PROXY_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Timeout for downloading one proxy list
pub const PROXY_LIST_TIMEOUT_SECS: u64 = 10;
/// DNS query timeout in seconds
/// Most DNS queries complete in <1s, 3s fails fast on unresponsive servers
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;
/// IP ownership lookup timeout in seconds
pub const IP_INFO_TIMEOUT_SECS: u64 = 5;
/// WHOIS/RDAP lookup timeout
pub const WHOIS_TIMEOUT: Duration = Duration::from_secs(15);

// Response and body size limits
/// Maximum response body size in bytes (2MB)
/// Larger bodies are truncated before parsing
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Maximum bytes read from one proxy list; the last partial line is dropped
pub const MAX_PROXY_LIST_SIZE: usize = 512 * 1024;
/// Maximum HTTP header value length in characters (1000 chars)
/// Header values longer than this are truncated in the probe payload
pub const MAX_HEADER_VALUE_LENGTH: usize = 1000;
/// Maximum number of response headers echoed back
pub const MAX_HEADER_COUNT: usize = 100;

// Probe payload limits
pub const MAX_LINKS_IN_PAYLOAD: usize = 50;
pub const MAX_IMAGES_IN_PAYLOAD: usize = 20;

// Resilient fetch
/// Status code treated as an anti-bot block (access denied)
pub const BLOCKING_STATUS: u16 = 403;
/// Proxy attempts made after a blocked direct request
pub const DEFAULT_PROXY_ATTEMPTS: usize = 10;
/// Stop collecting proxy candidates once this many are known
pub const MIN_PROXY_CANDIDATES: usize = 50;
/// Lower bound of the random pause between proxy attempts
pub const PROXY_DELAY_MIN_MS: u64 = 500;
/// Upper bound of the random pause between proxy attempts
pub const PROXY_DELAY_MAX_MS: u64 = 1500;

/// Public proxy lists, one `ip:port` per line.
/// The lists are unauthenticated; anything fetched through them is untrusted.
pub const PROXY_LIST_SOURCES: &[&str] = &[
    "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt",
    "https://raw.githubusercontent.com/monosans/proxy-list/main/proxies/http.txt",
    "https://raw.githubusercontent.com/clarketm/proxy-list/master/proxy-list-raw.txt",
    "https://api.proxyscrape.com/v2/?request=getproxies&protocol=http&timeout=10000&country=all",
];

/// Browser user agents rotated on every request.
pub const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

// Page classification
/// Substrings in the raw body that hint at asynchronous requests
pub const AJAX_INDICATORS: &[&str] = &["XMLHttpRequest", "fetch(", "axios", "jQuery.ajax", "$.ajax"];

// Enrichment
/// Sentinel used when the hostname cannot be resolved
pub const UNKNOWN_IP: &str = "Unknown";
/// IP ownership lookup endpoint (ip-api.com compatible JSON)
pub const IP_INFO_ENDPOINT: &str = "http://ip-api.com/json";

// Auth
/// Query parameter carrying the API key for capabilities
pub const API_KEY_PARAM: &str = "apiKey";

// Chat
/// Number of messages returned by the history endpoint
pub const CHAT_HISTORY_LIMIT: i64 = 50;
