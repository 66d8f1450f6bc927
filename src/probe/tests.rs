//! Prober tests: proxy fallback behaviour and an end-to-end probe.

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::error_handling::ServiceStats;

/// What the fetcher asked the transport for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SeenRequest {
    proxy: Option<String>,
    cookie_header: Option<String>,
}

/// Answers requests from a queue, in call order.
#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<PageResponse, TransportError>>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<PageResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("lock").clone()
    }
}

impl PageTransport for ScriptedTransport {
    fn fetch<'a>(
        &'a self,
        request: PageRequest<'a>,
    ) -> BoxFuture<'a, Result<PageResponse, TransportError>> {
        self.seen.lock().expect("lock").push(SeenRequest {
            proxy: request.proxy.map(|p| p.to_string()),
            cookie_header: request.cookie_header.clone(),
        });
        let next = self
            .script
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("script exhausted".to_string())));
        async move { next }.boxed()
    }
}

struct FixedProxies(Vec<&'static str>);

impl ProxySource for FixedProxies {
    fn candidates(&self, _min: usize) -> BoxFuture<'_, Vec<ProxyAddr>> {
        let proxies = self.0.iter().filter_map(|p| ProxyAddr::parse(p)).collect();
        async move { proxies }.boxed()
    }
}

/// Counts how often the candidate list is requested.
#[derive(Default)]
struct CountingProxies {
    calls: std::sync::atomic::AtomicUsize,
}

impl ProxySource for CountingProxies {
    fn candidates(&self, _min: usize) -> BoxFuture<'_, Vec<ProxyAddr>> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        async move { ProxyAddr::parse("10.0.0.1:80").into_iter().collect() }.boxed()
    }
}

fn page(status: u16, set_cookie: Option<&str>) -> Result<PageResponse, TransportError> {
    let mut headers = vec![("content-type".to_string(), "text/html".to_string())];
    if let Some(cookie) = set_cookie {
        headers.push(("set-cookie".to_string(), cookie.to_string()));
    }
    Ok(PageResponse {
        status,
        final_url: Url::parse("https://target.example/").expect("url"),
        headers,
        body: "<html><title>t</title></html>".to_string(),
        body_bytes: 29,
        elapsed: Duration::from_millis(5),
    })
}

fn instant_policy(max_proxy_attempts: usize) -> RetryPolicy {
    RetryPolicy {
        max_proxy_attempts,
        min_candidates: 50,
        delay_min: Duration::ZERO,
        delay_max: Duration::ZERO,
    }
}

fn target() -> Url {
    Url::parse("https://target.example/").expect("url")
}

#[tokio::test]
async fn test_blocked_with_no_candidates_is_exhausted_without_attempts() {
    let transport = ScriptedTransport::new(vec![page(403, None)]);
    let fetcher = ResilientFetcher::new(
        transport.clone(),
        Arc::new(FixedProxies(vec![])),
        instant_policy(10),
    );

    let err = fetcher
        .fetch(&target(), CookieJar::default())
        .await
        .expect_err("no proxies to try");

    assert_eq!(err, FetchError::Exhausted { status: 403, attempts: 0 });
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn test_third_proxy_succeeds_after_exactly_three_attempts() {
    let transport = ScriptedTransport::new(vec![
        page(403, None),
        page(403, None),
        Err(TransportError::Timeout),
        page(200, None),
        page(200, None),
    ]);
    let fetcher = ResilientFetcher::new(
        transport.clone(),
        Arc::new(FixedProxies(vec!["10.0.0.1:80", "10.0.0.2:80", "10.0.0.3:80", "10.0.0.4:80"])),
        instant_policy(10),
    );

    let outcome = fetcher
        .fetch(&target(), CookieJar::default())
        .await
        .expect("third proxy gets through");

    assert_eq!(outcome.proxy_attempts, 3);
    assert!(outcome.blocked);
    assert!(outcome.origin.is_proxy());
    let seen = transport.seen();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0].proxy, None);
    assert!(seen[1..].iter().all(|r| r.proxy.is_some()));
    if let FetchOrigin::Proxy(addr) = &outcome.origin {
        assert_eq!(seen[3].proxy.as_deref(), Some(addr.as_str()));
    }
}

#[tokio::test]
async fn test_attempt_budget_is_respected() {
    let transport = ScriptedTransport::new(vec![
        page(403, None),
        page(403, None),
        page(403, None),
        page(200, None),
    ]);
    let fetcher = ResilientFetcher::new(
        transport.clone(),
        Arc::new(FixedProxies(vec!["10.0.0.1:80", "10.0.0.2:80", "10.0.0.3:80"])),
        instant_policy(2),
    );

    let err = fetcher
        .fetch(&target(), CookieJar::default())
        .await
        .expect_err("budget of two is spent");

    assert_eq!(err, FetchError::Exhausted { status: 403, attempts: 2 });
    assert_eq!(transport.seen().len(), 3);
}

#[tokio::test]
async fn test_zero_budget_skips_proxy_gathering() {
    let transport = ScriptedTransport::new(vec![page(403, None)]);
    let proxies = Arc::new(CountingProxies::default());
    let fetcher = ResilientFetcher::new(transport.clone(), proxies.clone(), instant_policy(0));

    let err = fetcher
        .fetch(&target(), CookieJar::default())
        .await
        .expect_err("no budget");

    assert_eq!(err, FetchError::Exhausted { status: 403, attempts: 0 });
    assert_eq!(proxies.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(transport.seen().len(), 1);
}

#[test]
fn test_proxy_delays_stay_in_range_and_pause_between_attempts_only() {
    let policy = RetryPolicy {
        max_proxy_attempts: 5,
        min_candidates: 1,
        delay_min: Duration::from_millis(300),
        delay_max: Duration::from_millis(800),
    };

    let delays: Vec<Duration> = policy.proxy_delays(5).collect();
    assert_eq!(delays.len(), 4);
    assert!(delays
        .iter()
        .all(|d| *d >= Duration::from_millis(300) && *d <= Duration::from_millis(800)));
    assert_eq!(policy.proxy_delays(1).count(), 0);
    assert_eq!(policy.proxy_delays(0).count(), 0);
}

#[tokio::test]
async fn test_non_blocking_direct_response_is_returned_as_is() {
    let transport = ScriptedTransport::new(vec![page(404, None)]);
    let fetcher = ResilientFetcher::new(
        transport.clone(),
        Arc::new(FixedProxies(vec!["10.0.0.1:80"])),
        instant_policy(10),
    );

    let outcome = fetcher
        .fetch(&target(), CookieJar::default())
        .await
        .expect("404 is not a block");

    assert_eq!(outcome.response.status, 404);
    assert_eq!(outcome.origin, FetchOrigin::Direct);
    assert_eq!(outcome.proxy_attempts, 0);
    assert!(!outcome.blocked);
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn test_direct_transport_error_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(TransportError::Request(
        "connection refused".to_string(),
    ))]);
    let fetcher = ResilientFetcher::new(
        transport.clone(),
        Arc::new(FixedProxies(vec!["10.0.0.1:80"])),
        instant_policy(10),
    );

    let err = fetcher
        .fetch(&target(), CookieJar::default())
        .await
        .expect_err("direct failure");

    assert_eq!(
        err.to_string(),
        "Request failed: connection refused"
    );
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn test_cookies_accumulate_across_attempts() {
    let transport = ScriptedTransport::new(vec![
        page(403, Some("challenge=1; Path=/")),
        page(200, Some("session=xyz; HttpOnly")),
    ]);
    let fetcher = ResilientFetcher::new(
        transport.clone(),
        Arc::new(FixedProxies(vec!["10.0.0.1:80"])),
        instant_policy(10),
    );

    let outcome = fetcher
        .fetch(&target(), CookieJar::from_client_header("pref=dark"))
        .await
        .expect("proxy gets through");

    let seen = transport.seen();
    assert_eq!(seen[0].cookie_header.as_deref(), Some("pref=dark"));
    assert_eq!(
        seen[1].cookie_header.as_deref(),
        Some("challenge=1; pref=dark")
    );
    assert_eq!(
        outcome.cookies.header_value().as_deref(),
        Some("challenge=1; pref=dark; session=xyz")
    );
}

#[test]
fn test_normalize_url() {
    assert_eq!(
        normalize_url("example.com").expect("bare host").as_str(),
        "https://example.com/"
    );
    assert_eq!(
        normalize_url("http://example.com/a").expect("http").as_str(),
        "http://example.com/a"
    );
    assert!(matches!(
        normalize_url("https://"),
        Err(ApiError::UpstreamFault(_))
    ));
}

/// Resolves everything to 127.0.0.1 and publishes a DMARC policy.
struct LoopbackDns;

impl RecordLookup for LoopbackDns {
    fn lookup_records<'a>(
        &'a self,
        name: &'a str,
        record_type: DnsRecordType,
    ) -> BoxFuture<'a, Result<Vec<String>, EnrichmentError>> {
        async move {
            match record_type {
                DnsRecordType::A => Ok(vec!["127.0.0.1".to_string()]),
                DnsRecordType::TXT if name.starts_with("_dmarc.") => {
                    Ok(vec!["v=DMARC1; p=none".to_string()])
                }
                DnsRecordType::TXT => Ok(vec!["v=spf1 -all".to_string()]),
                DnsRecordType::MX => Err(EnrichmentError::Timeout),
                _ => Ok(Vec::new()),
            }
        }
        .boxed()
    }

    fn lookup_ip<'a>(&'a self, _host: &'a str) -> BoxFuture<'a, Result<IpAddr, EnrichmentError>> {
        async { Ok(IpAddr::V4(Ipv4Addr::LOCALHOST)) }.boxed()
    }

    fn lookup_ptr(&self, _ip: IpAddr) -> BoxFuture<'_, Result<Option<String>, EnrichmentError>> {
        async { Ok(Some("localhost".to_string())) }.boxed()
    }
}

fn loopback_prober(server: &MockServer, stats: Arc<ServiceStats>) -> SiteProber {
    let dns: Arc<dyn RecordLookup> = Arc::new(LoopbackDns);
    let fetcher = ResilientFetcher::new(
        Arc::new(ReqwestTransport::new(reqwest::Client::new())),
        Arc::new(FixedProxies(vec![])),
        instant_policy(10),
    );
    let hosting = HostingLookup::new(
        reqwest::Client::new(),
        format!("{}/ip", server.uri()),
        Arc::clone(&dns),
    );
    SiteProber::new(fetcher, dns, hosting, stats).with_whois(false)
}

#[tokio::test]
async fn test_probe_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "nginx")
                .set_body_raw(
                    r#"<html><head><title>Shop</title>
                       <meta name="description" content="Things"></head>
                       <body><a href="/a">a</a><a href="/b">b</a>
                       <form action="/s"></form></body></html>"#,
                    "text/html; charset=utf-8",
                ),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ip/127.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "country": "Nowhere",
            "isp": "Loopback ISP",
            "org": "Loopback Org",
            "as": "AS0"
        })))
        .mount(&server)
        .await;

    let stats = Arc::new(ServiceStats::new());
    let prober = loopback_prober(&server, Arc::clone(&stats));
    let report = prober
        .probe(&server.uri(), Some("pref=dark"))
        .await
        .expect("probe succeeds");
    let payload = report.to_payload();

    assert_eq!(payload["status_code"], 200);
    assert_eq!(payload["title"], "Shop");
    assert_eq!(payload["description"], "Things");
    assert_eq!(payload["hostname"], "127.0.0.1");
    assert_eq!(payload["ip_address"], "127.0.0.1");
    assert_eq!(payload["is_dynamic"], true);
    assert_eq!(payload["has_forms"], true);
    assert_eq!(payload["links"], serde_json::json!(["/a", "/b"]));
    assert_eq!(payload["encoding"], "utf-8");
    assert_eq!(payload["redirected"], false);
    assert_eq!(payload["fetched_via"], "direct");
    assert_eq!(payload["cookies"]["pref"], "dark");
    assert_eq!(payload["technologies"], serde_json::json!(["Nginx"]));
    assert_eq!(payload["spf_record"], "v=spf1 -all");
    assert_eq!(payload["dmarc_record"], "v=DMARC1; p=none");
    assert_eq!(payload["hosting"]["provider"], "Loopback Org");
    assert_eq!(payload["hosting"]["reverse_dns"], "localhost");
    assert!(payload["ssl_certificate"].is_null());
    assert!(payload["whois"].is_null());
    assert_eq!(payload["enrichment_errors"]["dns_MX"], "timed out");
    assert_eq!(stats.get_error_count(ErrorType::DnsLookupError), 1);
}

#[tokio::test]
async fn test_probe_non_200_is_upstream_fault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let prober = loopback_prober(&server, Arc::new(ServiceStats::new()));
    let err = prober
        .probe(&format!("{}/missing", server.uri()), None)
        .await
        .expect_err("404 is reported softly");

    assert_eq!(
        err,
        ApiError::UpstreamFault("Failed to fetch URL. Status code: 404".to_string())
    );
}

#[tokio::test]
async fn test_probe_blocked_without_proxies_is_fetch_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let stats = Arc::new(ServiceStats::new());
    let prober = loopback_prober(&server, Arc::clone(&stats));
    let err = prober
        .probe(&server.uri(), None)
        .await
        .expect_err("blocked");

    assert!(matches!(err, ApiError::FetchExhausted(_)));
    assert_eq!(stats.get_info_count(InfoType::BotDetection403), 1);
}
