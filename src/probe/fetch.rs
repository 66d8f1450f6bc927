//! Resilient fetch with proxy fallback.
//!
//! A direct request goes out with a rotated user agent and browser-like
//! headers. If the target answers with the blocking status, candidates from
//! the proxy source are shuffled and tried one at a time under a
//! `tokio_retry` strategy, with a jittered pause between attempts, until one
//! gets a non-blocking answer or the attempt budget runs out.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::seq::{IndexedRandom, SliceRandom};
use thiserror::Error;
use tokio_retry::strategy::{jitter, FixedInterval};
use tokio_retry::Retry;
use url::Url;

use super::cookies::CookieJar;
use super::proxy::ProxySource;
use super::transport::{PageRequest, PageResponse, PageTransport, ProxyAddr, TransportError};
use crate::config::{
    ServeConfig, BLOCKING_STATUS, DEFAULT_PROXY_ATTEMPTS, MIN_PROXY_CANDIDATES, PROXY_DELAY_MAX_MS,
    PROXY_DELAY_MIN_MS, USER_AGENT_POOL,
};

/// Retry budget and pacing for the proxy fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_proxy_attempts: usize,
    pub min_candidates: usize,
    pub delay_min: Duration,
    pub delay_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_proxy_attempts: DEFAULT_PROXY_ATTEMPTS,
            min_candidates: MIN_PROXY_CANDIDATES,
            delay_min: Duration::from_millis(PROXY_DELAY_MIN_MS),
            delay_max: Duration::from_millis(PROXY_DELAY_MAX_MS),
        }
    }
}

impl From<&ServeConfig> for RetryPolicy {
    fn from(config: &ServeConfig) -> Self {
        Self {
            max_proxy_attempts: config.proxy_attempts,
            min_candidates: MIN_PROXY_CANDIDATES,
            delay_min: Duration::from_millis(config.proxy_delay_min_ms),
            delay_max: Duration::from_millis(config.proxy_delay_max_ms),
        }
    }
}

impl RetryPolicy {
    /// Pauses between proxy attempts: `delay_min` plus up to
    /// `delay_max - delay_min` of jitter, one fewer than `attempts`.
    pub fn proxy_delays(&self, attempts: usize) -> impl Iterator<Item = Duration> {
        let (lo, hi) = if self.delay_min <= self.delay_max {
            (self.delay_min, self.delay_max)
        } else {
            (self.delay_max, self.delay_min)
        };
        let spread = hi - lo;
        FixedInterval::new(lo)
            .map(move |base| base + jitter(spread))
            .take(attempts.saturating_sub(1))
    }
}

/// Where the accepted response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOrigin {
    Direct,
    /// Proxy-derived content is untrusted and tagged as such in the payload
    Proxy(ProxyAddr),
}

impl FetchOrigin {
    pub fn is_proxy(&self) -> bool {
        matches!(self, FetchOrigin::Proxy(_))
    }
}

/// An accepted response and how it was obtained.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: PageResponse,
    pub origin: FetchOrigin,
    /// Client cookies plus everything set along the way
    pub cookies: CookieJar,
    /// True if the direct attempt hit the blocking status
    pub blocked: bool,
    pub proxy_attempts: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The direct request never produced a response.
    #[error("Request failed: {0}")]
    Direct(TransportError),

    /// Blocked directly and no proxy attempt got through.
    #[error("Access denied (HTTP {status}) and {attempts} proxy attempt(s) failed")]
    Exhausted { status: u16, attempts: usize },
}

/// Why a single proxy attempt did not count as a success.
#[derive(Error, Debug)]
enum AttemptError {
    #[error("blocked")]
    Blocked,
    #[error("{0}")]
    Transport(TransportError),
    #[error("no candidate left")]
    NoCandidate,
}

/// Mutable state shared by the proxy attempts of one fetch.
struct AttemptState {
    jar: CookieJar,
    attempts: usize,
    remaining: std::vec::IntoIter<ProxyAddr>,
}

fn random_user_agent() -> &'static str {
    USER_AGENT_POOL
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Mozilla/5.0")
}

pub struct ResilientFetcher {
    transport: Arc<dyn PageTransport>,
    proxies: Arc<dyn ProxySource>,
    policy: RetryPolicy,
}

impl ResilientFetcher {
    pub fn new(
        transport: Arc<dyn PageTransport>,
        proxies: Arc<dyn ProxySource>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            proxies,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url`, falling back to proxies when the direct request is
    /// blocked.
    ///
    /// Any non-blocking direct response is returned as-is, whatever its
    /// status. Proxy transport errors count as failed attempts.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Direct` if the direct request fails at the
    /// transport level, and `FetchError::Exhausted` if it was blocked and no
    /// candidate got through (including when there were no candidates).
    pub async fn fetch(&self, url: &Url, cookies: CookieJar) -> Result<FetchOutcome, FetchError> {
        let mut jar = cookies;

        let direct = self
            .transport
            .fetch(PageRequest {
                url,
                user_agent: random_user_agent(),
                cookie_header: jar.header_value(),
                proxy: None,
            })
            .await
            .map_err(FetchError::Direct)?;
        for cookie in direct.set_cookies() {
            jar.absorb_set_cookie(cookie);
        }

        if direct.status != BLOCKING_STATUS {
            return Ok(FetchOutcome {
                response: direct,
                origin: FetchOrigin::Direct,
                cookies: jar,
                blocked: false,
                proxy_attempts: 0,
            });
        }

        log::warn!("{url} answered {BLOCKING_STATUS}; falling back to proxies");

        let exhausted = |attempts| FetchError::Exhausted {
            status: BLOCKING_STATUS,
            attempts,
        };
        if self.policy.max_proxy_attempts == 0 {
            return Err(exhausted(0));
        }

        let mut candidates = self.proxies.candidates(self.policy.min_candidates).await;
        candidates.shuffle(&mut rand::rng());
        candidates.truncate(self.policy.max_proxy_attempts);
        if candidates.is_empty() {
            log::warn!("{url}: no proxy candidates available");
            return Err(exhausted(0));
        }

        let budget = candidates.len();
        let state = Mutex::new(AttemptState {
            jar,
            attempts: 0,
            remaining: candidates.into_iter(),
        });
        let result = Retry::spawn(self.policy.proxy_delays(budget), || {
            self.try_next_proxy(url, &state)
        })
        .await;

        let state = state.into_inner().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok((response, proxy)) => {
                log::info!(
                    "{url} fetched via proxy {proxy} on attempt {}",
                    state.attempts
                );
                Ok(FetchOutcome {
                    response,
                    origin: FetchOrigin::Proxy(proxy),
                    cookies: state.jar,
                    blocked: true,
                    proxy_attempts: state.attempts,
                })
            }
            Err(e) => {
                log::warn!(
                    "{url}: proxy fallback exhausted after {} attempt(s), last: {e}",
                    state.attempts
                );
                Err(exhausted(state.attempts))
            }
        }
    }

    /// One proxy attempt with the next shuffled candidate. Cookies set by the
    /// answer are kept whether or not it was blocked.
    async fn try_next_proxy(
        &self,
        url: &Url,
        state: &Mutex<AttemptState>,
    ) -> Result<(PageResponse, ProxyAddr), AttemptError> {
        let (proxy, cookie_header) = {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            let proxy = state.remaining.next().ok_or(AttemptError::NoCandidate)?;
            state.attempts += 1;
            (proxy, state.jar.header_value())
        };

        let response = self
            .transport
            .fetch(PageRequest {
                url,
                user_agent: random_user_agent(),
                cookie_header,
                proxy: Some(&proxy),
            })
            .await
            .map_err(|e| {
                log::debug!("Proxy {proxy} failed: {e}");
                AttemptError::Transport(e)
            })?;

        {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            for cookie in response.set_cookies() {
                state.jar.absorb_set_cookie(cookie);
            }
        }
        if response.status == BLOCKING_STATUS {
            log::debug!("Proxy {proxy} was blocked too");
            return Err(AttemptError::Blocked);
        }
        Ok((response, proxy))
    }
}
