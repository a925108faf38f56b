//! HTTP clients for the Grokipedia encyclopedia service.
//!
//! Two variants share one request pipeline:
//! cache lookup, retried network call, response interpretation, cache store
//! and typed decoding.
//!
//! - [`GrokipediaClient`] blocks the calling thread (cargo feature `blocking`)
//! - [`AsyncGrokipediaClient`] runs on tokio and adds bounded fan-out helpers
//!
//! Responses are cached through the [`ResponseCache`] capability. With the
//! `cache` feature enabled, `grokipedia_cache::FileCache` implements it.

mod async_client;
#[cfg(feature = "blocking")]
mod blocking;
mod cache;
mod request;
pub mod retry;
mod transport;

pub use async_client::AsyncGrokipediaClient;
#[cfg(feature = "blocking")]
pub use blocking::GrokipediaClient;
pub use cache::ResponseCache;
pub use request::{decode, Request, EDIT_REQUESTS_PATH, PAGE_PATH, SEARCH_PATH};
pub use retry::{RateLimitPolicy, RetryPolicy};
#[cfg(feature = "blocking")]
pub use transport::BlockingReqwestTransport;
pub use transport::{BlockingTransport, HttpResponse, ReqwestTransport, Transport};

pub use grokipedia_core::{
    Citation, EditRequest, EditRequestsResponse, ErrorKind, GrokipediaError, Image, Page,
    PageMetadata, PageResponse, PageStats, Result, SearchResponse, SearchResult,
    SupportingEvidence,
};

use std::time::Duration;

/// Production origin of the service.
pub const DEFAULT_BASE_URL: &str = "https://grokipedia.com";

/// Per-request timeout of the blocking client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request timeout of the async client.
pub const DEFAULT_ASYNC_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_SEARCH_LIMIT: u32 = 12;
pub const DEFAULT_EDIT_REQUESTS_LIMIT: u32 = 10;

/// Default bound on simultaneously in-flight requests.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

const MAX_IN_FLIGHT_CAP: usize = 50;

/// Configuration shared by both clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Service origin, without a trailing path.
    pub base_url: String,
    /// Timeout for each individual HTTP call.
    pub timeout: Duration,
    pub user_agent: String,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimitPolicy,
    /// Admission gate size of the async client.
    pub max_in_flight: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            retry: RetryPolicy::default(),
            rate_limit: RateLimitPolicy::default(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for the async client, which allows longer requests.
    pub fn for_async() -> Self {
        Self::default().with_timeout(DEFAULT_ASYNC_TIMEOUT)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitPolicy) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Set the admission gate size.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max.clamp(1, MAX_IN_FLIGHT_CAP);
        self
    }

    /// The retry policy with rate-limit retries switched on only under
    /// [`RateLimitPolicy::Retry`].
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .clone()
            .with_retry_rate_limited(matches!(self.rate_limit, RateLimitPolicy::Retry))
    }
}

fn default_user_agent() -> String {
    format!("grokipedia/{}", env!("CARGO_PKG_VERSION"))
}
