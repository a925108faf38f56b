//! Synchronous client.

use grokipedia_core::{
    EditRequestsResponse, PageResponse, Result, SearchResponse, SearchResult,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::request::{decode, Request};
use crate::retry::{self, RetryPolicy};
use crate::transport::{BlockingReqwestTransport, BlockingTransport};
use crate::ClientConfig;

/// Blocking Grokipedia client.
///
/// Each call completes before it returns. The HTTP session opens on the
/// first request and is released by [`close`](Self::close), which consumes
/// the client.
pub struct GrokipediaClient<T: BlockingTransport = BlockingReqwestTransport> {
    config: ClientConfig,
    retry: RetryPolicy,
    transport: T,
    cache: Option<Box<dyn ResponseCache>>,
}

impl GrokipediaClient {
    /// Create a client that talks to the service over HTTP.
    pub fn new(config: ClientConfig) -> Self {
        let transport = BlockingReqwestTransport::new(config.timeout, config.user_agent.clone());
        Self::with_transport(config, transport)
    }
}

impl<T: BlockingTransport> GrokipediaClient<T> {
    /// Create a client over any blocking transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            retry: config.retry_policy(),
            config,
            transport,
            cache: None,
        }
    }

    /// Cache successful responses in `cache`.
    pub fn with_cache(mut self, cache: impl ResponseCache + 'static) -> Self {
        self.cache = Some(Box::new(cache));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Full-text search.
    pub fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchResponse> {
        self.fetch(&Request::search(query, limit, offset))
    }

    /// Fetch one page. Fails with `NotFound` when the service does not know `slug`.
    pub fn get_page(
        &self,
        slug: &str,
        include_content: bool,
        validate_links: bool,
    ) -> Result<PageResponse> {
        self.fetch(&Request::page(slug, include_content, validate_links))
    }

    /// Edit requests filed against the page `slug`.
    pub fn list_edit_requests_by_slug(
        &self,
        slug: &str,
        limit: u32,
        offset: u32,
    ) -> Result<EditRequestsResponse> {
        self.fetch(&Request::edit_requests(slug, limit, offset))
    }

    /// Search and keep only the hits.
    pub fn search_pages(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>> {
        Ok(self.search(query, limit, 0)?.results)
    }

    /// Release the HTTP session.
    pub fn close(self) {
        debug!("Closing blocking client for {}", self.config.base_url);
    }

    fn fetch<R: DeserializeOwned>(&self, request: &Request) -> Result<R> {
        let key = request.cache_key();

        if let Some(cache) = self.cache.as_deref() {
            if let Some(hit) = cache.get(&key) {
                match decode(&hit) {
                    Ok(typed) => {
                        debug!("Cache hit for {}", request.describe());
                        return Ok(typed);
                    }
                    Err(e) => debug!("Ignoring cached {}: {}", request.describe(), e),
                }
            }
        }

        let url = request.url(&self.config.base_url);
        let params = request.query_params();

        let value = retry::execute_blocking(&self.retry, self.config.rate_limit, || {
            let response = self.transport.get(&url, &params)?;
            request.interpret(response)
        })?;

        let typed = decode(&value)?;
        if let Some(cache) = self.cache.as_deref() {
            cache.set(&key, &value);
        }
        Ok(typed)
    }
}
