//! Concurrent client with a bounded admission gate.

use std::sync::Arc;

use futures::future::join_all;
use grokipedia_core::{
    EditRequestsResponse, GrokipediaError, Page, PageResponse, Result, SearchResponse,
    SearchResult,
};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::request::{decode, Request};
use crate::retry::{self, RetryPolicy};
use crate::transport::{ReqwestTransport, Transport};
use crate::ClientConfig;

/// Async Grokipedia client.
///
/// Every network attempt holds one permit of a semaphore sized
/// `max_in_flight`, so at most that many requests are outstanding no matter
/// how many callers or fan-out items are waiting. Cache hits take no permit.
pub struct AsyncGrokipediaClient<T: Transport = ReqwestTransport> {
    config: ClientConfig,
    retry: RetryPolicy,
    transport: T,
    cache: Option<Box<dyn ResponseCache>>,
    semaphore: Arc<Semaphore>,
}

impl AsyncGrokipediaClient {
    /// Create a client whose HTTP session opens on first use.
    pub fn new(config: ClientConfig) -> Self {
        let transport = ReqwestTransport::new(config.timeout, config.user_agent.clone());
        Self::with_transport(config, transport)
    }

    /// Create a client and open its HTTP session immediately.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let client = Self::new(config);
        client.transport.connect()?;
        Ok(client)
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }
}

impl<T: Transport> AsyncGrokipediaClient<T> {
    /// Create a client over any async transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
        Self {
            retry: config.retry_policy(),
            config,
            transport,
            cache: None,
            semaphore,
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

    /// Get the number of free admission slots.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Release the HTTP session. Later calls open a fresh one.
    pub fn close(&self) {
        self.transport.close();
    }

    /// Close the admission gate for good and release the HTTP session.
    ///
    /// Requests waiting for a permit, and every later network request, fail
    /// with `GateClosed`. Requests already in flight finish normally and
    /// cache hits are still served.
    pub fn shutdown(&self) {
        debug!("Closing admission gate");
        self.semaphore.close();
        self.transport.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Full-text search.
    pub async fn search(&self, query: &str, limit: u32, offset: u32) -> Result<SearchResponse> {
        self.fetch(&Request::search(query, limit, offset)).await
    }

    /// Fetch one page. Fails with `NotFound` when the service does not know `slug`.
    pub async fn get_page(
        &self,
        slug: &str,
        include_content: bool,
        validate_links: bool,
    ) -> Result<PageResponse> {
        self.fetch(&Request::page(slug, include_content, validate_links))
            .await
    }

    /// Edit requests filed against the page `slug`.
    pub async fn list_edit_requests_by_slug(
        &self,
        slug: &str,
        limit: u32,
        offset: u32,
    ) -> Result<EditRequestsResponse> {
        self.fetch(&Request::edit_requests(slug, limit, offset))
            .await
    }

    /// Search and keep only the hits.
    pub async fn search_pages(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>> {
        Ok(self.search(query, limit, 0).await?.results)
    }

    /// Run one search per query concurrently and concatenate the hits.
    ///
    /// Hits keep the order of `queries`. A failing query is logged and
    /// contributes nothing.
    pub async fn search_many<S: AsRef<str>>(&self, queries: &[S], limit: u32) -> Vec<SearchResult> {
        let searches = queries.iter().map(|query| {
            let query = query.as_ref();
            async move { (query, self.search(query, limit, 0).await) }
        });

        let mut results = Vec::new();
        for (query, outcome) in join_all(searches).await {
            match outcome {
                Ok(response) => results.extend(response.results),
                Err(e) => warn!("Skipping search '{}': {}", query, e),
            }
        }
        results
    }

    /// Fetch many pages concurrently, skipping the ones that fail.
    pub async fn get_many_pages<S: AsRef<str>>(
        &self,
        slugs: &[S],
        include_content: bool,
    ) -> Vec<Page> {
        let fetches = slugs.iter().map(|slug| {
            let slug = slug.as_ref();
            async move { (slug, self.get_page(slug, include_content, true).await) }
        });

        let mut pages = Vec::new();
        for (slug, outcome) in join_all(fetches).await {
            match outcome {
                Ok(response) => pages.push(response.page),
                Err(e) => warn!("Skipping page '{}': {}", slug, e),
            }
        }
        pages
    }

    async fn fetch<R: DeserializeOwned>(&self, request: &Request) -> Result<R> {
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
        let (url, params) = (url.as_str(), params.as_slice());
        let semaphore = &self.semaphore;
        let transport = &self.transport;

        let value = retry::execute(&self.retry, self.config.rate_limit, || async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|_| GrokipediaError::GateClosed)?;
            debug!("Acquired permit for {}", request.describe());

            let response = transport.get(url, params).await?;
            request.interpret(response)
        })
        .await?;

        let typed = decode(&value)?;
        if let Some(cache) = self.cache.as_deref() {
            cache.set(&key, &value);
        }
        Ok(typed)
    }
}
