//! HTTP backends for the clients.
//!
//! The clients only need "GET this URL with these parameters and give me the
//! status and body". That capability is a trait so tests can substitute a
//! scripted backend for the network.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use grokipedia_core::{GrokipediaError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::debug;

/// Status code and body text of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Async HTTP GET capability.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse>;

    /// Release the underlying session. The next `get` may open a new one.
    fn close(&self) {}
}

/// Blocking HTTP GET capability.
pub trait BlockingTransport: Send {
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        (**self).get(url, params).await
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<T: BlockingTransport + Sync + ?Sized> BlockingTransport for Arc<T> {
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        (**self).get(url, params)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> GrokipediaError {
    if err.is_timeout() {
        GrokipediaError::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else {
        GrokipediaError::Http(err)
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// [`Transport`] backed by a lazily created `reqwest::Client`.
pub struct ReqwestTransport {
    timeout: Duration,
    user_agent: String,
    session: Mutex<Option<reqwest::Client>>,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            timeout,
            user_agent: user_agent.into(),
            session: Mutex::new(None),
        }
    }

    /// Open the session now instead of on the first request.
    pub fn connect(&self) -> Result<()> {
        self.session().map(|_| ())
    }

    pub fn is_open(&self) -> bool {
        lock(&self.session).is_some()
    }

    fn session(&self) -> Result<reqwest::Client> {
        let mut slot = lock(&self.session);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        debug!("Opening HTTP session (timeout {:?})", self.timeout);
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(default_headers())
            .build()?;
        *slot = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        let client = self.session()?;
        debug!("GET {} {:?}", url, params);

        let response = client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        Ok(HttpResponse { status, body })
    }

    fn close(&self) {
        if lock(&self.session).take().is_some() {
            debug!("HTTP session closed");
        }
    }
}

/// [`BlockingTransport`] backed by a lazily created `reqwest::blocking::Client`.
///
/// Must not be used from inside an async runtime.
#[cfg(feature = "blocking")]
pub struct BlockingReqwestTransport {
    timeout: Duration,
    user_agent: String,
    session: Mutex<Option<reqwest::blocking::Client>>,
}

#[cfg(feature = "blocking")]
impl BlockingReqwestTransport {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Self {
        Self {
            timeout,
            user_agent: user_agent.into(),
            session: Mutex::new(None),
        }
    }

    fn session(&self) -> Result<reqwest::blocking::Client> {
        let mut slot = lock(&self.session);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        debug!("Opening blocking HTTP session (timeout {:?})", self.timeout);
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(default_headers())
            .build()?;
        *slot = Some(client.clone());
        Ok(client)
    }
}

#[cfg(feature = "blocking")]
impl BlockingTransport for BlockingReqwestTransport {
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        let client = self.session()?;
        debug!("GET {} {:?}", url, params);

        let response = client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| map_reqwest_error(e, self.timeout))?;

        Ok(HttpResponse { status, body })
    }
}
