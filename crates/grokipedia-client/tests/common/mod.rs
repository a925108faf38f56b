//! Scripted transport shared by the client integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grokipedia_client::{BlockingTransport, HttpResponse, Result, Transport};
use serde_json::{json, Value};

type Responder = dyn Fn(&str, &[(&'static str, String)]) -> Result<HttpResponse> + Send + Sync;

/// Transport that answers from a closure and records what it saw.
pub struct MockTransport {
    responder: Box<Responder>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    closes: AtomicUsize,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&str, &[(&'static str, String)]) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Self::with_delay(Duration::ZERO, responder)
    }

    /// Each async request stays in flight for `delay` before answering.
    pub fn with_delay<F>(delay: Duration, responder: F) -> Arc<Self>
    where
        F: Fn(&str, &[(&'static str, String)]) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.responder)(url, params)
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl BlockingTransport for MockTransport {
    fn get(&self, url: &str, params: &[(&'static str, String)]) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(url, params)
    }
}

/// Value of query parameter `name`.
pub fn param<'a>(params: &'a [(&'static str, String)], name: &str) -> &'a str {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}

pub fn json_response(status: u16, body: Value) -> Result<HttpResponse> {
    Ok(HttpResponse::new(status, body.to_string()))
}

/// Search body with one hit per title.
pub fn search_body(titles: &[&str]) -> Value {
    let results: Vec<Value> = titles
        .iter()
        .map(|title| {
            json!({
                "title": title,
                "slug": title.replace(' ', "_"),
                "snippet": format!("<em>{}</em> snippet", title),
                "relevanceScore": 1.5,
                "viewCount": 42,
            })
        })
        .collect();
    json!({ "results": results })
}

pub fn page_body(slug: &str) -> Value {
    json!({
        "found": true,
        "page": {
            "slug": slug,
            "title": slug.replace('_', " "),
            "content": format!("# {}\n\nBody text.", slug),
            "citations": [{
                "id": "1",
                "title": "Source",
                "description": "A source",
                "url": "https://example.org/source"
            }]
        }
    })
}

pub fn not_found_body() -> Value {
    json!({ "found": false, "page": null })
}
