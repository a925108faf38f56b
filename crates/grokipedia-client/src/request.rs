//! The three service requests and how their responses are interpreted.
//!
//! Both clients build a [`Request`], hand its URL and parameters to a
//! transport, and pass the resulting [`HttpResponse`] back through
//! [`Request::interpret`]. Everything that does not depend on how the bytes
//! travel lives here.

use grokipedia_core::{GrokipediaError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::transport::HttpResponse;

pub const SEARCH_PATH: &str = "/api/full-text-search";
pub const PAGE_PATH: &str = "/api/page";
pub const EDIT_REQUESTS_PATH: &str = "/api/list-edit-requests-by-slug";

/// One request against the service, with every parameter that shapes the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Search {
        query: String,
        limit: u32,
        offset: u32,
    },
    Page {
        slug: String,
        include_content: bool,
        validate_links: bool,
    },
    EditRequests {
        slug: String,
        limit: u32,
        offset: u32,
    },
}

impl Request {
    pub fn search(query: impl Into<String>, limit: u32, offset: u32) -> Self {
        Request::Search {
            query: query.into(),
            limit,
            offset,
        }
    }

    pub fn page(slug: impl Into<String>, include_content: bool, validate_links: bool) -> Self {
        Request::Page {
            slug: slug.into(),
            include_content,
            validate_links,
        }
    }

    pub fn edit_requests(slug: impl Into<String>, limit: u32, offset: u32) -> Self {
        Request::EditRequests {
            slug: slug.into(),
            limit,
            offset,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Request::Search { .. } => SEARCH_PATH,
            Request::Page { .. } => PAGE_PATH,
            Request::EditRequests { .. } => EDIT_REQUESTS_PATH,
        }
    }

    /// Full endpoint URL under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Query string parameters in the order the service documents them.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Request::Search {
                query,
                limit,
                offset,
            } => vec![
                ("query", query.clone()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
            Request::Page {
                slug,
                include_content,
                validate_links,
            } => vec![
                ("slug", slug.clone()),
                ("includeContent", include_content.to_string()),
                ("validateLinks", validate_links.to_string()),
            ],
            Request::EditRequests {
                slug,
                limit,
                offset,
            } => vec![
                ("slug", slug.clone()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        }
    }

    /// Deterministic cache key built from the request kind and all parameters.
    ///
    /// The key is not yet file-name safe; the cache sanitizes it on storage.
    pub fn cache_key(&self) -> String {
        match self {
            Request::Search {
                query,
                limit,
                offset,
            } => format!("search:{}:{}:{}", query, limit, offset),
            Request::Page {
                slug,
                include_content,
                validate_links,
            } => format!("page:{}:{}:{}", slug, include_content, validate_links),
            Request::EditRequests {
                slug,
                limit,
                offset,
            } => format!("edit_requests:{}:{}:{}", slug, limit, offset),
        }
    }

    /// Short description for log lines.
    pub fn describe(&self) -> String {
        match self {
            Request::Search { query, .. } => format!("search '{}'", query),
            Request::Page { slug, .. } => format!("page '{}'", slug),
            Request::EditRequests { slug, .. } => format!("edit requests for '{}'", slug),
        }
    }

    /// Map a raw HTTP response onto parsed JSON or one typed failure.
    pub fn interpret(&self, response: HttpResponse) -> Result<Value> {
        match response.status {
            429 => {
                return Err(GrokipediaError::rate_limited(format!(
                    "{} rejected with HTTP 429",
                    self.describe()
                )))
            }
            404 => return Err(self.not_found()),
            status if !(200..300).contains(&status) => {
                return Err(GrokipediaError::Api {
                    status,
                    message: response.body,
                })
            }
            _ => {}
        }

        let value: Value = serde_json::from_str(&response.body)?;

        if let Request::Page { .. } = self {
            if value.get("found").and_then(Value::as_bool) != Some(true) {
                return Err(self.not_found());
            }
        }

        Ok(value)
    }

    fn not_found(&self) -> GrokipediaError {
        match self {
            Request::Search { .. } => GrokipediaError::not_found("Search endpoint not found"),
            Request::Page { slug, .. } => {
                GrokipediaError::not_found(format!("Page not found: {}", slug))
            }
            Request::EditRequests { slug, .. } => {
                GrokipediaError::not_found(format!("Edit requests not found for: {}", slug))
            }
        }
    }
}

/// Decode parsed JSON into a typed response.
///
/// A missing required field surfaces as `Malformed`.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T> {
    Ok(T::deserialize(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grokipedia_core::{ErrorKind, PageResponse, SearchResponse};
    use serde_json::json;

    fn ok(body: Value) -> HttpResponse {
        HttpResponse::new(200, body.to_string())
    }

    #[test]
    fn test_urls_and_params() {
        let req = Request::page("Rust", true, false);
        assert_eq!(req.url("https://grokipedia.com/"), "https://grokipedia.com/api/page");
        assert_eq!(
            req.query_params(),
            vec![
                ("slug", "Rust".to_string()),
                ("includeContent", "true".to_string()),
                ("validateLinks", "false".to_string()),
            ]
        );

        let req = Request::search("rust lang", 12, 0);
        assert_eq!(req.url("http://localhost:8080"), "http://localhost:8080/api/full-text-search");
        assert_eq!(req.query_params()[0], ("query", "rust lang".to_string()));
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(Request::search("a/b c", 5, 0).cache_key(), "search:a/b c:5:0");
        assert_eq!(Request::page("Rust", true, true).cache_key(), "page:Rust:true:true");
        assert_eq!(
            Request::edit_requests("Rust", 10, 20).cache_key(),
            "edit_requests:Rust:10:20"
        );
        assert_ne!(
            Request::page("Rust", false, true).cache_key(),
            Request::page("Rust", true, true).cache_key()
        );
    }

    #[test]
    fn test_status_mapping() {
        let req = Request::search("x", 1, 0);

        let err = req.interpret(HttpResponse::new(429, "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);

        let err = req.interpret(HttpResponse::new(404, "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        match req.interpret(HttpResponse::new(503, "maintenance")).unwrap_err() {
            GrokipediaError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_body_is_service_error() {
        let err = Request::search("x", 1, 0)
            .interpret(HttpResponse::new(200, "<html>oops</html>"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Service);
    }

    #[test]
    fn test_page_found_false_is_not_found() {
        let req = Request::page("Missing", true, true);

        let err = req
            .interpret(ok(json!({"found": false, "page": null})))
            .unwrap_err();
        assert!(matches!(err, GrokipediaError::NotFound(ref msg) if msg == "Page not found: Missing"));

        let err = req.interpret(ok(json!({"page": {"slug": "Missing"}}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_search_passes_json_through() {
        let body = json!({"results": [{"title": "Rust", "slug": "Rust"}], "total": 1});
        let value = Request::search("rust", 12, 0).interpret(ok(body.clone())).unwrap();
        assert_eq!(value, body);

        let typed: SearchResponse = decode(&value).unwrap();
        assert_eq!(typed.results.len(), 1);
        assert_eq!(typed.extra.get("total"), Some(&json!(1)));
    }

    #[test]
    fn test_decode_minimal_page() {
        let value = json!({"found": true, "page": {"slug": "X", "title": "T", "content": "C"}});
        let typed: PageResponse = decode(&value).unwrap();
        assert!(typed.found);
        assert!(typed.page.citations.is_empty());
        assert!(typed.page.images.is_empty());
        assert!(typed.page.metadata.is_none());
        assert!(typed.page.stats.is_none());
    }
}
