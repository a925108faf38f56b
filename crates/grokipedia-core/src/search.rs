//! Full-text search records.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;
use crate::page::default_views;

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// One hit of a full-text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub relevance_score: f64,
    #[serde(default = "default_views", deserialize_with = "lenient::string")]
    pub view_count: String,
    #[serde(default)]
    pub title_highlights: Vec<String>,
    #[serde(default)]
    pub snippet_highlights: Vec<String>,
}

impl SearchResult {
    /// Snippet with highlight markup removed.
    pub fn plain_snippet(&self) -> String {
        HTML_TAG.replace_all(&self.snippet, "").into_owned()
    }
}

/// Body of a `/api/full-text-search` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    /// Top-level keys the client does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
