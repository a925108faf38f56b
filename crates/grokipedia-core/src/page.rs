//! Page records returned by the `/api/page` endpoint.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// A citation attached to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub favicon: String,
}

/// An image embedded in a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub caption: String,
    pub url: String,
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub width: u32,
    #[serde(default, deserialize_with = "lenient::number")]
    pub height: u32,
}

fn default_position() -> String {
    "CENTER".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub last_modified: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub content_length: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_last_editor")]
    pub last_editor: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub is_redirect: bool,
    #[serde(default)]
    pub redirect_target: String,
    #[serde(default)]
    pub is_withheld: bool,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_last_editor() -> String {
    "system".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            last_modified: String::new(),
            content_length: String::new(),
            version: default_version(),
            last_editor: default_last_editor(),
            language: default_language(),
            is_redirect: false,
            redirect_target: String::new(),
            is_withheld: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    #[serde(default = "default_views", deserialize_with = "lenient::string")]
    pub total_views: String,
    #[serde(default = "default_views", deserialize_with = "lenient::string")]
    pub recent_views: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub daily_avg_views: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quality_score: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub last_viewed: String,
}

pub(crate) fn default_views() -> String {
    "0".to_string()
}

impl Default for PageStats {
    fn default() -> Self {
        Self {
            total_views: default_views(),
            recent_views: default_views(),
            daily_avg_views: 0.0,
            quality_score: 0.0,
            last_viewed: String::new(),
        }
    }
}

/// A full encyclopedia page, identified by its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PageStats>,
    #[serde(default)]
    pub description: String,
}

impl Page {
    /// Number of whitespace-separated words in the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    pub fn is_redirect(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.is_redirect)
    }
}

/// Body of a successful page lookup.
///
/// Only constructed when the service reported `found: true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse {
    pub found: bool,
    pub page: Page,
}
