//! Edit-history records from `/api/list-edit-requests-by-slug`.

use serde::{Deserialize, Serialize};

use crate::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportingEvidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A proposed edit to a page and its review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    pub slug: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub edit_type: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub original_content: String,
    #[serde(default)]
    pub proposed_content: String,
    #[serde(default)]
    pub section_title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub upvote_count: i64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub downvote_count: i64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_vote: String,
    #[serde(default)]
    pub edit_start_header: String,
    #[serde(default)]
    pub edit_end_header: String,
    #[serde(default)]
    pub supporting_evidence: Vec<SupportingEvidence>,
}

impl EditRequest {
    pub fn is_reviewed(&self) -> bool {
        self.reviewed_at.is_some() || self.reviewed_by.is_some()
    }

    pub fn net_votes(&self) -> i64 {
        self.upvote_count - self.downvote_count
    }
}

/// One page of edit requests for a slug.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequestsResponse {
    #[serde(default)]
    pub edit_requests: Vec<EditRequest>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_count: u64,
    #[serde(default)]
    pub has_more: bool,
}
