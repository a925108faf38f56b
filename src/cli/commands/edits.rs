//! `edits` command: edit-history listing for one page

use anyhow::Result;
use grokipedia_client::{AsyncGrokipediaClient, EditRequestsResponse, Transport};
use std::fmt::Write;

pub async fn run_edits_command<T: Transport>(
    client: &AsyncGrokipediaClient<T>,
    slug: &str,
    limit: u32,
    offset: u32,
    json: bool,
) -> Result<()> {
    let response = client.list_edit_requests_by_slug(slug, limit, offset).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_edits(slug, offset, &response));
    }

    Ok(())
}

pub fn render_edits(slug: &str, offset: u32, response: &EditRequestsResponse) -> String {
    let mut out = format!(
        "\nEdit requests for '{}' ({} shown, {} total):\n\n",
        slug,
        response.edit_requests.len(),
        response.total_count
    );

    for (i, edit) in response.edit_requests.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", offset as usize + i + 1, edit.status, edit.summary);
        let _ = writeln!(out, "   Type: {}", edit.edit_type);
        if !edit.section_title.is_empty() {
            let _ = writeln!(out, "   Section: {}", edit.section_title);
        }
        let _ = writeln!(
            out,
            "   Votes: +{} / -{} (net {})",
            edit.upvote_count,
            edit.downvote_count,
            edit.net_votes()
        );
        if !edit.created_at.is_empty() {
            let _ = writeln!(out, "   Created: {}", edit.created_at);
        }
        if let Some(reviewer) = &edit.reviewed_by {
            match &edit.review_reason {
                Some(reason) => {
                    let _ = writeln!(out, "   Reviewed by {}: {}", reviewer, reason);
                }
                None => {
                    let _ = writeln!(out, "   Reviewed by {}", reviewer);
                }
            }
        }
        out.push('\n');
    }

    if response.has_more {
        let next = offset as usize + response.edit_requests.len();
        let _ = writeln!(out, "More available: use --offset {}", next);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_edits() {
        let response: EditRequestsResponse = serde_json::from_value(json!({
            "editRequests": [
                {
                    "id": "a1",
                    "slug": "Rust",
                    "status": "APPROVED",
                    "type": "UPDATE",
                    "summary": "Fix release date",
                    "sectionTitle": "History",
                    "upvoteCount": 4,
                    "downvoteCount": 1,
                    "createdAt": "2025-10-28T10:00:00Z",
                    "reviewedBy": "mod",
                    "reviewReason": "Sourced"
                },
                {"id": "a2", "slug": "Rust", "status": "PENDING", "summary": "Typo"}
            ],
            "totalCount": 7,
            "hasMore": true
        }))
        .unwrap();

        let text = render_edits("Rust", 10, &response);

        assert!(text.starts_with("\nEdit requests for 'Rust' (2 shown, 7 total):\n\n"));
        assert!(text.contains("11. [APPROVED] Fix release date\n   Type: UPDATE\n   Section: History\n"));
        assert!(text.contains("   Votes: +4 / -1 (net 3)\n"));
        assert!(text.contains("   Reviewed by mod: Sourced\n"));
        assert!(text.contains("12. [PENDING] Typo\n"));
        assert!(text.ends_with("More available: use --offset 12\n"));
    }

    #[test]
    fn test_render_no_edits() {
        let text = render_edits("Quiet", 0, &EditRequestsResponse::default());
        assert_eq!(text, "\nEdit requests for 'Quiet' (0 shown, 0 total):\n\n");
    }
}
