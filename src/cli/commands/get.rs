//! `get` command

use anyhow::Result;
use grokipedia_client::{AsyncGrokipediaClient, Page, Transport};
use std::fmt::Write;

use crate::cli::ui::{rule, truncate_chars};

const CONTENT_PREVIEW_CHARS: usize = 500;
const CITATION_DESCRIPTION_CHARS: usize = 150;

/// How much of a page to print
#[derive(Debug, Clone, Copy, Default)]
pub struct PageView {
    pub include_content: bool,
    pub citations: bool,
    pub full: bool,
}

pub async fn run_get_command<T: Transport>(
    client: &AsyncGrokipediaClient<T>,
    slug: &str,
    validate_links: bool,
    view: PageView,
    json: bool,
) -> Result<()> {
    let response = client
        .get_page(slug, view.include_content, validate_links)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_page(&response.page, view));
    }

    Ok(())
}

pub fn render_page(page: &Page, view: PageView) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", page.title);
    let _ = writeln!(out, "{}", "=".repeat(page.title.chars().count()));

    if view.include_content {
        let _ = writeln!(out, "\nContent:");
        let _ = writeln!(out, "{}", rule('-', 50));
        let (head, truncated) = truncate_chars(&page.content, CONTENT_PREVIEW_CHARS);
        if truncated && !view.full {
            let _ = writeln!(
                out,
                "{}...\n[Content truncated. Use --full to see complete content]",
                head
            );
        } else {
            let _ = writeln!(out, "{}", page.content);
        }
    }

    let _ = writeln!(out, "\nCitations: {}", page.citations.len());
    if view.citations {
        for citation in &page.citations {
            let _ = writeln!(out, "\n[{}] {}", citation.id, citation.title);
            let _ = writeln!(out, "  {}", citation.url);
            if !citation.description.is_empty() {
                let (head, _) = truncate_chars(&citation.description, CITATION_DESCRIPTION_CHARS);
                let _ = writeln!(out, "  {}...", head);
            }
        }
    }

    let _ = writeln!(out, "\nImages: {}", page.images.len());

    if let Some(stats) = &page.stats {
        let _ = writeln!(out, "\nStatistics:");
        let _ = writeln!(out, "  Total Views: {}", stats.total_views);
        let _ = writeln!(out, "  Daily Average: {:.2}", stats.daily_avg_views);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(content: &str) -> Page {
        serde_json::from_value(json!({
            "slug": "Rust",
            "title": "Rust",
            "content": content,
            "citations": [
                {"id": "1", "title": "Rust Book", "description": "The book", "url": "https://doc.rust-lang.org/book/"}
            ],
            "stats": {"totalViews": 99, "dailyAvgViews": 3.14159}
        }))
        .unwrap()
    }

    #[test]
    fn test_render_page_summary() {
        let view = PageView {
            include_content: true,
            ..PageView::default()
        };
        let text = render_page(&page("Short body."), view);

        assert!(text.starts_with("\nRust\n====\n"));
        assert!(text.contains("\nContent:\n"));
        assert!(text.contains("Short body.\n"));
        assert!(text.contains("\nCitations: 1\n"));
        assert!(!text.contains("[1] Rust Book"));
        assert!(text.contains("\nImages: 0\n"));
        assert!(text.contains("  Total Views: 99\n  Daily Average: 3.14\n"));
    }

    #[test]
    fn test_long_content_truncated_unless_full() {
        let long = "x".repeat(600);
        let mut view = PageView {
            include_content: true,
            ..PageView::default()
        };

        let text = render_page(&page(&long), view);
        assert!(text.contains(&format!("{}...\n[Content truncated", "x".repeat(500))));
        assert!(!text.contains(&"x".repeat(501)));

        view.full = true;
        let text = render_page(&page(&long), view);
        assert!(text.contains(&long));
        assert!(!text.contains("[Content truncated"));
    }

    #[test]
    fn test_citations_listed_on_request() {
        let view = PageView {
            citations: true,
            ..PageView::default()
        };
        let text = render_page(&page(""), view);

        assert!(!text.contains("Content:"));
        assert!(text.contains("\n[1] Rust Book\n  https://doc.rust-lang.org/book/\n  The book...\n"));
    }
}
