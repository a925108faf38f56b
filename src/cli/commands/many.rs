//! Fan-out commands: `search-many` and `get-many`

use anyhow::Result;
use grokipedia_client::{AsyncGrokipediaClient, Page, Transport};
use std::fmt::Write;

use super::search::render_hits;
use crate::cli::ui::StatusPrinter;

pub async fn run_search_many_command<T: Transport>(
    client: &AsyncGrokipediaClient<T>,
    queries: &[String],
    limit: u32,
    json: bool,
) -> Result<()> {
    let results = client.search_many(queries, limit).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render_hits(&results, false));
    }

    StatusPrinter::new().info(
        "Searched",
        &format!("{} queries, {} results", queries.len(), results.len()),
    );
    Ok(())
}

pub async fn run_get_many_command<T: Transport>(
    client: &AsyncGrokipediaClient<T>,
    slugs: &[String],
    include_content: bool,
    json: bool,
) -> Result<()> {
    let pages = client.get_many_pages(slugs, include_content).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
    } else {
        print!("{}", render_page_list(&pages));
    }

    let printer = StatusPrinter::new();
    let skipped = slugs.len().saturating_sub(pages.len());
    if skipped > 0 {
        printer.warning("Skipped", &format!("{} of {} pages could not be fetched", skipped, slugs.len()));
    } else {
        printer.success("Fetched", &format!("{} pages", pages.len()));
    }
    Ok(())
}

pub fn render_page_list(pages: &[Page]) -> String {
    let mut out = String::new();
    for page in pages {
        let _ = writeln!(out, "{} ({})", page.title, page.slug);
        let _ = writeln!(
            out,
            "   Words: {}  Citations: {}  Images: {}",
            page.word_count(),
            page.citations.len(),
            page.images.len()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_page_list() {
        let pages: Vec<Page> = serde_json::from_value(json!([
            {"slug": "Rust", "title": "Rust", "content": "a systems language"},
            {"slug": "Go", "title": "Go"}
        ]))
        .unwrap();

        let text = render_page_list(&pages);

        assert_eq!(
            text,
            "Rust (Rust)\n   Words: 3  Citations: 0  Images: 0\nGo (Go)\n   Words: 0  Citations: 0  Images: 0\n"
        );
    }
}
