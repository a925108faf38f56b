//! `search` command

use anyhow::Result;
use grokipedia_client::{AsyncGrokipediaClient, SearchResponse, SearchResult, Transport};
use std::fmt::Write;

use crate::cli::ui::truncate_chars;

const SNIPPET_CHARS: usize = 100;

pub async fn run_search_command<T: Transport>(
    client: &AsyncGrokipediaClient<T>,
    query: &str,
    limit: u32,
    offset: u32,
    json: bool,
    snippet: bool,
) -> Result<()> {
    let response = client.search(query, limit, offset).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_search(query, &response, snippet));
    }

    Ok(())
}

pub fn render_search(query: &str, response: &SearchResponse, snippet: bool) -> String {
    let mut out = format!(
        "\nFound {} results for '{}':\n\n",
        response.results.len(),
        query
    );
    out.push_str(&render_hits(&response.results, snippet));
    out
}

/// Numbered listing of search hits
pub fn render_hits(results: &[SearchResult], snippet: bool) -> String {
    let mut out = String::new();

    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, result.title);
        let _ = writeln!(out, "   Slug: {}", result.slug);
        let _ = writeln!(out, "   Views: {}", result.view_count);
        if snippet {
            let plain = result.plain_snippet();
            let (head, _) = truncate_chars(&plain, SNIPPET_CHARS);
            let _ = writeln!(out, "   Snippet: {}...", head);
        }
        out.push('\n');
    }

    out
}
