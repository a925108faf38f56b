use clap::{Parser, Subcommand};
use std::path::PathBuf;

use grokipedia_client::{DEFAULT_EDIT_REQUESTS_LIMIT, DEFAULT_SEARCH_LIMIT};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Search and read Grokipedia from the command line",
    long_about = None,
    after_help = "Examples:\n  grokipedia search \"Python programming\"\n  grokipedia search \"machine learning\" --limit 20\n  grokipedia get United_Petroleum --citations\n  grokipedia get \"Python_(programming_language)\" --full"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file merged over the user and project config files
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Service origin (default: https://grokipedia.com)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bypass the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Cache directory (default: ~/.grokipedia_cache)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for articles
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Output JSON format
        #[arg(long)]
        json: bool,

        /// Show snippet in results
        #[arg(long)]
        snippet: bool,
    },

    /// Get a specific page by slug
    Get {
        /// Page slug (e.g. "United_Petroleum")
        slug: String,

        /// Exclude content
        #[arg(long)]
        no_content: bool,

        /// Do not validate links
        #[arg(long)]
        no_validate_links: bool,

        /// Show citations
        #[arg(long)]
        citations: bool,

        /// Show full content without truncation
        #[arg(long)]
        full: bool,

        /// Output JSON format
        #[arg(long)]
        json: bool,
    },

    /// List edit requests filed against a page
    Edits {
        /// Page slug
        slug: String,

        #[arg(long, default_value_t = DEFAULT_EDIT_REQUESTS_LIMIT)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Output JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run several searches concurrently and merge the hits
    SearchMany {
        /// Search queries
        #[arg(required = true)]
        queries: Vec<String>,

        /// Maximum number of results per query
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,

        /// Output JSON format
        #[arg(long)]
        json: bool,
    },

    /// Fetch several pages concurrently
    GetMany {
        /// Page slugs
        #[arg(required = true)]
        slugs: Vec<String>,

        /// Exclude content
        #[arg(long)]
        no_content: bool,

        /// Output JSON format
        #[arg(long)]
        json: bool,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show or generate configuration
    Config {
        /// Print the default configuration as TOML
        #[arg(long)]
        generate: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheAction {
    /// Show cache statistics
    Stats,

    /// Delete every cached response
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete expired and unreadable entries now
    Purge,

    /// Show diagnostics for one cache key
    Info {
        /// Cache key, e.g. "search:rust:12:0"
        key: String,
    },
}
