use anyhow::Result;
use clap::Parser;
use grokipedia_client::AsyncGrokipediaClient;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Args, Commands};
use crate::cli::commands::{
    handle_cache_command, handle_config_command, run_edits_command, run_get_command,
    run_get_many_command, run_search_command, run_search_many_command, PageView,
};
use crate::config::GrokipediaConfig;

pub struct RootCommand;

impl RootCommand {
    pub async fn execute() -> Result<()> {
        let args = Args::parse();
        init_logging(args.verbosity);

        let env_vars: HashMap<String, String> = std::env::vars().collect();
        let config = GrokipediaConfig::load_with_precedence(args.config.as_deref(), &args, &env_vars)?;

        match &args.command {
            Commands::Cache { action } => handle_cache_command(action, &config.cache),
            Commands::Config { generate } => handle_config_command(*generate, &config),
            command => {
                let client = build_client(&config)?;
                let result = run_remote_command(&client, command).await;
                client.close();
                result
            }
        }
    }
}

/// Client for the configured service, with the response cache when enabled
pub fn build_client(config: &GrokipediaConfig) -> Result<AsyncGrokipediaClient> {
    let client = AsyncGrokipediaClient::new(config.to_client_config()?);

    match config.cache.open() {
        Ok(Some(cache)) => {
            tracing::debug!("Caching responses in {}", cache.cache_dir().display());
            Ok(client.with_cache(cache))
        }
        Ok(None) => Ok(client),
        Err(e) => {
            tracing::warn!("Cache unavailable, continuing without it: {:#}", e);
            Ok(client)
        }
    }
}

async fn run_remote_command(client: &AsyncGrokipediaClient, command: &Commands) -> Result<()> {
    match command {
        Commands::Search {
            query,
            limit,
            offset,
            json,
            snippet,
        } => run_search_command(client, query, *limit, *offset, *json, *snippet).await,
        Commands::Get {
            slug,
            no_content,
            no_validate_links,
            citations,
            full,
            json,
        } => {
            let view = PageView {
                include_content: !no_content,
                citations: *citations,
                full: *full,
            };
            run_get_command(client, slug, !no_validate_links, view, *json).await
        }
        Commands::Edits {
            slug,
            limit,
            offset,
            json,
        } => run_edits_command(client, slug, *limit, *offset, *json).await,
        Commands::SearchMany {
            queries,
            limit,
            json,
        } => run_search_many_command(client, queries, *limit, *json).await,
        Commands::GetMany {
            slugs,
            no_content,
            json,
        } => run_get_many_command(client, slugs, !no_content, *json).await,
        Commands::Cache { .. } | Commands::Config { .. } => Ok(()),
    }
}

/// Log to stderr; `RUST_LOG` wins over the `-v` count
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
