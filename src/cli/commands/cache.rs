//! Cache management commands

use anyhow::Result;
use grokipedia_cache::{CacheInfo, FileCache};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::cli::args::CacheAction;
use crate::cli::ui::StatusPrinter;
use crate::config::CacheConfig;

/// Execute cache command
pub fn handle_cache_command(action: &CacheAction, config: &CacheConfig) -> Result<()> {
    // Management works on the configured directory even when caching is disabled
    let cache = FileCache::new(config.resolved_directory(), Duration::from_secs(config.ttl_secs))?;
    let printer = StatusPrinter::new();

    match action {
        CacheAction::Stats => {
            let stats = cache.stats();
            println!("Cache statistics");
            println!("   Directory: {}", cache.cache_dir().display());
            println!("   Entries: {}", stats.total_entries);
            println!("   Size: {:.1} KB ({} bytes)", stats.total_size_kb(), stats.total_size_bytes);
            println!("   TTL: {} days", config.ttl_secs as f64 / 86_400.0);
            if !config.enabled {
                printer.warning("Disabled", "caching is turned off in the configuration");
            }
        }

        CacheAction::Clear { yes } => {
            let stats = cache.stats();
            printer.warning(
                "Clearing",
                &format!(
                    "{} entries ({:.1} KB) in {}",
                    stats.total_entries,
                    stats.total_size_kb(),
                    cache.cache_dir().display()
                ),
            );

            if !yes && !confirm(&mut io::stdin().lock(), &mut io::stderr())? {
                printer.info("Aborted", "no entries removed");
                return Ok(());
            }

            let removed = cache.clear()?;
            printer.success("Cleared", &format!("{} entries", removed));
        }

        CacheAction::Purge => {
            let stats = cache.purge_expired();
            printer.success(
                "Purged",
                &format!("{} stale entries, freed {} bytes", stats.removed_count, stats.freed_bytes),
            );
        }

        CacheAction::Info { key } => match cache.info(key) {
            Some(info) => print!("{}", render_info(&info)),
            None => anyhow::bail!("No cache entry for key: {}", key),
        },
    }

    Ok(())
}

fn confirm<R: BufRead, W: Write>(input: &mut R, prompt: &mut W) -> Result<bool> {
    write!(prompt, "   Continue? [y/N]: ")?;
    prompt.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

pub fn render_info(info: &CacheInfo) -> String {
    let created = info
        .created
        .map(|c| c.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "Key: {}\nCreated: {}\nAge: {:.1} hours\nExpires in: {:.1} hours\nExpired: {}\nSize: {} bytes\n",
        info.key,
        created,
        info.age_hours(),
        info.expires_in_secs / 3600.0,
        info.expired,
        info.size_bytes
    )
}
