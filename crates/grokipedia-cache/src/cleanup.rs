//! Eager sweep of expired and unreadable records

use std::fs;
use std::time::Duration;

use crate::entry::CacheEntry;
use crate::storage::CacheStorage;

/// Cleanup statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupStats {
    /// Number of entries removed
    pub removed_count: usize,
    /// Bytes freed
    pub freed_bytes: u64,
}

/// Remove every record that is expired under `ttl` or cannot be parsed.
///
/// Lazy expiry on read already guarantees stale values are never returned;
/// this only reclaims disk space for keys that are no longer requested.
pub fn purge_expired(storage: &CacheStorage, ttl: Duration) -> CleanupStats {
    let mut stats = CleanupStats::default();

    for path in storage.record_files() {
        let stale = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<CacheEntry>(&content) {
                Ok(entry) => entry.is_expired(ttl),
                Err(_) => true,
            },
            Err(_) => true,
        };

        if !stale {
            continue;
        }

        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if fs::remove_file(&path).is_ok() {
            stats.removed_count += 1;
            stats.freed_bytes += size;
            log::debug!("Removed stale cache entry: {}", path.display());
        }
    }

    stats
}
