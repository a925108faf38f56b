//! File cache with a time-to-live for Grokipedia responses
//!
//! Each key maps to one JSON file holding `{timestamp, value}`. Entries older
//! than the store's TTL are treated as absent and removed on the next read.
//! Concurrent writers to the same key are not coordinated; the last write wins.

pub mod cleanup;
pub mod entry;
pub mod key;
pub mod storage;

pub use cleanup::{purge_expired, CleanupStats};
pub use entry::{CacheEntry, CacheInfo};
pub use key::sanitize_key;
pub use storage::CacheStorage;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time-to-live: 7 days
pub const DEFAULT_TTL: Duration = Duration::from_secs(604_800);

/// Directory name used under the home directory when none is configured
pub const DEFAULT_DIR_NAME: &str = ".grokipedia_cache";

/// Main cache interface
pub struct FileCache {
    storage: CacheStorage,
    ttl: Duration,
}

impl FileCache {
    /// Create a cache in `cache_dir` with the given TTL
    pub fn new<P: AsRef<Path>>(cache_dir: P, ttl: Duration) -> Result<Self> {
        let storage = CacheStorage::new(cache_dir)?;
        Ok(Self { storage, ttl })
    }

    /// Create a cache with the default 7 day TTL
    pub fn with_default_ttl<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        Self::new(cache_dir, DEFAULT_TTL)
    }

    /// `~/.grokipedia_cache`, or a relative directory when no home is known
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a cached value
    ///
    /// Missing, expired and unreadable records all read as `None`; expired and
    /// unreadable records are deleted as a side effect.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.storage.read(key) {
            Ok(Some(entry)) if entry.is_expired(self.ttl) => {
                log::debug!("Cache expired: {}", key);
                self.discard(key);
                None
            }
            Ok(Some(entry)) => {
                log::debug!("Cache hit: {}", key);
                Some(entry.value)
            }
            Ok(None) => {
                log::debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                log::warn!("Discarding unreadable cache entry {}: {:#}", key, e);
                self.discard(key);
                None
            }
        }
    }

    /// Get a cached value decoded into `T`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::debug!("Cached value for {} has an unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Store a value
    ///
    /// Values that cannot be represented as JSON, and failed writes, are
    /// logged and skipped. Returns whether the record was written.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to cache value for {}: {}", key, e);
                return false;
            }
        };

        match self.storage.write(key, &CacheEntry::new(value)) {
            Ok(()) => {
                log::debug!("Cache stored: {}", key);
                true
            }
            Err(e) => {
                log::warn!("Failed to cache value for {}: {:#}", key, e);
                false
            }
        }
    }

    /// Delete one entry; absent keys are not an error
    pub fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove(key)?;
        Ok(())
    }

    /// Delete every entry and return how many were removed
    pub fn clear(&self) -> Result<usize> {
        self.storage.clear_all()
    }

    /// Diagnostics for one entry, without modifying it
    pub fn info(&self, key: &str) -> Option<CacheInfo> {
        let entry = self.storage.read(key).ok()??;
        let size_bytes = self.storage.size_of(key).ok()?;
        let age_secs = entry.age_secs();
        let expires_in_secs = self.ttl.as_secs_f64() - age_secs;

        Some(CacheInfo {
            key: key.to_string(),
            timestamp: entry.timestamp,
            created: entry.created_at(),
            age_secs,
            expires_in_secs,
            expired: expires_in_secs < 0.0,
            size_bytes,
        })
    }

    /// Remove expired and unreadable entries now instead of on next read
    pub fn purge_expired(&self) -> CleanupStats {
        cleanup::purge_expired(&self.storage, self.ttl)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let total_size_bytes = self.storage.total_size();

        CacheStats {
            total_entries: self.storage.entry_count(),
            total_size_bytes,
        }
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        self.storage.cache_dir()
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            log::warn!("Failed to remove stale cache entry {}: {:#}", key, e);
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_size_bytes: u64,
}

impl CacheStats {
    pub fn total_size_kb(&self) -> f64 {
        self.total_size_bytes as f64 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::now_secs;
    use serde_json::json;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cache_creation() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::with_default_ttl(temp_dir.path()).unwrap();

        assert!(cache.cache_dir().exists());
        assert_eq!(cache.ttl(), Duration::from_secs(604_800));
    }

    #[test]
    fn test_cache_get_set() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path(), Duration::from_secs(3600)).unwrap();
        let value = json!({"data": "test_value", "n": [1, 2.5, null, true]});

        // Cache miss
        assert!(cache.get("test_key").is_none());

        assert!(cache.set("test_key", &value));

        // Cache hit returns the stored value unchanged
        assert_eq!(cache.get("test_key"), Some(value));
    }

    #[test]
    fn test_expired_entry_is_absent_and_removed() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path(), Duration::from_secs(60)).unwrap();

        let storage = CacheStorage::new(temp_dir.path()).unwrap();
        let written_at = now_secs() - 61.0;
        storage
            .write("search:old:12:0", &CacheEntry::with_timestamp(json!({"results": []}), written_at))
            .unwrap();
        assert!(storage.exists("search:old:12:0"));

        assert!(cache.get("search:old:12:0").is_none());
        assert!(!storage.exists("search:old:12:0"));
    }

    #[test]
    fn test_corrupt_entry_is_absent_and_removed() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::with_default_ttl(temp_dir.path()).unwrap();

        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "not json at all").unwrap();

        assert!(cache.get("broken").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_value_field_counts_as_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::with_default_ttl(temp_dir.path()).unwrap();

        let path = temp_dir.path().join("partial.json");
        fs::write(&path, r#"{"timestamp": 1.0}"#).unwrap();

        assert!(cache.get("partial").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_unrepresentable_value_is_not_written() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::with_default_ttl(temp_dir.path()).unwrap();

        let mut bad: HashMap<(u8, u8), &str> = HashMap::new();
        bad.insert((1, 2), "tuple keys are not JSON object keys");

        assert!(!cache.set("bad", &bad));
        assert!(cache.get("bad").is_none());
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_get_as() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::with_default_ttl(temp_dir.path()).unwrap();

        cache.set("numbers", &vec![1u32, 2, 3]);
        assert_eq!(cache.get_as::<Vec<u32>>("numbers"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get_as::<String>("numbers"), None);
    }

    #[test]
    fn test_delete_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::with_default_ttl(temp_dir.path()).unwrap();

        cache.set("a", &json!(1));
        cache.set("b", &json!(2));

        cache.delete("a").unwrap();
        cache.delete("a").unwrap();
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some(json!(2)));

        assert_eq!(cache.clear().unwrap(), 1);
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_info_does_not_mutate() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(temp_dir.path(), Duration::from_secs(60)).unwrap();

        assert!(cache.info("missing").is_none());

        cache.set("fresh", &json!("v"));
        let info = cache.info("fresh").unwrap();
        assert_eq!(info.key, "fresh");
        assert!(!info.expired);
        assert!(info.expires_in_secs > 0.0 && info.expires_in_secs <= 60.0);
        assert!(info.size_bytes > 0);

        let storage = CacheStorage::new(temp_dir.path()).unwrap();
        storage
            .write("stale", &CacheEntry::with_timestamp(json!("v"), now_secs() - 120.0))
            .unwrap();
        let info = cache.info("stale").unwrap();
        assert!(info.expired);
        assert!(info.age_days() < 1.0);
        // info never deletes, even when expired
        assert!(storage.exists("stale"));
    }

    #[test]
    fn test_cache_stats() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::with_default_ttl(temp_dir.path()).unwrap();

        cache.set("test1", &json!("response1"));
        cache.set("test2", &json!("response2"));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert!(stats.total_size_bytes > 0);
    }

    #[test]
    fn test_default_dir_name() {
        assert!(FileCache::default_dir().ends_with(DEFAULT_DIR_NAME));
    }
}
