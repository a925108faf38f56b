//! File-backed record storage, one JSON file per key

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::entry::CacheEntry;
use crate::key::sanitize_key;

/// Cache storage manager
pub struct CacheStorage {
    /// Root cache directory
    cache_dir: PathBuf,
}

impl CacheStorage {
    /// Create a new cache storage with the given directory
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();

        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)
                .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        }

        Ok(Self { cache_dir })
    }

    /// Path of the record for `key`
    ///
    /// Example: search:a/b c:5:0 -> cache_dir/search_a_b_c_5_0.json
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Check if a record exists
    pub fn exists(&self, key: &str) -> bool {
        self.entry_path(key).exists()
    }

    /// Read the record for `key`
    ///
    /// Returns `Ok(None)` when no record exists and an error when the record
    /// cannot be read or parsed.
    pub fn read(&self, key: &str) -> Result<Option<CacheEntry>> {
        let path = self.entry_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let entry: CacheEntry = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache entry: {}", path.display()))?;

        Ok(Some(entry))
    }

    /// Write the record for `key`, replacing any previous one
    pub fn write(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let path = self.entry_path(key);

        let content = serde_json::to_string_pretty(entry)
            .context("Failed to serialize cache entry")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

        log::debug!("Cache entry saved: {}", path.display());

        Ok(())
    }

    /// Delete the record for `key`; returns whether a file was removed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);

        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete cache file: {}", path.display()))?;
            log::debug!("Cache entry deleted: {}", path.display());
            return Ok(true);
        }

        Ok(false)
    }

    /// Size in bytes of the record for `key`
    pub fn size_of(&self, key: &str) -> Result<u64> {
        let path = self.entry_path(key);
        let metadata = fs::metadata(&path)
            .with_context(|| format!("Failed to stat cache file: {}", path.display()))?;
        Ok(metadata.len())
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// All record files directly inside the cache directory
    pub fn record_files(&self) -> Vec<PathBuf> {
        walkdir::WalkDir::new(&self.cache_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .map(|e| e.into_path())
            .collect()
    }

    /// Calculate total record size in bytes
    pub fn total_size(&self) -> u64 {
        self.record_files()
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|metadata| metadata.len())
            .sum()
    }

    /// Count records
    pub fn entry_count(&self) -> usize {
        self.record_files().len()
    }

    /// Remove every record
    pub fn clear_all(&self) -> Result<usize> {
        let mut removed = 0;

        for path in self.record_files() {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to delete cache file: {}", path.display()))
                }
            }
        }

        Ok(removed)
    }
}
