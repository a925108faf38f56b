//! Response cache capability used by both clients.

use serde_json::Value;

/// Advisory store for successful responses, keyed by [`Request::cache_key`].
///
/// Implementations must treat failures as misses; the clients never fail a
/// request because the cache misbehaved.
///
/// [`Request::cache_key`]: crate::Request::cache_key
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: &Value);
}

#[cfg(feature = "cache")]
impl ResponseCache for grokipedia_cache::FileCache {
    fn get(&self, key: &str) -> Option<Value> {
        grokipedia_cache::FileCache::get(self, key)
    }

    fn set(&self, key: &str, value: &Value) {
        grokipedia_cache::FileCache::set(self, key, value);
    }
}
