//! Cache record layout and diagnostics

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current time as fractional Unix seconds.
pub fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// A stored value and the moment it was written.
///
/// On disk this is `{"timestamp": <unix seconds>, "value": <json>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Creation time in Unix seconds
    pub timestamp: f64,

    /// The cached JSON value, stored as received
    pub value: Value,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn new(value: Value) -> Self {
        Self::with_timestamp(value, now_secs())
    }

    pub fn with_timestamp(value: Value, timestamp: f64) -> Self {
        Self { timestamp, value }
    }

    /// Seconds elapsed since creation
    pub fn age_secs(&self) -> f64 {
        now_secs() - self.timestamp
    }

    /// An entry is expired once it is strictly older than the TTL
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age_secs() > ttl.as_secs_f64()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros((self.timestamp * 1_000_000.0) as i64)
    }
}

/// Read-only diagnostics for one cache record
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub key: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    pub age_secs: f64,
    pub expires_in_secs: f64,
    pub expired: bool,
    pub size_bytes: u64,
}

impl CacheInfo {
    pub fn age_hours(&self) -> f64 {
        self.age_secs / 3600.0
    }

    pub fn age_days(&self) -> f64 {
        self.age_secs / 86_400.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_entry_creation() {
        let entry = CacheEntry::new(json!({"results": []}));

        assert!(entry.age_secs() >= 0.0);
        assert!(entry.age_secs() < 5.0);
        assert!(!entry.is_expired(Duration::from_secs(60)));
        assert!(entry.created_at().is_some());
    }

    #[test]
    fn test_entry_expiry() {
        let entry = CacheEntry::with_timestamp(json!(1), now_secs() - 120.0);

        assert!(entry.is_expired(Duration::from_secs(60)));
        assert!(!entry.is_expired(Duration::from_secs(600)));
    }

    #[test]
    fn test_on_disk_layout() {
        let entry = CacheEntry::with_timestamp(json!({"a": 1}), 1_700_000_000.5);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value, json!({"timestamp": 1_700_000_000.5, "value": {"a": 1}}));
    }
}
