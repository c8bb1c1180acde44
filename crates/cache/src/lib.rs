//! `ledgeriq-cache` — request-scoped TTL cache for computed metrics.
//!
//! Entries hold a serialized snapshot plus its computation timestamp and
//! expire after a fixed window (reference: 5 minutes). Eviction is lazy: a
//! stale entry is dropped on the next `get` that touches it; there is no
//! background sweeper.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// One cached computation. Owned exclusively by `TtlCache`.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    computed_at: DateTime<Utc>,
}

/// Key→entry map with a fixed expiry window.
///
/// Keys are `metric name + FilterSpec::canonical_key()`, so distinct filters
/// never collide and identical filters always hit.
#[derive(Debug)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl TtlCache {
    /// Cache with the reference 5-minute window.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(5))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch and deserialize a live entry; MISS when absent or expired.
    ///
    /// An expired entry is evicted here rather than resurrected; a
    /// subsequent `get` for the same key stays a MISS until the next `set`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.write().ok()?;
        let entry = entries.get(key)?;

        if Utc::now() - entry.computed_at >= self.ttl {
            entries.remove(key);
            return None;
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(err) => {
                // Shape drift between writer and reader; drop the entry.
                tracing::warn!(key, %err, "evicting undeserializable cache entry");
                entries.remove(key);
                None
            }
        }
    }

    /// Store a computed result, replacing any previous entry wholesale.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(key, %err, "failed to serialize value for cache");
                return;
            }
        };

        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.to_string(),
                CacheEntry {
                    value,
                    computed_at: Utc::now(),
                },
            );
        }
    }

    /// Remove one entry, or wipe the whole cache when `key` is `None`
    /// (administrative cache-busting).
    pub fn clear(&self, key: Option<&str>) {
        if let Ok(mut entries) = self.entries.write() {
            match key {
                Some(key) => {
                    entries.remove(key);
                }
                None => entries.clear(),
            }
        }
    }

    /// Number of live-or-stale entries currently held.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}
