//! In-process response cache.

use crate::cache::{CacheStats, ResponseCache};
use crate::error::{DataError, Result};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    // None when the TTL overflows `Instant`
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Response cache held in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry.
    pub fn clear_expired(&self) {
        let now = Instant::now();
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| !entry.is_expired(now));
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let (total, expired) = self
            .entries
            .read()
            .map(|entries| {
                let expired = entries.values().filter(|e| e.is_expired(now)).count();
                (entries.len(), expired)
            })
            .unwrap_or((0, 0));

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DataError::Cache("memory cache lock poisoned".to_string()))?;
        let now = Instant::now();

        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now().checked_add(ttl);

        let mut entries = self
            .entries
            .write()
            .map_err(|_| DataError::Cache("memory cache lock poisoned".to_string()))?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_cache_set_get() {
        let cache = MemoryCache::new();
        cache.set("search?query=apple", "[]", Duration::from_secs(60)).unwrap();

        assert_eq!(
            cache.get("search?query=apple").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryCache::new();
        assert!(cache.get("nothing").unwrap().is_none());
    }

    #[test]
    fn test_expired_entries() {
        let cache = MemoryCache::new();
        cache.set("gone", "1", Duration::ZERO).unwrap();
        cache.set("kept", "2", Duration::from_secs(60)).unwrap();

        assert!(cache.get("gone").unwrap().is_none());
        assert_eq!(cache.stats().expired_entries, 1);

        cache.clear_expired();
        let stats = cache.stats();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.active_entries, 1);
    }

    #[test]
    fn test_concurrent_writers_on_same_key() {
        let cache = Arc::new(MemoryCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache
                        .set("eod/AAPL?fmt=json", &i.to_string(), Duration::from_secs(60))
                        .unwrap();
                    cache.get("eod/AAPL?fmt=json").unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }
        assert_eq!(cache.stats().total_entries, 1);
    }
}
