//! Time-to-live caching of raw provider responses.
//!
//! Keys are canonical request fingerprints and values are the response bodies
//! exactly as the provider sent them. An expired entry reads as a miss; the
//! store enforces expiry on read, so no background eviction is needed.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

use crate::error::Result;
use std::time::Duration;

/// Keyed store of provider responses with per-entry expiry.
///
/// Implementations must tolerate concurrent `get`/`set` on the same key. Racing
/// writers may both fetch upstream; the last `set` wins with a fresh TTL.
pub trait ResponseCache: Send + Sync {
    /// Look up a live entry. A miss is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous entry and restarting
    /// its time-to-live.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Entries currently stored, live or not
    pub total_entries: usize,
    /// Entries past their expiry that have not been purged
    pub expired_entries: usize,
    /// Entries still readable
    pub active_entries: usize,
}
