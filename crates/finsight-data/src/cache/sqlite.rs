//! SQLite-backed response cache.

use crate::cache::{CacheStats, ResponseCache};
use crate::error::{DataError, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Durable response cache stored in a single SQLite table.
///
/// Expiry is stored as a Unix timestamp in milliseconds and checked on every
/// read, so stale rows are invisible even before [`SqliteCache::purge_expired`]
/// removes them.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DataError::Cache("cache connection lock poisoned".to_string()))
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS response_cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL,
                cached_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_response_cache_expires ON response_cache(expires_at)",
            [],
        )?;

        Ok(())
    }

    /// Delete every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp_millis();
        let removed = self.conn()?.execute(
            "DELETE FROM response_cache WHERE expires_at <= ?1",
            params![now],
        )?;
        Ok(removed)
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn()?.execute("DELETE FROM response_cache", [])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn()?;

        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))?;
        let expired: i64 = conn.query_row(
            "SELECT COUNT(*) FROM response_cache WHERE expires_at <= ?1",
            params![now],
            |row| row.get(0),
        )?;

        let total = total as usize;
        let expired = expired as usize;
        Ok(CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        })
    }
}

impl ResponseCache for SqliteCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now().timestamp_millis();
        let value = self
            .conn()?
            .query_row(
                "SELECT value FROM response_cache WHERE key = ?1 AND expires_at > ?2",
                params![key, now],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let now = Utc::now();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.timestamp_millis().saturating_add(ttl_ms);

        self.conn()?.execute(
            "INSERT OR REPLACE INTO response_cache (key, value, expires_at, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key, value, expires_at, now.to_rfc3339()],
        )?;
        Ok(())
    }
}
