//! In-memory TTL cache using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use local_places_core::{traits::ResponseCache, Result};

/// Default time-to-live for entries stored without an explicit TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default period of the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(120);

/// Cache entry with its expiry deadline.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Generic TTL key/value store.
///
/// Every read checks expiry itself, so a stale entry is never returned even
/// if no sweeper runs. Uses `tokio::time::Instant`, which lets tests move
/// the clock with `tokio::time::advance`.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the one-hour default TTL.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom default TTL.
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        tracing::info!(default_ttl_secs = default_ttl.as_secs(), "Cache store initialized");
        Self {
            entries: DashMap::new(),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a live value. An expired entry is removed and reads as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = key, "Cache HIT");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = key, expired = expired, "Cache MISS");
        None
    }

    /// Store a value, overwriting any existing entry.
    ///
    /// `None` or a zero TTL means the default TTL.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> bool {
        let ttl = ttl.filter(|t| !t.is_zero()).unwrap_or(self.default_ttl);
        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            tracing::error!(key = key, ttl_secs = ttl.as_secs(), "Cache FAILED TO SET: TTL overflows the clock");
            return false;
        };

        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
        tracing::debug!(key = key, ttl_secs = ttl.as_secs(), "Cache SET");
        true
    }

    /// Delete one key.
    pub fn delete(&self, key: &str) -> usize {
        self.delete_many([key])
    }

    /// Delete several keys, returning how many existed.
    pub fn delete_many<I, K>(&self, keys: I) -> usize
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut removed = Vec::new();
        for key in keys {
            if self.entries.remove(key.as_ref()).is_some() {
                removed.push(key.as_ref().to_string());
            }
        }
        tracing::debug!(keys = ?removed, count = removed.len(), "Cache DEL");
        removed.len()
    }

    /// Whether a live entry exists. Same expiry rules as `get`, without
    /// touching the hit counters.
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let present = self
            .entries
            .get(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false);
        if !present {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        present
    }

    /// Remove every entry.
    pub fn flush(&self) {
        self.entries.clear();
        tracing::debug!("Cache FLUSHED");
    }

    /// Keys currently held, including entries not yet swept.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries. Returns how many were evicted.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::debug!(evicted = evicted, "Cache sweep evicted expired entries");
        }
        evicted
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Start a background task that purges expired entries every `period`.
    ///
    /// The task stops when the returned handle is dropped or the cache is
    /// gone. Must be called within a Tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> SweeperHandle {
        let cache: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match cache.upgrade() {
                    Some(cache) => {
                        cache.purge_expired();
                    }
                    None => break,
                }
            }
        });
        tracing::debug!(period_secs = period.as_secs(), "Cache sweeper started");
        SweeperHandle { task }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries held, including expired ones not yet swept.
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Owns the sweeper task; aborts it on drop.
#[derive(Debug)]
pub struct SweeperHandle {
    task: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl ResponseCache for TtlCache<Value> {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(TtlCache::get(self, key))
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<bool> {
        Ok(TtlCache::set(self, key, value, ttl))
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        Ok(self.delete_many(keys))
    }

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(TtlCache::has(self, key))
    }

    async fn flush(&self) -> Result<()> {
        TtlCache::flush(self);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(TtlCache::keys(self))
    }
}
