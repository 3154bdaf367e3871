#![deny(unused)]
//! Cache store for Local Places.
//!
//! Provides the in-memory TTL store used by default, a Redis-backed
//! alternative, and the deterministic key derivation shared by both.

pub mod keys;
pub mod memory;
pub mod redis;

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use local_places_core::{
    config::{CacheBackend, CacheConfig},
    traits::ResponseCache,
    Error, Result,
};

pub use keys::{generate_cache_key, ParamValue, KEY_DELIMITER};
pub use memory::{CacheStats, SweeperHandle, TtlCache, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
pub use redis::RedisResponseCache;

/// A constructed cache plus whatever keeps it maintained.
pub struct CacheHandle {
    pub cache: Arc<dyn ResponseCache>,
    /// Background sweeper for the in-memory store, if one was started.
    pub sweeper: Option<SweeperHandle>,
}

/// Build the configured cache backend.
///
/// The in-memory sweeper is only started when `sweep_interval_secs > 0`;
/// this must run inside a Tokio runtime in that case.
pub fn build_cache(config: &CacheConfig) -> Result<CacheHandle> {
    let default_ttl = Duration::from_secs(config.default_ttl_secs);

    match config.backend {
        CacheBackend::Memory => {
            let cache = Arc::new(TtlCache::<Value>::with_default_ttl(default_ttl));
            let sweeper = (config.sweep_interval_secs > 0)
                .then(|| cache.spawn_sweeper(Duration::from_secs(config.sweep_interval_secs)));
            Ok(CacheHandle { cache, sweeper })
        }
        CacheBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| Error::config("cache.backend = \"redis\" requires cache.redis_url"))?;
            tracing::info!(url = %url, prefix = %config.redis_prefix, "Initializing Redis cache store");
            let cache = Arc::new(RedisResponseCache::new(url, &config.redis_prefix, default_ttl)?);
            Ok(CacheHandle { cache, sweeper: None })
        }
    }
}
