//! Redis implementation of ResponseCache.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde_json::Value;
use std::time::Duration;

use local_places_core::{traits::ResponseCache, Error, Result};

/// Redis-backed response cache. Entries expire through Redis' own TTLs, so
/// `get` and `has` agree with expiry without extra bookkeeping.
pub struct RedisResponseCache {
    client: Client,
    prefix: String,
    default_ttl: Duration,
}

impl RedisResponseCache {
    /// Create a new Redis response cache. Does not connect until first use.
    pub fn new(url: &str, prefix: &str, default_ttl: Duration) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| Error::cache(format!("Failed to open Redis client: {}", e)))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            default_ttl,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    fn strip<'a>(&self, full: &'a str) -> &'a str {
        full.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(full)
    }

    fn ttl_secs(&self, ttl: Option<Duration>) -> u64 {
        ttl.filter(|t| !t.is_zero())
            .unwrap_or(self.default_ttl)
            .as_secs()
            .max(1)
    }

    async fn conn(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::cache(format!("Redis connection error: {}", e)))
    }

    async fn scoped_keys(&self, conn: &mut MultiplexedConnection) -> Result<Vec<String>> {
        let pattern = format!("{}:*", self.prefix);
        conn.keys(&pattern)
            .await
            .map_err(|e| Error::cache(format!("Redis keys error: {}", e)))
    }
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.conn().await?;
        let data: Option<String> = conn
            .get(self.key(key))
            .await
            .map_err(|e| Error::cache(format!("Redis get error: {}", e)))?;

        match data {
            Some(json) => {
                let value = serde_json::from_str(&json)
                    .map_err(|e| Error::cache(format!("Corrupt cache entry '{}': {}", key, e)))?;
                tracing::debug!(key = key, "Cache HIT");
                Ok(Some(value))
            }
            None => {
                tracing::debug!(key = key, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<bool> {
        let mut conn = self.conn().await?;
        let json = serde_json::to_string(&value)?;
        let ttl_secs = self.ttl_secs(ttl);

        let _: () = conn
            .set_ex(self.key(key), json, ttl_secs)
            .await
            .map_err(|e| Error::cache(format!("Redis set error: {}", e)))?;

        tracing::debug!(key = key, ttl_secs = ttl_secs, "Cache SET");
        Ok(true)
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn().await?;
        let full: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        let removed: usize = conn
            .del(full)
            .await
            .map_err(|e| Error::cache(format!("Redis delete error: {}", e)))?;

        tracing::debug!(keys = ?keys, count = removed, "Cache DEL");
        Ok(removed)
    }

    async fn has(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        conn.exists(self.key(key))
            .await
            .map_err(|e| Error::cache(format!("Redis exists error: {}", e)))
    }

    async fn flush(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        let keys = self.scoped_keys(&mut conn).await?;
        if !keys.is_empty() {
            let _: usize = conn
                .del(keys)
                .await
                .map_err(|e| Error::cache(format!("Redis delete error: {}", e)))?;
        }
        tracing::debug!(prefix = %self.prefix, "Cache FLUSHED");
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut conn = self.conn().await?;
        let keys = self.scoped_keys(&mut conn).await?;
        Ok(keys.iter().map(|k| self.strip(k).to_string()).collect())
    }
}
