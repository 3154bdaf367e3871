//! Core traits for Local Places.
//!
//! These traits are the seams between the request orchestrator and the
//! components it drives.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::Result;
use crate::types::{ProviderResponse, SearchRequest};

// =============================================================================
// Provider Traits
// =============================================================================

/// Remote place-search provider.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Provider name, used as `sourceApi` and in cache keys.
    fn name(&self) -> &str;

    /// Run one search against the provider.
    ///
    /// Returns every place the provider sent back, unfiltered.
    async fn search(&self, request: &SearchRequest) -> Result<ProviderResponse>;
}

// =============================================================================
// Cache Traits
// =============================================================================

/// TTL key/value cache for serialized responses.
///
/// Callers treat any error as a miss.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Get a live entry. Expired entries read as absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store a value, replacing any previous entry. `None` uses the default TTL.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<bool>;

    /// Delete keys, returning how many were removed.
    async fn delete(&self, keys: &[String]) -> Result<usize>;

    /// Whether a live entry exists.
    async fn has(&self, key: &str) -> Result<bool>;

    /// Remove every entry.
    async fn flush(&self) -> Result<()>;

    /// List current keys. Diagnostic only.
    async fn keys(&self) -> Result<Vec<String>>;
}
