//! Mock implementations of core traits for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    traits::{PlaceProvider, ResponseCache},
    types::{ProviderResponse, SearchRequest},
    Error, Result,
};

// =============================================================================
// Mock Place Provider
// =============================================================================

enum MockBehavior {
    Respond(Vec<ProviderResponse>),
    Unreachable,
    Rejected { status: u16, raw: String },
}

/// Scripted provider that counts calls.
///
/// Responses are returned in order; the last one repeats once the queue
/// runs out.
pub struct MockPlaceProvider {
    name: String,
    behavior: Mutex<MockBehavior>,
    calls: AtomicUsize,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockPlaceProvider {
    pub fn new(name: impl Into<String>, responses: Vec<ProviderResponse>) -> Self {
        Self::with_behavior(name, MockBehavior::Respond(responses))
    }

    /// Provider that always answers with the same response.
    pub fn constant(response: ProviderResponse) -> Self {
        Self::new(response.provider.clone(), vec![response])
    }

    /// Provider whose every call fails as if the network were down.
    pub fn unreachable(name: impl Into<String>) -> Self {
        Self::with_behavior(name, MockBehavior::Unreachable)
    }

    /// Provider whose every call is rejected with `status`.
    pub fn rejecting(name: impl Into<String>, status: u16, raw: impl Into<String>) -> Self {
        Self::with_behavior(
            name,
            MockBehavior::Rejected {
                status,
                raw: raw.into(),
            },
        )
    }

    fn with_behavior(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior: Mutex::new(behavior),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replace the scripted responses.
    pub fn respond_with(&self, responses: Vec<ProviderResponse>) {
        *self.behavior.lock().unwrap() = MockBehavior::Respond(responses);
    }

    /// Number of `search` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceProvider for MockPlaceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, request: &SearchRequest) -> Result<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let mut behavior = self.behavior.lock().unwrap();
        match &mut *behavior {
            MockBehavior::Respond(responses) => {
                let response = if responses.len() > 1 {
                    responses.remove(0)
                } else {
                    responses
                        .first()
                        .cloned()
                        .unwrap_or_else(|| ProviderResponse::new(self.name.clone(), Vec::new()))
                };
                Ok(response)
            }
            MockBehavior::Unreachable => Err(Error::provider_unreachable(&self.name, "connection refused")),
            MockBehavior::Rejected { status, raw } => Err(Error::ProviderRejected {
                provider: self.name.clone(),
                status: *status,
                error: None,
                raw: raw.clone(),
            }),
        }
    }
}

// =============================================================================
// Failing Cache
// =============================================================================

/// Cache whose reads and writes always fail. Used to check that cache
/// trouble never reaches the client.
#[derive(Default)]
pub struct FailingCache;

#[async_trait]
impl ResponseCache for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Err(Error::cache("backend offline"))
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Option<Duration>) -> Result<bool> {
        Err(Error::cache("backend offline"))
    }

    async fn delete(&self, _keys: &[String]) -> Result<usize> {
        Err(Error::cache("backend offline"))
    }

    async fn has(&self, _key: &str) -> Result<bool> {
        Err(Error::cache("backend offline"))
    }

    async fn flush(&self) -> Result<()> {
        Err(Error::cache("backend offline"))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Err(Error::cache("backend offline"))
    }
}

// =============================================================================
// Map Cache
// =============================================================================

/// Cache without expiry, backed by a plain map. Lets tests plant arbitrary
/// payloads under a key.
#[derive(Default)]
pub struct MapCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl MapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries.lock().unwrap().insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResponseCache for MapCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value, _ttl: Option<Duration>) -> Result<bool> {
        self.insert(key, value);
        Ok(true)
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        let mut entries = self.entries.lock().unwrap();
        Ok(keys.iter().filter(|k| entries.remove(k.as_str()).is_some()).count())
    }

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn flush(&self) -> Result<()> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}
