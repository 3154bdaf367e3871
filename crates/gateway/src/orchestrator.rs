//! Cache-aside search orchestration.
//!
//! validate -> cache lookup -> (miss) provider -> classify -> cache write.
//! Cache failures never reach the caller; they read as a miss.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use local_places_classifier::Classifier;
use local_places_core::{
    config::SearchConfig,
    traits::{PlaceProvider, ResponseCache},
    types::{DomainItem, PageParams, ResponseSource, SearchQuery, SearchRequest, SearchResponse},
    Result,
};
use local_places_store::{generate_cache_key, ParamValue};
use local_places_telemetry::{track_cache_lookup, CacheOutcome};

use crate::validation::{validate_query, SearchLimits};

/// Search endpoint settings.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Cache key namespace.
    pub namespace: String,
    /// TTL of cached responses.
    pub response_ttl: Duration,
    pub limits: SearchLimits,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            namespace: "external-items".to_string(),
            response_ttl: Duration::from_secs(3600),
            limits: SearchLimits::default(),
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            response_ttl: Duration::from_secs(config.response_ttl_secs),
            limits: SearchLimits::from(config),
        }
    }
}

/// What gets stored per cache key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedSearch {
    items: Vec<DomainItem>,
    total_results_from_source: u64,
}

/// Runs searches against one provider with a shared response cache.
pub struct PlaceSearchService {
    cache: Arc<dyn ResponseCache>,
    provider: Arc<dyn PlaceProvider>,
    classifier: Classifier,
    settings: SearchSettings,
}

impl PlaceSearchService {
    pub fn new(
        cache: Arc<dyn ResponseCache>,
        provider: Arc<dyn PlaceProvider>,
        classifier: Classifier,
        settings: SearchSettings,
    ) -> Self {
        Self {
            cache,
            provider,
            classifier,
            settings,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Cache key for a validated request. The provider name is part of it.
    pub fn cache_key(&self, request: &SearchRequest) -> String {
        let (latitude, longitude) = match request.coordinates {
            Some((lat, lon)) => (Some(ParamValue::from(lat)), Some(ParamValue::from(lon))),
            None => (None, None),
        };

        generate_cache_key(
            &self.settings.namespace,
            [
                ("location", request.location.as_ref().map(ParamValue::from)),
                ("latitude", latitude),
                ("longitude", longitude),
                ("term", request.term.as_ref().map(ParamValue::from)),
                ("categories", request.categories.as_ref().map(ParamValue::from)),
                ("limit", Some(ParamValue::from(request.limit))),
                ("offset", Some(ParamValue::from(request.offset))),
                ("provider", Some(ParamValue::from(self.provider.name()))),
            ],
        )
    }

    /// Serve one search.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let request = validate_query(query, self.settings.limits)?;
        let key = self.cache_key(&request);
        let page = PageParams {
            limit: request.limit,
            offset: request.offset,
        };

        if let Some(cached) = self.lookup(&key).await {
            return Ok(SearchResponse {
                items: cached.items,
                total_results_from_source: cached.total_results_from_source,
                source: ResponseSource::Cache,
                request_params: page,
            });
        }

        let response = self.provider.search(&request).await?;
        let items = self.classifier.classify_all(&response);
        let cached = CachedSearch {
            items,
            total_results_from_source: response.total,
        };
        self.store(&key, &cached).await;

        Ok(SearchResponse {
            items: cached.items,
            total_results_from_source: cached.total_results_from_source,
            source: ResponseSource::Provider(response.provider),
            request_params: page,
        })
    }

    async fn lookup(&self, key: &str) -> Option<CachedSearch> {
        let namespace = &self.settings.namespace;
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value::<CachedSearch>(value) {
                Ok(cached) => {
                    tracing::debug!(key = %key, "Serving search from cache");
                    track_cache_lookup(namespace, CacheOutcome::Hit);
                    Some(cached)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                    track_cache_lookup(namespace, CacheOutcome::Error);
                    None
                }
            },
            Ok(None) => {
                track_cache_lookup(namespace, CacheOutcome::Miss);
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, fetching live");
                track_cache_lookup(namespace, CacheOutcome::Error);
                None
            }
        }
    }

    async fn store(&self, key: &str, cached: &CachedSearch) {
        let value = match serde_json::to_value(cached) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode search for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, value, Some(self.settings.response_ttl)).await {
            tracing::warn!(key = %key, error = %e, "Cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_places_classifier::CategoryRules;
    use local_places_core::mocks::{MapCache, MockPlaceProvider};
    use local_places_core::types::ProviderResponse;

    fn service(provider: Arc<MockPlaceProvider>) -> PlaceSearchService {
        PlaceSearchService::new(
            Arc::new(MapCache::new()),
            provider,
            Classifier::new(CategoryRules::embedded().unwrap()),
            SearchSettings::default(),
        )
    }

    #[test]
    fn test_cache_key_is_normalized_and_scoped_by_provider() {
        let provider = Arc::new(MockPlaceProvider::constant(ProviderResponse::new("foursquare", vec![])));
        let svc = service(provider);

        let a = validate_query(&SearchQuery::near("CacheCity").with_term("Pizza"), SearchLimits::default()).unwrap();
        let b = validate_query(&SearchQuery::near(" cachecity ").with_term("pizza "), SearchLimits::default()).unwrap();
        assert_eq!(svc.cache_key(&a), svc.cache_key(&b));
        assert_eq!(
            svc.cache_key(&a),
            "external-items:limit=20:location=cachecity:offset=0:provider=foursquare:term=pizza"
        );

        let coords = validate_query(&SearchQuery::at("40.70", "-74"), SearchLimits::default()).unwrap();
        assert_eq!(
            svc.cache_key(&coords),
            "external-items:latitude=40.7:limit=20:longitude=-74:offset=0:provider=foursquare"
        );
    }

    #[tokio::test]
    async fn test_validation_happens_before_provider() {
        let provider = Arc::new(MockPlaceProvider::constant(ProviderResponse::new("foursquare", vec![])));
        let svc = service(provider.clone());

        let err = svc.search(&SearchQuery::at(91, 0)).await.unwrap_err();
        assert!(err.validation_code().is_some());
        assert_eq!(provider.call_count(), 0);
    }
}
