//! Foursquare adapter against a mocked HTTP API.

use std::time::Duration;

use local_places_core::{
    config::FoursquareConfig,
    traits::PlaceProvider,
    types::{CategoryKey, PhotoRef, ProviderPrice, SearchRequest},
    Error,
};
use local_places_provider::FoursquareProvider;
use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(base_url: &str, key: Option<&str>) -> FoursquareProvider {
    let config = FoursquareConfig {
        base_url: base_url.to_string(),
        api_key: key.map(|k| Secret::new(k.to_string())),
        photo_size: "400x400".into(),
    };
    FoursquareProvider::new(&config, Duration::from_secs(2)).unwrap()
}

fn sample_body() -> serde_json::Value {
    json!({
        "results": [
            {
                "fsq_id": "p1",
                "name": "Riverside Park",
                "categories": [
                    {"id": 16032, "name": "Park"},
                    {"id": 16019, "name": "Playground"}
                ],
                "geocodes": {"main": {"latitude": 40.8, "longitude": -73.97}},
                "location": {
                    "address": "Riverside Dr",
                    "locality": "New York",
                    "region": "NY",
                    "postcode": "10024",
                    "country": "US"
                },
                "rating": 9.0,
                "photos": [{"prefix": "https://fastly.4sqi.net/img/general/", "suffix": "/p1.jpg"}]
            },
            {
                "fsq_id": "r1",
                "name": "Luigi's",
                "categories": [{"id": 13065, "name": "Italian Restaurant"}],
                "location": {"locality": "New York"},
                "price": 2,
                "website": "https://luigis.example"
            }
        ]
    })
}

#[tokio::test]
async fn test_search_parses_places() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/places/search"))
        .and(header("Authorization", "fsq-test-key"))
        .and(query_param("near", "New York"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server.uri(), Some("fsq-test-key"));
    let response = provider.search(&SearchRequest::near("New York")).await.unwrap();

    assert_eq!(response.provider, "foursquare");
    assert_eq!(response.places.len(), 2);
    assert_eq!(response.total, 2);

    let park = &response.places[0];
    assert_eq!(park.name, "Riverside Park");
    assert_eq!(park.categories.len(), 2);
    assert_eq!(park.categories[0].parent, Some(CategoryKey::Id(16000)));
    assert_eq!(park.rating.unwrap().value, 9.0);
    assert_eq!(park.rating.unwrap().scale, 10.0);
    assert_eq!(
        park.photos[0].to_url("400x400"),
        "https://fastly.4sqi.net/img/general/400x400/p1.jpg"
    );
    assert!(matches!(park.photos[0], PhotoRef::Template { .. }));

    let restaurant = &response.places[1];
    assert_eq!(restaurant.price, Some(ProviderPrice::Level(2)));
    assert!(restaurant.coordinates.is_none());
    assert_eq!(restaurant.website.as_deref(), Some("https://luigis.example"));
}

#[tokio::test]
async fn test_coordinates_sent_as_ll() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/places/search"))
        .and(query_param("ll", "40.7,-74"))
        .and(query_param("query", "coffee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = SearchRequest::near("ignored").with_term("coffee");
    request.coordinates = Some((40.7, -74.0));

    let response = provider(&server.uri(), Some("k")).search(&request).await.unwrap();
    assert!(response.places.is_empty());
    assert_eq!(response.total, 0);
}

#[tokio::test]
async fn test_rejection_forwards_status_and_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/places/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid request token."})))
        .mount(&server)
        .await;

    let err = provider(&server.uri(), Some("bad-key"))
        .search(&SearchRequest::near("Boston"))
        .await
        .unwrap_err();

    match err {
        Error::ProviderRejected {
            provider,
            status,
            error,
            ..
        } => {
            assert_eq!(provider, "foursquare");
            assert_eq!(status, 401);
            assert_eq!(error.unwrap().description, "Invalid request token.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_rejection_keeps_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = provider(&server.uri(), Some("k"))
        .search(&SearchRequest::near("Boston"))
        .await
        .unwrap_err();

    match err {
        Error::ProviderRejected { status, error, raw, .. } => {
            assert_eq!(status, 500);
            assert!(error.is_none());
            assert_eq!(raw, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_payload_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server.uri(), Some("k"))
        .search(&SearchRequest::near("Boston"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProviderPayload { .. }));
}

#[tokio::test]
async fn test_missing_key_fails_without_calling_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
        .expect(0)
        .mount(&server)
        .await;

    let err = provider(&server.uri(), None)
        .search(&SearchRequest::near("Boston"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProviderNotConfigured { .. }));
}

#[tokio::test]
async fn test_unreachable_provider() {
    // Nothing listens on port 9 locally.
    let err = provider("http://127.0.0.1:9", Some("k"))
        .search(&SearchRequest::near("Boston"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProviderUnreachable { .. }));
}
