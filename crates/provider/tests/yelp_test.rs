//! Yelp adapter against a mocked HTTP API.

use std::time::Duration;

use local_places_core::{
    config::YelpConfig,
    traits::PlaceProvider,
    types::{CategoryKey, ProviderPrice, SearchRequest},
    Error,
};
use local_places_provider::YelpProvider;
use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(base_url: &str) -> YelpProvider {
    let config = YelpConfig {
        base_url: base_url.to_string(),
        api_key: Some(Secret::new("yelp-test-key".into())),
    };
    YelpProvider::new(&config, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_search_parses_businesses_and_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .and(header("Authorization", "Bearer yelp-test-key"))
        .and(query_param("location", "Austin"))
        .and(query_param("term", "tacos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [{
                "id": "y1",
                "name": "Taco Stand",
                "categories": [{"alias": "mexican", "title": "Mexican"}],
                "coordinates": {"latitude": 30.26, "longitude": -97.74},
                "location": {"address1": "1 Main St", "city": "Austin", "state": "TX", "zip_code": "78701"},
                "rating": 4.5,
                "price": "$",
                "url": "https://www.yelp.com/biz/y1",
                "image_url": "https://s3-media.yelp.com/y1.jpg"
            }],
            "total": 240
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SearchRequest::near("Austin").with_term("tacos");
    let response = provider(&server.uri()).search(&request).await.unwrap();

    assert_eq!(response.provider, "yelp");
    assert_eq!(response.total, 240);
    let place = &response.places[0];
    assert_eq!(place.categories[0].key, CategoryKey::alias("mexican"));
    assert_eq!(place.price, Some(ProviderPrice::Symbol("$".into())));
    assert_eq!(place.photos[0].to_url("400x400"), "https://s3-media.yelp.com/y1.jpg");
    assert_eq!(place.address.city.as_deref(), Some("Austin"));
}

#[tokio::test]
async fn test_error_payload_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": "VALIDATION_ERROR",
                "description": "Please specify a location or a latitude and longitude",
                "field": "location"
            }
        })))
        .mount(&server)
        .await;

    let err = provider(&server.uri())
        .search(&SearchRequest::near("Nowhere"))
        .await
        .unwrap_err();

    match err {
        Error::ProviderRejected { status, error, .. } => {
            assert_eq!(status, 400);
            let error = error.unwrap();
            assert_eq!(error.code.as_deref(), Some("VALIDATION_ERROR"));
            assert_eq!(error.field.as_deref(), Some("location"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_total_falls_back_to_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [{"id": "y2", "name": "Somewhere"}]
        })))
        .mount(&server)
        .await;

    let response = provider(&server.uri())
        .search(&SearchRequest::near("Austin"))
        .await
        .unwrap();
    assert_eq!(response.total, 1);
    assert!(response.places[0].categories.is_empty());
}
