//! Yelp Fusion business search adapter.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use local_places_core::{
    config::YelpConfig,
    traits::PlaceProvider,
    types::{
        AddressParts, CategoryKey, Coordinates, PhotoRef, PlaceCategory, ProviderPlace, ProviderPrice,
        ProviderRating, ProviderResponse, SearchRequest,
    },
    Error, Result,
};

use crate::http;

pub const YELP: &str = "yelp";

const RATING_SCALE: f64 = 5.0;

#[derive(Debug, Deserialize)]
struct YelpSearchResponse {
    #[serde(default)]
    businesses: Vec<YelpBusiness>,
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct YelpBusiness {
    id: String,
    name: String,
    #[serde(default)]
    categories: Vec<YelpCategory>,
    coordinates: Option<YelpCoordinates>,
    #[serde(default)]
    location: YelpLocation,
    rating: Option<f64>,
    price: Option<String>,
    url: Option<String>,
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YelpCategory {
    alias: String,
    title: String,
}

/// Yelp sends `null` members for businesses without a geocode.
#[derive(Debug, Deserialize)]
struct YelpCoordinates {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct YelpLocation {
    address1: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<YelpBusiness> for ProviderPlace {
    fn from(business: YelpBusiness) -> Self {
        let coordinates = business.coordinates.and_then(|c| match (c.latitude, c.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        });

        ProviderPlace {
            id: business.id,
            name: business.name,
            description: None,
            categories: business
                .categories
                .into_iter()
                .map(|c| PlaceCategory::new(CategoryKey::Alias(c.alias), c.title))
                .collect(),
            coordinates,
            address: AddressParts {
                street: non_blank(business.location.address1),
                city: non_blank(business.location.city),
                state: non_blank(business.location.state),
                postcode: non_blank(business.location.zip_code),
                country: non_blank(business.location.country),
            },
            rating: business.rating.map(|value| ProviderRating {
                value,
                scale: RATING_SCALE,
            }),
            price: non_blank(business.price).map(ProviderPrice::Symbol),
            website: business.url,
            photos: non_blank(business.image_url)
                .map(PhotoRef::Url)
                .into_iter()
                .collect(),
        }
    }
}

/// Yelp business search.
pub struct YelpProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<Secret<String>>,
}

impl YelpProvider {
    pub fn new(config: &YelpConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.expose_secret().trim().is_empty());
        if api_key.is_none() {
            tracing::error!("YELP_API_KEY is not configured; Yelp searches will fail until it is set");
        }

        Ok(Self {
            client: http::build_client(YELP, timeout)?,
            base_url: http::normalize_base_url(YELP, &config.base_url)?,
            api_key,
        })
    }

    fn query_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        match (&request.coordinates, &request.location) {
            (Some((lat, lon)), _) => {
                params.push(("latitude", lat.to_string()));
                params.push(("longitude", lon.to_string()));
            }
            (None, Some(location)) => params.push(("location", location.clone())),
            (None, None) => {}
        }
        if let Some(term) = &request.term {
            params.push(("term", term.clone()));
        }
        if let Some(categories) = &request.categories {
            params.push(("categories", categories.clone()));
        }
        params.push(("limit", request.limit.to_string()));
        if request.offset > 0 {
            params.push(("offset", request.offset.to_string()));
        }
        params
    }
}

#[async_trait]
impl PlaceProvider for YelpProvider {
    fn name(&self) -> &str {
        YELP
    }

    async fn search(&self, request: &SearchRequest) -> Result<ProviderResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::provider_not_configured(YELP, "YELP_API_KEY environment variable is not configured"))?;

        tracing::info!(
            provider = YELP,
            location = ?request.location,
            coordinates = ?request.coordinates,
            term = ?request.term,
            limit = request.limit,
            offset = request.offset,
            "Searching provider"
        );

        let builder = self
            .client
            .get(format!("{}/businesses/search", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(api_key.expose_secret())
            .query(&Self::query_params(request));

        let body = http::send(YELP, builder).await?;
        let parsed: YelpSearchResponse = http::parse_body(YELP, &body)?;
        let places: Vec<ProviderPlace> = parsed.businesses.into_iter().map(ProviderPlace::from).collect();
        let total = parsed.total.unwrap_or(places.len() as u64);

        tracing::debug!(provider = YELP, count = places.len(), total = total, "Provider search complete");
        Ok(ProviderResponse::new(YELP, places).with_total(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_conversion() {
        let json = r#"{
            "id": "b1",
            "name": "Golden Gate Park",
            "categories": [{"alias": "parks", "title": "Parks"}],
            "coordinates": {"latitude": null, "longitude": null},
            "location": {"address1": "", "city": "San Francisco", "state": "CA", "zip_code": "94117"},
            "rating": 4.5,
            "price": "$$",
            "url": "https://www.yelp.com/biz/b1",
            "image_url": ""
        }"#;
        let raw: YelpBusiness = serde_json::from_str(json).unwrap();
        let place = ProviderPlace::from(raw);

        assert!(place.coordinates.is_none());
        assert!(place.address.street.is_none());
        assert_eq!(place.address.postcode.as_deref(), Some("94117"));
        assert_eq!(place.categories[0].key, CategoryKey::alias("parks"));
        assert!(place.categories[0].parent.is_none());
        assert_eq!(place.price, Some(ProviderPrice::Symbol("$$".into())));
        assert_eq!(place.rating, Some(ProviderRating { value: 4.5, scale: 5.0 }));
        assert!(place.photos.is_empty());
    }

    #[test]
    fn test_query_params() {
        let mut request = SearchRequest::near("Austin").with_term("tacos");
        request.offset = 40;
        let params = YelpProvider::query_params(&request);

        assert!(params.contains(&("location", "Austin".to_string())));
        assert!(params.contains(&("term", "tacos".to_string())));
        assert!(params.contains(&("offset", "40".to_string())));

        request.offset = 0;
        let params = YelpProvider::query_params(&request);
        assert!(!params.iter().any(|(k, _)| *k == "offset"));
    }
}
