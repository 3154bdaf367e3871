//! Foursquare Places (v3) adapter.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use local_places_core::{
    config::FoursquareConfig,
    traits::PlaceProvider,
    types::{
        AddressParts, CategoryKey, Coordinates, PhotoRef, PlaceCategory, ProviderPlace, ProviderPrice,
        ProviderRating, ProviderResponse, SearchRequest,
    },
    Error, Result,
};

use crate::http;

pub const FOURSQUARE: &str = "foursquare";

/// Fields requested from the search endpoint.
const SEARCH_FIELDS: &str = "fsq_id,name,geocodes,location,categories,rating,website,photos,price,description";

/// Foursquare rates places out of 10.
const RATING_SCALE: f64 = 10.0;

/// Foursquare category ids are grouped in blocks of 1000 under a root id
/// (13065 Italian Restaurant sits under 13000 Dining and Drinking).
pub fn category_root(id: u32) -> u32 {
    (id / 1000) * 1000
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct FsqSearchResponse {
    #[serde(default)]
    results: Vec<FsqPlace>,
}

#[derive(Debug, Deserialize)]
struct FsqPlace {
    fsq_id: String,
    name: String,
    #[serde(default)]
    categories: Vec<FsqCategory>,
    geocodes: Option<FsqGeocodes>,
    #[serde(default)]
    location: FsqLocation,
    description: Option<String>,
    rating: Option<f64>,
    website: Option<String>,
    #[serde(default)]
    photos: Vec<FsqPhoto>,
    price: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct FsqCategory {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct FsqGeocodes {
    main: Option<FsqPoint>,
}

#[derive(Debug, Deserialize)]
struct FsqPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
struct FsqLocation {
    address: Option<String>,
    locality: Option<String>,
    region: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FsqPhoto {
    prefix: String,
    suffix: String,
}

impl From<FsqPlace> for ProviderPlace {
    fn from(place: FsqPlace) -> Self {
        let categories = place
            .categories
            .into_iter()
            .map(|c| {
                PlaceCategory::new(CategoryKey::Id(c.id), c.name)
                    .with_parent(CategoryKey::Id(category_root(c.id)))
            })
            .collect();

        ProviderPlace {
            id: place.fsq_id,
            name: place.name,
            description: place.description.filter(|d| !d.trim().is_empty()),
            categories,
            coordinates: place
                .geocodes
                .and_then(|g| g.main)
                .map(|p| Coordinates {
                    latitude: p.latitude,
                    longitude: p.longitude,
                }),
            address: AddressParts {
                street: place.location.address,
                city: place.location.locality,
                state: place.location.region,
                postcode: place.location.postcode,
                country: place.location.country,
            },
            rating: place.rating.map(|value| ProviderRating {
                value,
                scale: RATING_SCALE,
            }),
            price: place.price.map(ProviderPrice::Level),
            website: place.website,
            photos: place
                .photos
                .into_iter()
                .map(|p| PhotoRef::Template {
                    prefix: p.prefix,
                    suffix: p.suffix,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Foursquare place search.
pub struct FoursquareProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<Secret<String>>,
}

impl FoursquareProvider {
    /// Create the adapter. A missing API key is reported here and again on
    /// every search.
    pub fn new(config: &FoursquareConfig, timeout: Duration) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.expose_secret().trim().is_empty());
        if api_key.is_none() {
            tracing::error!(
                "FOURSQUARE_API_KEY is not configured; Foursquare searches will fail until it is set"
            );
        }

        Ok(Self {
            client: http::build_client(FOURSQUARE, timeout)?,
            base_url: http::normalize_base_url(FOURSQUARE, &config.base_url)?,
            api_key,
        })
    }

    fn query_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        match (&request.coordinates, &request.location) {
            (Some((lat, lon)), _) => params.push(("ll", format!("{},{}", lat, lon))),
            (None, Some(near)) => params.push(("near", near.clone())),
            (None, None) => {}
        }
        if let Some(term) = &request.term {
            params.push(("query", term.clone()));
        }
        if let Some(categories) = &request.categories {
            params.push(("categories", categories.clone()));
        }
        params.push(("limit", request.limit.to_string()));
        params.push(("fields", SEARCH_FIELDS.to_string()));
        params
    }
}

#[async_trait]
impl PlaceProvider for FoursquareProvider {
    fn name(&self) -> &str {
        FOURSQUARE
    }

    async fn search(&self, request: &SearchRequest) -> Result<ProviderResponse> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            Error::provider_not_configured(FOURSQUARE, "FOURSQUARE_API_KEY environment variable is not configured")
        })?;

        let url = format!("{}/places/search", self.base_url);
        tracing::info!(
            provider = FOURSQUARE,
            near = ?request.location,
            ll = ?request.coordinates,
            query = ?request.term,
            limit = request.limit,
            "Searching provider"
        );

        let builder = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::AUTHORIZATION, api_key.expose_secret().as_str())
            .query(&Self::query_params(request));

        let body = http::send(FOURSQUARE, builder).await?;
        let parsed: FsqSearchResponse = http::parse_body(FOURSQUARE, &body)?;
        let places: Vec<ProviderPlace> = parsed.results.into_iter().map(ProviderPlace::from).collect();

        tracing::debug!(provider = FOURSQUARE, count = places.len(), "Provider search complete");
        // Foursquare reports no overall total; the page size stands in for it.
        Ok(ProviderResponse::new(FOURSQUARE, places))
    }
}
