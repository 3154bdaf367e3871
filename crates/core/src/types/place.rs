//! Provider-neutral view of a raw place record.
//!
//! Adapters parse their provider's JSON into these types, so everything
//! downstream works on explicit optional fields instead of loose payloads.
//! A `ProviderPlace` lives only as long as one response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider category identifier: numeric id or string alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryKey {
    Id(u32),
    Alias(String),
}

impl CategoryKey {
    pub fn alias(alias: impl Into<String>) -> Self {
        Self::Alias(alias.into())
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Alias(alias) => f.write_str(alias),
        }
    }
}

/// One category attached to a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceCategory {
    pub key: CategoryKey,
    pub label: String,
    /// Parent in the provider's own taxonomy. Only adapters for hierarchical
    /// taxonomies fill this in.
    pub parent: Option<CategoryKey>,
}

impl PlaceCategory {
    pub fn new(key: CategoryKey, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: CategoryKey) -> Self {
        if parent != self.key {
            self.parent = Some(parent);
        }
        self
    }

    /// The category key followed by its parent, if any.
    pub fn lookup_keys(&self) -> impl Iterator<Item = &CategoryKey> {
        std::iter::once(&self.key).chain(self.parent.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

/// Rating as reported, together with the scale it was reported on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderRating {
    pub value: f64,
    pub scale: f64,
}

/// Raw price information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPrice {
    Level(u8),
    Symbol(String),
}

/// Reference to a place photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoRef {
    /// URL built as `prefix + size + suffix`.
    Template { prefix: String, suffix: String },
    Url(String),
}

impl PhotoRef {
    pub fn to_url(&self, size: &str) -> String {
        match self {
            Self::Template { prefix, suffix } => format!("{}{}{}", prefix, size, suffix),
            Self::Url(url) => url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPlace {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub categories: Vec<PlaceCategory>,
    pub coordinates: Option<Coordinates>,
    pub address: AddressParts,
    pub rating: Option<ProviderRating>,
    pub price: Option<ProviderPrice>,
    pub website: Option<String>,
    pub photos: Vec<PhotoRef>,
}

impl ProviderPlace {
    /// Minimal place with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            categories: Vec::new(),
            coordinates: None,
            address: AddressParts::default(),
            rating: None,
            price: None,
            website: None,
            photos: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: PlaceCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates {
            latitude,
            longitude,
        });
        self
    }

    pub fn with_rating(mut self, value: f64, scale: f64) -> Self {
        self.rating = Some(ProviderRating { value, scale });
        self
    }
}

/// Parsed search result from one provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    /// Provider name (`sourceApi` of the items built from it).
    pub provider: String,
    pub places: Vec<ProviderPlace>,
    /// Total reported by the provider; falls back to the number of places.
    pub total: u64,
}

impl ProviderResponse {
    pub fn new(provider: impl Into<String>, places: Vec<ProviderPlace>) -> Self {
        let total = places.len() as u64;
        Self {
            provider: provider.into(),
            places,
            total,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }
}
