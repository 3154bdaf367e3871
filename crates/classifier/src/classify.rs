//! Turns provider places into domain items.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use local_places_core::types::{
    DomainItem, Event, ItemBase, ItemKind, ItemLocation, Park, PriceTier, ProviderPlace, ProviderPrice,
    ProviderRating, ProviderResponse, Restaurant,
};

use crate::rules::{CategoryRules, RuleMatch};

pub const DEFAULT_PHOTO_SIZE: &str = "400x400";

/// Why a place was left out of the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnclassifiedReason {
    NoCategories,
    UnrecognizedCategories,
    /// Every item carries a location, so a place without coordinates is
    /// dropped even when its categories match a rule.
    MissingCoordinates,
}

impl UnclassifiedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCategories => "no_categories",
            Self::UnrecognizedCategories => "unrecognized_categories",
            Self::MissingCoordinates => "missing_coordinates",
        }
    }
}

impl fmt::Display for UnclassifiedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one place.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Classified(DomainItem),
    Unclassified(UnclassifiedReason),
}

impl Classification {
    pub fn into_item(self) -> Option<DomainItem> {
        match self {
            Self::Classified(item) => Some(item),
            Self::Unclassified(_) => None,
        }
    }
}

/// Rescale a rating onto 1-5, one decimal place.
///
/// Non-positive ratings or scales mean "not rated".
pub fn normalize_rating(rating: ProviderRating) -> Option<f64> {
    if !(rating.value > 0.0 && rating.scale > 0.0) {
        return None;
    }
    let scaled = rating.value * 5.0 / rating.scale;
    Some(((scaled * 10.0).round() / 10.0).clamp(1.0, 5.0))
}

fn price_tier(price: &ProviderPrice) -> Option<PriceTier> {
    match price {
        ProviderPrice::Level(level) => PriceTier::from_level(*level),
        ProviderPrice::Symbol(symbol) => PriceTier::from_symbol(symbol),
    }
}

/// Place classifier backed by a category rule table.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<CategoryRules>,
    photo_size: String,
}

impl Classifier {
    pub fn new(rules: CategoryRules) -> Self {
        Self {
            rules: Arc::new(rules),
            photo_size: DEFAULT_PHOTO_SIZE.to_string(),
        }
    }

    /// Size segment for template photo URLs.
    pub fn with_photo_size(mut self, size: impl Into<String>) -> Self {
        self.photo_size = size.into();
        self
    }

    pub fn rules(&self) -> &CategoryRules {
        &self.rules
    }

    /// Classify one place, stamping events with the current time.
    pub fn evaluate(&self, place: &ProviderPlace, source_api: &str) -> Classification {
        self.evaluate_at(place, source_api, Utc::now())
    }

    pub fn evaluate_at(&self, place: &ProviderPlace, source_api: &str, now: DateTime<Utc>) -> Classification {
        if place.categories.is_empty() {
            return Classification::Unclassified(UnclassifiedReason::NoCategories);
        }
        let Some(matched) = self.rules.match_first(&place.categories) else {
            return Classification::Unclassified(UnclassifiedReason::UnrecognizedCategories);
        };
        let Some(coordinates) = place.coordinates else {
            return Classification::Unclassified(UnclassifiedReason::MissingCoordinates);
        };

        let base = ItemBase {
            id: place.id.clone(),
            name: place.name.clone(),
            description: self.description(place),
            location: ItemLocation {
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
                street: place.address.street.clone(),
                city: place.address.city.clone(),
                state: place.address.state.clone(),
                zipcode: place.address.postcode.clone(),
            },
            rating: place.rating.and_then(normalize_rating),
            image_url: place.photos.first().map(|p| p.to_url(&self.photo_size)),
            website: place.website.clone(),
            source_api: source_api.to_string(),
            api_specific_id: place.id.clone(),
        };

        Classification::Classified(self.build(base, place, matched, now))
    }

    /// `Some(item)` for classifiable places.
    pub fn classify(&self, place: &ProviderPlace, source_api: &str) -> Option<DomainItem> {
        self.evaluate(place, source_api).into_item()
    }

    /// Classify every place in a response, dropping the unclassifiable
    /// ones and keeping the rest in order.
    pub fn classify_all(&self, response: &ProviderResponse) -> Vec<DomainItem> {
        self.classify_all_at(response, Utc::now())
    }

    pub fn classify_all_at(&self, response: &ProviderResponse, now: DateTime<Utc>) -> Vec<DomainItem> {
        let items: Vec<DomainItem> = response
            .places
            .iter()
            .filter_map(|place| match self.evaluate_at(place, &response.provider, now) {
                Classification::Classified(item) => Some(item),
                Classification::Unclassified(reason) => {
                    let labels: Vec<&str> = place.categories.iter().map(|c| c.label.as_str()).collect();
                    tracing::warn!(
                        provider = %response.provider,
                        place_id = %place.id,
                        name = %place.name,
                        reason = %reason,
                        categories = ?labels,
                        "Dropping unclassifiable place"
                    );
                    metrics::counter!(
                        "places_dropped_total",
                        "provider" => response.provider.clone(),
                        "reason" => reason.as_str()
                    )
                    .increment(1);
                    None
                }
            })
            .collect();

        tracing::debug!(
            provider = %response.provider,
            received = response.places.len(),
            kept = items.len(),
            "Classified provider response"
        );
        items
    }

    fn description(&self, place: &ProviderPlace) -> String {
        match &place.description {
            Some(d) if !d.trim().is_empty() => d.clone(),
            _ => place
                .categories
                .iter()
                .map(|c| c.label.as_str())
                .filter(|l| !l.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn build(&self, base: ItemBase, place: &ProviderPlace, matched: RuleMatch<'_>, now: DateTime<Utc>) -> DomainItem {
        match matched.kind {
            ItemKind::Event => DomainItem::Event(Event {
                base,
                event_type: matched.label.to_string(),
                start_date: now,
            }),
            ItemKind::Park => DomainItem::Park(Park {
                base,
                park_type: matched.label.to_string(),
                amenities: place
                    .categories
                    .iter()
                    .map(|c| c.label.clone())
                    .filter(|l| !l.trim().is_empty())
                    .collect(),
            }),
            ItemKind::Restaurant => DomainItem::Restaurant(Restaurant {
                base,
                cuisine_type: matched.label.to_string(),
                price_range: place.price.as_ref().and_then(price_tier),
            }),
        }
    }
}
