//! Normalized domain items served to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of place kinds the service knows about.
///
/// Declaration order is priority order: when one provider category matches
/// several kinds, the earlier kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Park,
    Restaurant,
}

impl ItemKind {
    /// All kinds, highest priority first.
    pub const PRIORITY: [ItemKind; 3] = [ItemKind::Event, ItemKind::Park, ItemKind::Restaurant];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "Event",
            Self::Park => "Park",
            Self::Restaurant => "Restaurant",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geolocation plus optional postal fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
}

/// Fields shared by every item variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBase {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: ItemLocation,
    /// Rating on a 1-5 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub source_api: String,
    pub api_specific_id: String,
}

/// Price tier label, `$` through `$$$$`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceTier {
    #[serde(rename = "$")]
    One,
    #[serde(rename = "$$")]
    Two,
    #[serde(rename = "$$$")]
    Three,
    #[serde(rename = "$$$$")]
    Four,
}

impl PriceTier {
    /// Map a numeric tier (1-4). Anything else has no label.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    /// Map a symbol tier such as `$$`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() || !symbol.chars().all(|c| c == '$') {
            return None;
        }
        u8::try_from(symbol.len()).ok().and_then(Self::from_level)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::One => "$",
            Self::Two => "$$",
            Self::Three => "$$$",
            Self::Four => "$$$$",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(flatten)]
    pub base: ItemBase,
    pub cuisine_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Park {
    #[serde(flatten)]
    pub base: ItemBase,
    pub park_type: String,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(flatten)]
    pub base: ItemBase,
    pub event_type: String,
    /// Providers carry no schedule, so this is the time the item was built.
    pub start_date: DateTime<Utc>,
}

/// A classified place. Every item is exactly one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainItem {
    Restaurant(Restaurant),
    Park(Park),
    Event(Event),
}

impl DomainItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            Self::Restaurant(_) => ItemKind::Restaurant,
            Self::Park(_) => ItemKind::Park,
            Self::Event(_) => ItemKind::Event,
        }
    }

    pub fn base(&self) -> &ItemBase {
        match self {
            Self::Restaurant(r) => &r.base,
            Self::Park(p) => &p.base,
            Self::Event(e) => &e.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }
}
