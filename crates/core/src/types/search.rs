//! Search request and response types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::item::DomainItem;

/// Raw query string of the search endpoint. Everything stays textual so
/// that validation can report precise codes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub location: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub term: Option<String>,
    pub categories: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchQuery {
    pub fn near(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Default::default()
        }
    }

    pub fn at(latitude: impl ToString, longitude: impl ToString) -> Self {
        Self {
            latitude: Some(latitude.to_string()),
            longitude: Some(longitude.to_string()),
            ..Default::default()
        }
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_categories(mut self, categories: impl Into<String>) -> Self {
        self.categories = Some(categories.into());
        self
    }

    pub fn with_limit(mut self, limit: impl ToString) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn with_offset(mut self, offset: impl ToString) -> Self {
        self.offset = Some(offset.to_string());
        self
    }
}

/// A validated search, as handed to a provider adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Trimmed place name, if given.
    pub location: Option<String>,
    /// Coordinate pair, if given.
    pub coordinates: Option<(f64, f64)>,
    pub term: Option<String>,
    pub categories: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl SearchRequest {
    pub fn near(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            coordinates: None,
            term: None,
            categories: None,
            limit: 20,
            offset: 0,
        }
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Where a response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Provider(String),
}

impl ResponseSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cache => "cache",
            Self::Provider(name) => name,
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResponseSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResponseSource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s == "cache" {
            Self::Cache
        } else {
            Self::Provider(s)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub limit: u32,
    pub offset: u32,
}

/// Body of a successful search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<DomainItem>,
    /// Raw provider count, unaffected by dropped places.
    pub total_results_from_source: u64,
    pub source: ResponseSource,
    pub request_params: PageParams,
}
