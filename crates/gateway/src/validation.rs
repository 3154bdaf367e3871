//! Query validation for the search endpoint.
//!
//! Runs before any cache or provider access.

use local_places_core::{
    config::SearchConfig,
    types::{SearchQuery, SearchRequest},
    Error, Result, ValidationCode,
};

/// Limit bounds for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 50,
        }
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }
}

/// `None` for an absent or blank parameter.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Reject a parameter that was supplied but is blank after trimming.
fn non_blank(value: &Option<String>, code: ValidationCode, name: &str) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Err(Error::validation(code, format!("'{}' must not be blank", name))),
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}

fn coordinate(
    raw: &str,
    name: &str,
    bound: f64,
    invalid: ValidationCode,
    out_of_range: ValidationCode,
) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| Error::validation(invalid, format!("'{}' must be a number, got '{}'", name, raw)))?;
    if !(-bound..=bound).contains(&value) {
        return Err(Error::validation(
            out_of_range,
            format!("'{}' must be between {} and {}, got {}", name, -bound, bound, value),
        ));
    }
    Ok(value)
}

/// Parse an integer parameter. Anything that parses is returned as-is so
/// that out-of-range values get a bounds error rather than a format error.
fn integer(raw: &str, name: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        Error::validation(
            ValidationCode::InvalidInteger,
            format!("'{}' must be an integer, got '{}'", name, raw),
        )
    })
}

/// Validate a raw query into a provider-ready request.
pub fn validate_query(query: &SearchQuery, limits: SearchLimits) -> Result<SearchRequest> {
    let location = non_blank(&query.location, ValidationCode::BlankLocation, "location")?;

    let latitude = present(&query.latitude)
        .map(|raw| {
            coordinate(
                raw,
                "latitude",
                90.0,
                ValidationCode::InvalidLatitude,
                ValidationCode::LatitudeOutOfRange,
            )
        })
        .transpose()?;
    let longitude = present(&query.longitude)
        .map(|raw| {
            coordinate(
                raw,
                "longitude",
                180.0,
                ValidationCode::InvalidLongitude,
                ValidationCode::LongitudeOutOfRange,
            )
        })
        .transpose()?;

    let coordinates = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        (None, None) => None,
        _ => {
            return Err(Error::validation(
                ValidationCode::IncompleteCoordinates,
                "'latitude' and 'longitude' must be given together",
            ))
        }
    };

    if location.is_none() && coordinates.is_none() {
        return Err(Error::validation(
            ValidationCode::MissingLocation,
            "either 'location' or 'latitude' and 'longitude' is required",
        ));
    }

    let term = non_blank(&query.term, ValidationCode::BlankTerm, "term")?;
    let categories = non_blank(&query.categories, ValidationCode::BlankCategories, "categories")?;

    let limit = match present(&query.limit) {
        None => limits.default_limit,
        Some(raw) => {
            let value = integer(raw, "limit")?;
            if value < 1 || value > i64::from(limits.max_limit) {
                return Err(Error::validation(
                    ValidationCode::LimitOutOfRange,
                    format!("'limit' must be between 1 and {}, got {}", limits.max_limit, value),
                ));
            }
            value as u32
        }
    };

    let offset = match present(&query.offset) {
        None => 0,
        Some(raw) => {
            let value = integer(raw, "offset")?;
            u32::try_from(value).map_err(|_| {
                Error::validation(
                    ValidationCode::OffsetOutOfRange,
                    format!("'offset' must be between 0 and {}, got {}", u32::MAX, value),
                )
            })?
        }
    };

    Ok(SearchRequest {
        location,
        coordinates,
        term,
        categories,
        limit,
        offset,
    })
}
