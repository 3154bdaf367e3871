#![deny(unused)]
//! Place provider adapters for Local Places.
//!
//! This crate provides:
//! - Foursquare Places v3 search
//! - Yelp Fusion business search
//! - Shared request plumbing (timeouts, error forwarding, request metrics)

mod http;

pub mod foursquare;
pub mod yelp;

pub use foursquare::{FoursquareProvider, FOURSQUARE};
pub use http::parse_error_payload;
pub use yelp::{YelpProvider, YELP};

use std::sync::Arc;
use std::time::Duration;

use local_places_core::{config::ProviderSettings, traits::PlaceProvider, Error, Result};

/// Create the adapter named by `settings.active`.
///
/// A missing credential does not fail construction; the adapter reports it
/// on every search instead.
pub fn create_provider(settings: &ProviderSettings) -> Result<Arc<dyn PlaceProvider>> {
    let timeout = Duration::from_millis(settings.timeout_ms);

    match settings.active.trim().to_lowercase().as_str() {
        FOURSQUARE => Ok(Arc::new(FoursquareProvider::new(&settings.foursquare, timeout)?)),
        YELP => Ok(Arc::new(YelpProvider::new(&settings.yelp, timeout)?)),
        other => Err(Error::config(format!(
            "Unknown provider '{}' (expected '{}' or '{}')",
            other, FOURSQUARE, YELP
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_places_core::config::AppConfig;

    #[test]
    fn test_create_default_provider() {
        let settings = AppConfig::default().provider;
        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.name(), FOURSQUARE);
    }

    #[test]
    fn test_create_yelp_provider() {
        let mut settings = AppConfig::default().provider;
        settings.active = " Yelp ".into();
        assert_eq!(create_provider(&settings).unwrap().name(), YELP);
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let mut settings = AppConfig::default().provider;
        settings.active = "tripadvisor".into();
        assert!(matches!(create_provider(&settings), Err(Error::Config(_))));
    }
}
