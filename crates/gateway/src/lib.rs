#![deny(unused)]
//! HTTP gateway for Local Places.
//!
//! This crate provides the search endpoint: query validation, the
//! cache-aside orchestrator, and the axum server with its diagnostics
//! routes.

pub mod error;
pub mod orchestrator;
pub mod server;
pub mod validation;

pub use error::{error_response_parts, ApiError};
pub use orchestrator::{PlaceSearchService, SearchSettings};
pub use server::{AppState, GatewayConfig, GatewayServer};
pub use validation::{validate_query, SearchLimits};
