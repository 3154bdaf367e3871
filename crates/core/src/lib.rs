#![deny(unused)]
//! Core types, traits, and error definitions for Local Places.
//!
//! This crate provides the building blocks shared by the cache, provider,
//! classifier, and gateway layers.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, ProviderErrorPayload, Result, ValidationCode, ValidationError};
pub use traits::*;
pub use types::*;
