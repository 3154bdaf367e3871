//! Error types for Local Places.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using Local Places' Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Local Places.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Invalid request: {0}")]
    Validation(ValidationError),

    // =========================================================================
    // Provider Errors
    // =========================================================================
    #[error("Provider '{provider}' is not configured: {reason}")]
    ProviderNotConfigured { provider: String, reason: String },

    #[error("No response received from provider '{provider}': {message}")]
    ProviderUnreachable { provider: String, message: String },

    #[error("Provider '{provider}' rejected the request with status {status}")]
    ProviderRejected {
        provider: String,
        status: u16,
        /// Structured provider error, when the body could be parsed.
        error: Option<ProviderErrorPayload>,
        /// Raw response body, kept for diagnostics.
        raw: String,
    },

    #[error("Provider '{provider}' returned an unreadable payload: {message}")]
    ProviderPayload { provider: String, message: String },

    // =========================================================================
    // Cache Errors
    // =========================================================================
    #[error("Cache error: {0}")]
    Cache(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(code: ValidationCode, msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(code, msg))
    }

    /// Create a provider-not-configured error.
    pub fn provider_not_configured(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderNotConfigured {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Create a provider-unreachable error.
    pub fn provider_unreachable(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ProviderUnreachable {
            provider: provider.into(),
            message: msg.into(),
        }
    }

    /// Create a provider payload error.
    pub fn provider_payload(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ProviderPayload {
            provider: provider.into(),
            message: msg.into(),
        }
    }

    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Validation code, if this is an input error.
    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            Self::Validation(v) => Some(v.code),
            _ => None,
        }
    }
}

/// Machine-readable codes for rejected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    MissingLocation,
    IncompleteCoordinates,
    InvalidLatitude,
    LatitudeOutOfRange,
    InvalidLongitude,
    LongitudeOutOfRange,
    InvalidInteger,
    LimitOutOfRange,
    OffsetOutOfRange,
    BlankLocation,
    BlankTerm,
    BlankCategories,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingLocation => "MISSING_LOCATION",
            Self::IncompleteCoordinates => "INCOMPLETE_COORDINATES",
            Self::InvalidLatitude => "INVALID_LATITUDE",
            Self::LatitudeOutOfRange => "LATITUDE_OUT_OF_RANGE",
            Self::InvalidLongitude => "INVALID_LONGITUDE",
            Self::LongitudeOutOfRange => "LONGITUDE_OUT_OF_RANGE",
            Self::InvalidInteger => "INVALID_INTEGER",
            Self::LimitOutOfRange => "LIMIT_OUT_OF_RANGE",
            Self::OffsetOutOfRange => "OFFSET_OUT_OF_RANGE",
            Self::BlankLocation => "BLANK_LOCATION",
            Self::BlankTerm => "BLANK_TERM",
            Self::BlankCategories => "BLANK_CATEGORIES",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// Structured error returned by a provider on a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorPayload {
    /// Provider error code (e.g. `TOKEN_INVALID`), when the provider sends one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Offending request field, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
