//! Mapping from core errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use local_places_core::{ApiErrorBody, ApiErrorCode, Error};

/// Longest raw provider body echoed back to clients.
const MAX_RAW_DETAIL: usize = 2048;

/// A core error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

fn truncate(raw: &str) -> String {
    match raw.char_indices().nth(MAX_RAW_DETAIL) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

/// Status and body for an error.
pub fn error_response_parts(error: &Error) -> (StatusCode, ApiErrorBody) {
    match error {
        Error::Validation(v) => (
            StatusCode::BAD_REQUEST,
            ApiErrorBody::new(ApiErrorCode::InvalidRequest, v.message.clone(), false)
                .with_details(json!({ "validationCode": v.code })),
        ),
        Error::ProviderNotConfigured { provider, reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorBody::new(ApiErrorCode::ProviderNotConfigured, reason.clone(), false)
                .with_details(json!({ "provider": provider })),
        ),
        Error::ProviderUnreachable { provider, message } => (
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorBody::new(
                ApiErrorCode::ProviderUnavailable,
                format!("No response received from {}", provider),
                true,
            )
            .with_details(json!({ "provider": provider, "reason": message })),
        ),
        Error::ProviderRejected {
            provider,
            status,
            error: Some(payload),
            ..
        } => {
            let status_code = StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            let retryable = status_code.is_server_error() || status_code == StatusCode::TOO_MANY_REQUESTS;
            (
                status_code,
                ApiErrorBody::new(ApiErrorCode::ProviderRejected, payload.description.clone(), retryable)
                    .with_details(json!({
                        "provider": provider,
                        "providerStatus": status,
                        "providerCode": payload.code,
                        "field": payload.field,
                    })),
            )
        }
        Error::ProviderRejected {
            provider,
            status,
            error: None,
            raw,
        } => (
            StatusCode::BAD_GATEWAY,
            ApiErrorBody::new(
                ApiErrorCode::UpstreamError,
                format!("{} returned status {}", provider, status),
                *status >= 500,
            )
            .with_details(json!({
                "provider": provider,
                "providerStatus": status,
                "raw": truncate(raw),
            })),
        ),
        Error::ProviderPayload { provider, message } => (
            StatusCode::BAD_GATEWAY,
            ApiErrorBody::new(
                ApiErrorCode::UpstreamError,
                format!("{} returned an unreadable response", provider),
                false,
            )
            .with_details(json!({ "provider": provider, "reason": message })),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorBody::new(ApiErrorCode::InternalError, other.to_string(), false),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = error_response_parts(&self.0);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            tracing::info!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        (status, Json(body)).into_response()
    }
}
