//! Shared HTTP plumbing for provider adapters.

use serde::Deserialize;
use std::time::{Duration, Instant};

use local_places_core::{Error, ProviderErrorPayload, Result};

/// Build the HTTP client used by an adapter.
pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("local-places/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client for {}: {}", provider, e)))
}

/// Validate a configured base URL and return it without a trailing slash.
pub(crate) fn normalize_base_url(provider: &str, base_url: &str) -> Result<String> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| Error::config(format!("Invalid {} base URL '{}': {}", provider, base_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Invalid {} base URL '{}': scheme must be http or https",
            provider, base_url
        )));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

/// Send a request and return the success body.
///
/// No response at all becomes `ProviderUnreachable`; a non-2xx status
/// becomes `ProviderRejected` with the provider's error parsed when possible.
pub(crate) async fn send(provider: &str, request: reqwest::RequestBuilder) -> Result<String> {
    let started = Instant::now();
    let outcome = send_inner(provider, request).await;
    let label = match &outcome {
        Ok(_) => "ok",
        Err(Error::ProviderRejected { .. }) => "rejected",
        Err(_) => "unreachable",
    };

    metrics::counter!(
        "provider_requests_total",
        "provider" => provider.to_string(),
        "outcome" => label
    )
    .increment(1);
    metrics::histogram!(
        "provider_request_duration_seconds",
        "provider" => provider.to_string()
    )
    .record(started.elapsed().as_secs_f64());

    outcome
}

async fn send_inner(provider: &str, request: reqwest::RequestBuilder) -> Result<String> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(provider = provider, error = %e, "No response received from provider");
        Error::provider_unreachable(provider, describe_transport_error(&e))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        tracing::error!(provider = provider, error = %e, "Failed to read provider response body");
        Error::provider_unreachable(provider, format!("response body interrupted: {}", e))
    })?;

    if !status.is_success() {
        let error = parse_error_payload(&body);
        tracing::warn!(
            provider = provider,
            status = status.as_u16(),
            code = ?error.as_ref().and_then(|e| e.code.as_deref()),
            "Provider rejected request"
        );
        return Err(Error::ProviderRejected {
            provider: provider.to_string(),
            status: status.as_u16(),
            error,
            raw: body,
        });
    }

    Ok(body)
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

/// Parse a JSON body into `T`, reporting failures as a payload error.
pub(crate) fn parse_body<T: for<'de> Deserialize<'de>>(provider: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(provider = provider, error = %e, "Provider returned an unreadable payload");
        Error::provider_payload(provider, e.to_string())
    })
}

#[derive(Deserialize)]
struct NestedError {
    error: NestedErrorBody,
}

#[derive(Deserialize)]
struct NestedErrorBody {
    code: Option<String>,
    description: Option<String>,
    message: Option<String>,
    field: Option<String>,
}

#[derive(Deserialize)]
struct FlatError {
    message: String,
    code: Option<String>,
}

/// Recognize the error shapes our providers send.
///
/// `{"error": {"code", "description"}}` (Yelp) and `{"message"}`
/// (Foursquare). Anything else yields `None`.
pub fn parse_error_payload(body: &str) -> Option<ProviderErrorPayload> {
    if let Ok(nested) = serde_json::from_str::<NestedError>(body) {
        let e = nested.error;
        let description = e.description.or(e.message)?;
        return Some(ProviderErrorPayload {
            code: e.code,
            description,
            field: e.field,
        });
    }

    if let Ok(flat) = serde_json::from_str::<FlatError>(body) {
        return Some(ProviderErrorPayload {
            code: flat.code,
            description: flat.message,
            field: None,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_error() {
        let body = r#"{"error":{"code":"TOKEN_INVALID","description":"Invalid access token"}}"#;
        let parsed = parse_error_payload(body).unwrap();
        assert_eq!(parsed.code.as_deref(), Some("TOKEN_INVALID"));
        assert_eq!(parsed.description, "Invalid access token");
    }

    #[test]
    fn parses_flat_message() {
        let parsed = parse_error_payload(r#"{"message":"Invalid request token."}"#).unwrap();
        assert!(parsed.code.is_none());
        assert_eq!(parsed.description, "Invalid request token.");
    }

    #[test]
    fn unparseable_bodies_yield_none() {
        assert!(parse_error_payload("<html>Bad Gateway</html>").is_none());
        assert!(parse_error_payload(r#"{"status":"down"}"#).is_none());
        assert!(parse_error_payload("").is_none());
    }

    #[test]
    fn base_url_validation() {
        assert_eq!(
            normalize_base_url("foursquare", "https://api.foursquare.com/v3/").unwrap(),
            "https://api.foursquare.com/v3"
        );
        assert!(normalize_base_url("foursquare", "api.foursquare.com").is_err());
        assert!(normalize_base_url("foursquare", "ftp://example.com").is_err());
    }
}
