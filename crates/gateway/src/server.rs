//! Axum-based HTTP server for the gateway.

use axum::{
    extract::{MatchedPath, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use local_places_core::{
    config::ServerConfig,
    types::{ApiErrorBody, ApiErrorCode, SearchQuery, SearchResponse},
    Error, Result,
};
use local_places_telemetry::track_request;

use crate::error::ApiError;
use crate::orchestrator::PlaceSearchService;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

impl From<&ServerConfig> for GatewayConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            ..Self::default()
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub search: PlaceSearchService,
}

/// Gateway server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, search: PlaceSearchService) -> Self {
        Self {
            config,
            state: Arc::new(AppState { search }),
            metrics_handle: None,
        }
    }

    /// Mount `/metrics` backed by this handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/api/external/items", get(search_handler))
            .route("/v1/cache/keys", get(cache_keys_handler))
            .route_layer(middleware::from_fn(track_http))
            .with_state(self.state.clone());

        if let Some(handle) = &self.metrics_handle {
            let handle = handle.clone();
            router = router.route("/metrics", get(move || async move { handle.render() }));
        }

        if self.config.enable_cors {
            router = router.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any));
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(
            addr = %addr,
            provider = %self.state.search.provider_name(),
            "Gateway server starting"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
}

/// Cache key listing.
#[derive(Debug, Serialize)]
pub struct CacheKeysResponse {
    pub count: usize,
    pub keys: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn track_http(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let started = Instant::now();

    let response = next.run(req).await;
    track_request(&method, &path, response.status().as_u16(), started.elapsed().as_secs_f64());
    response
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.search.provider_name().to_string(),
    })
}

/// `GET /api/external/items`
async fn search_handler(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<SearchQuery>, axum::extract::rejection::QueryRejection>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            tracing::info!(request_id = %request_id, error = %rejection, "Malformed query string");
            let body = ApiErrorBody::new(ApiErrorCode::InvalidRequest, rejection.body_text(), false);
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        location = ?query.location,
        latitude = ?query.latitude,
        longitude = ?query.longitude,
        term = ?query.term,
        "Search request"
    );

    match state.search.search(&query).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                source = %response.source,
                items = response.items.len(),
                total = response.total_results_from_source,
                "Search served"
            );
            (StatusCode::OK, Json::<SearchResponse>(response)).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// `GET /v1/cache/keys`
async fn cache_keys_handler(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<CacheKeysResponse>, ApiError> {
    let mut keys = state.search.cache().keys().await?;
    keys.sort();
    Ok(Json(CacheKeysResponse {
        count: keys.len(),
        keys,
    }))
}
