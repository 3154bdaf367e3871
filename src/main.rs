#![deny(unused)]
//! Local Places - place search aggregation service.
//!
//! Wraps an external place-search provider behind a cached, validated
//! search endpoint that returns typed restaurants, parks, and events.

use local_places_classifier::{CategoryRules, Classifier};
use local_places_core::config::AppConfig;
use local_places_gateway::{GatewayConfig, GatewayServer, PlaceSearchService, SearchSettings};

/// Replaces the compiled-in category rules when set.
const RULES_PATH_ENV: &str = "CATEGORY_RULES_PATH";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config comes first so the log format can follow it; a broken config
    // file is reported once logging is up.
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = AppConfig::default();
            config.apply_credential_env();
            (config, Some(e))
        }
    };

    let tracing_guard = local_places_telemetry::configure_tracing(&config.telemetry)?;

    tracing::info!("Starting Local Places v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Failed to load configuration, using built-in defaults");
    }

    let metrics_handle = local_places_telemetry::setup_metrics_recorder()?;

    // =========================================================================
    // Cache Store
    // =========================================================================
    let cache = local_places_store::build_cache(&config.cache)?;
    tracing::info!(
        backend = ?config.cache.backend,
        default_ttl_secs = config.cache.default_ttl_secs,
        sweeper = cache.sweeper.is_some(),
        "Cache store initialized"
    );

    // =========================================================================
    // Provider Adapter
    // =========================================================================
    let provider = local_places_provider::create_provider(&config.provider)?;
    tracing::info!(
        provider = %provider.name(),
        timeout_ms = config.provider.timeout_ms,
        "Provider adapter initialized"
    );

    // =========================================================================
    // Classifier
    // =========================================================================
    let rules = match std::env::var(RULES_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => CategoryRules::from_path(path.trim())?,
        _ => CategoryRules::embedded()?,
    };
    tracing::info!(version = rules.version(), categories = rules.len(), "Category rules loaded");
    let classifier = Classifier::new(rules).with_photo_size(config.provider.foursquare.photo_size.clone());

    // =========================================================================
    // Start the server
    // =========================================================================
    let search = PlaceSearchService::new(
        cache.cache.clone(),
        provider,
        classifier,
        SearchSettings::from(&config.search),
    );
    let gateway_config = GatewayConfig::from(&config.server);

    println!();
    println!("  Local Places v{}", env!("CARGO_PKG_VERSION"));
    println!("    GET /api/external/items  - Search places");
    println!("    GET /health              - Health check");
    println!("    GET /v1/cache/keys       - Cached search keys");
    println!("    GET /metrics             - Prometheus metrics");
    println!("  Server: http://{}:{}", gateway_config.host, gateway_config.port);
    println!();

    GatewayServer::new(gateway_config, search)
        .with_metrics(metrics_handle)
        .run()
        .await?;

    // Stops the sweeper task, then flushes pending spans.
    drop(cache);
    drop(tracing_guard);
    Ok(())
}
