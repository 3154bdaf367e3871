//! Log and trace subscriber setup.

use local_places_core::{config::TelemetryConfig, Error, Result};
use opentelemetry::{trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILTER: &str = "info,local_places=debug";
pub const SERVICE_NAME: &str = "local-places";

/// Pick the filter directives: `RUST_LOG`, then config, then the default.
pub fn log_filter(config: &TelemetryConfig) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| config.log_filter.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Holds the OTLP tracer provider for the life of the process. Dropping it
/// flushes pending spans and stops the exporter.
#[must_use = "dropping the guard stops trace export"]
pub struct TracingGuard {
    provider: Option<sdktrace::TracerProvider>,
}

impl TracingGuard {
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to shut down OTLP tracer provider: {}", e);
            }
        }
    }
}

/// Build the batch OTLP pipeline that exports to `endpoint`.
pub fn otlp_tracer_provider(endpoint: &str) -> Result<sdktrace::TracerProvider> {
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(
            sdktrace::config().with_resource(Resource::new(vec![KeyValue::new(
                "service.name",
                SERVICE_NAME,
            )])),
        )
        .install_batch(runtime::Tokio)
        .map_err(|e| Error::internal(format!("Failed to install OTLP pipeline: {}", e)))
}

/// Install the global subscriber: stdout logs (plain or JSON) plus OTLP
/// export when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn configure_tracing(config: &TelemetryConfig) -> Result<TracingGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_filter(config))
        .map_err(|e| Error::config(format!("Invalid log filter: {}", e)))?;

    let json_layer = config.json_logs.then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.json_logs).then(|| tracing_subscriber::fmt::layer());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer);

    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        registry
            .try_init()
            .map_err(|e| Error::internal(format!("Failed to install tracing subscriber: {}", e)))?;
        return Ok(TracingGuard { provider: None });
    };

    let provider = otlp_tracer_provider(&endpoint)?;
    let otel_layer = tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME));

    registry
        .with(otel_layer)
        .try_init()
        .map_err(|e| Error::internal(format!("Failed to install tracing subscriber: {}", e)))?;
    tracing::info!(endpoint = %endpoint, "OpenTelemetry tracing enabled");

    Ok(TracingGuard {
        provider: Some(provider),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_prefers_config_over_default() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let mut config = TelemetryConfig {
            json_logs: false,
            log_filter: None,
        };
        assert_eq!(log_filter(&config), DEFAULT_LOG_FILTER);

        config.log_filter = Some("warn".into());
        assert_eq!(log_filter(&config), "warn");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_otlp_provider_yields_a_tracer_and_shuts_down() {
        let provider = otlp_tracer_provider("http://127.0.0.1:4317").unwrap();
        let _layer = tracing_opentelemetry::layer::<tracing_subscriber::Registry>()
            .with_tracer(provider.tracer(SERVICE_NAME));

        let guard = TracingGuard {
            provider: Some(provider),
        };
        assert!(guard.is_exporting());
        drop(guard);
    }
}
