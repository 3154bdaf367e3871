#![deny(unused)]
//! Logging, tracing, and metrics setup for Local Places.

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{setup_metrics_recorder, track_cache_lookup, track_request, CacheOutcome};
pub use tracing_layer::{configure_tracing, log_filter, otlp_tracer_provider, TracingGuard, DEFAULT_LOG_FILTER, SERVICE_NAME};
