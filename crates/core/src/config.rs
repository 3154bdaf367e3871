use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub provider: ProviderSettings,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub default_ttl_secs: u64,
    /// Period of the background expiry sweep; 0 disables it.
    pub sweep_interval_secs: u64,
    pub redis_url: Option<String>,
    pub redis_prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub namespace: String,
    pub response_ttl_secs: u64,
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    /// Name of the provider that serves searches (`foursquare` or `yelp`).
    pub active: String,
    pub timeout_ms: u64,
    pub foursquare: FoursquareConfig,
    pub yelp: YelpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FoursquareConfig {
    pub base_url: String,
    pub api_key: Option<Secret<String>>,
    /// Size segment inserted between a photo's prefix and suffix.
    pub photo_size: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct YelpConfig {
    pub base_url: String,
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub json_logs: bool,
    pub log_filter: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let defaults = Self::default();

        let s = Config::builder()
            .set_default("server.host", defaults.server.host.clone())?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("cache.backend", "memory")?
            .set_default("cache.default_ttl_secs", defaults.cache.default_ttl_secs as i64)?
            .set_default("cache.sweep_interval_secs", defaults.cache.sweep_interval_secs as i64)?
            .set_default("cache.redis_prefix", defaults.cache.redis_prefix.clone())?
            .set_default("search.namespace", defaults.search.namespace.clone())?
            .set_default("search.response_ttl_secs", defaults.search.response_ttl_secs as i64)?
            .set_default("search.default_limit", defaults.search.default_limit as i64)?
            .set_default("search.max_limit", defaults.search.max_limit as i64)?
            .set_default("provider.active", defaults.provider.active.clone())?
            .set_default("provider.timeout_ms", defaults.provider.timeout_ms as i64)?
            .set_default("provider.foursquare.base_url", defaults.provider.foursquare.base_url.clone())?
            .set_default("provider.foursquare.photo_size", defaults.provider.foursquare.photo_size.clone())?
            .set_default("provider.yelp.base_url", defaults.provider.yelp.base_url.clone())?
            .set_default("telemetry.json_logs", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=4000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut cfg: Self = s.try_deserialize()?;
        cfg.apply_credential_env();
        Ok(cfg)
    }

    /// Fill missing provider credentials from the conventional env vars.
    pub fn apply_credential_env(&mut self) {
        if self.provider.foursquare.api_key.is_none() {
            self.provider.foursquare.api_key = non_empty_env("FOURSQUARE_API_KEY").map(Secret::new);
        }
        if self.provider.yelp.api_key.is_none() {
            self.provider.yelp.api_key = non_empty_env("YELP_API_KEY").map(Secret::new);
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 4000,
            },
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                default_ttl_secs: 3600,
                sweep_interval_secs: 120,
                redis_url: None,
                redis_prefix: "local-places".into(),
            },
            search: SearchConfig {
                namespace: "external-items".into(),
                response_ttl_secs: 3600,
                default_limit: 20,
                max_limit: 50,
            },
            provider: ProviderSettings {
                active: "foursquare".into(),
                timeout_ms: 10_000,
                foursquare: FoursquareConfig {
                    base_url: "https://api.foursquare.com/v3".into(),
                    api_key: None,
                    photo_size: "400x400".into(),
                },
                yelp: YelpConfig {
                    base_url: "https://api.yelp.com/v3".into(),
                    api_key: None,
                },
            },
            telemetry: TelemetryConfig {
                json_logs: false,
                log_filter: None,
            },
        }
    }
}
