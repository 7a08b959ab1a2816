//! Configuration layer: typed settings with layered precedence (file → env).
//!
//! Settings are read once at process start and injected into the components
//! that need them. Environment variables use the `RIVISTA_` prefix with `__`
//! as the section separator, e.g. `RIVISTA_CACHE__DEFAULT_TTL_SECS=120`.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "RIVISTA";

const DEFAULT_NAMESPACE: &str = "rivista";
const DEFAULT_READ_TTL_SECS: u64 = 300;
const DEFAULT_TRENDING_TTL_SECS: u64 = 600;
const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 250;
const DEFAULT_TRENDING_WINDOW_DAYS: u32 = 7;
const DEFAULT_WEIGHT_VIEWS: u64 = 1;
const DEFAULT_WEIGHT_LIKES: u64 = 5;
const DEFAULT_WEIGHT_COMMENTS: u64 = 10;
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_MAX_PAGE_SIZE: u32 = 50;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),
}

/// Top-level settings for the read-path layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache: CacheSettings,
    pub trending: TrendingSettings,
    pub query: QuerySettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from an optional TOML file overlaid with environment
    /// variables. Missing values fall back to compiled defaults.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

/// Response-cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Master switch; when false every read goes straight to the store.
    pub enabled: bool,
    /// Leading segment of every cache key.
    pub namespace: String,
    /// TTL for ordinary cached reads.
    pub default_ttl_secs: u64,
    /// TTL for cached trending responses; longer because the computation is
    /// more expensive and changes more slowly in relative terms.
    pub trending_ttl_secs: u64,
    /// Upper bound on any single cache-backend call. On expiry the call is
    /// treated as a miss, never as a request failure.
    pub backend_timeout_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_ttl_secs: DEFAULT_READ_TTL_SECS,
            trending_ttl_secs: DEFAULT_TRENDING_TTL_SECS,
            backend_timeout_ms: DEFAULT_BACKEND_TIMEOUT_MS,
        }
    }
}

/// Trending-ranking settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendingSettings {
    /// Trailing window in days; items published earlier are excluded.
    pub window_days: u32,
    pub weight_views: u64,
    pub weight_likes: u64,
    pub weight_comments: u64,
}

impl Default for TrendingSettings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_TRENDING_WINDOW_DAYS,
            weight_views: DEFAULT_WEIGHT_VIEWS,
            weight_likes: DEFAULT_WEIGHT_LIKES,
            weight_comments: DEFAULT_WEIGHT_COMMENTS,
        }
    }
}

/// Paginated-query settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub default_page_size: u32,
    /// Requested page sizes above this are clamped down.
    pub max_page_size: u32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Json,
    Compact,
}

/// Logging settings consumed by `infra::telemetry::init`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default tracing directive, overridable via `RUST_LOG`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_system() {
        let settings = Settings::default();
        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.namespace, "rivista");
        assert_eq!(settings.cache.default_ttl_secs, 300);
        assert_eq!(settings.cache.trending_ttl_secs, 600);
        assert_eq!(settings.trending.window_days, 7);
        assert_eq!(settings.trending.weight_views, 1);
        assert_eq!(settings.trending.weight_likes, 5);
        assert_eq!(settings.trending.weight_comments, 10);
        assert_eq!(settings.query.default_page_size, 10);
        assert_eq!(settings.query.max_page_size, 50);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let settings = Settings::load(None).expect("settings load");
        assert_eq!(settings.cache.default_ttl_secs, 300);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, LogFormat::Compact);
    }

    #[test]
    fn trending_ttl_exceeds_default_ttl() {
        let settings = CacheSettings::default();
        assert!(settings.trending_ttl_secs > settings.default_ttl_secs);
    }
}
