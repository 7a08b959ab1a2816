//! Cache configuration.

use std::time::Duration;

use crate::config::CacheSettings;

/// Runtime configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Master switch; a disabled cache degrades every read to the uncached
    /// path and makes invalidation a no-op.
    pub enabled: bool,
    /// Leading segment of every derived key.
    pub namespace: String,
    /// TTL for ordinary cached reads.
    pub default_ttl: Duration,
    /// TTL for cached trending responses.
    pub trending_ttl: Duration,
    /// Bound on any single backend call.
    pub backend_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            namespace: settings.namespace.clone(),
            default_ttl: Duration::from_secs(settings.default_ttl_secs),
            trending_ttl: Duration::from_secs(settings.trending_ttl_secs),
            backend_timeout: Duration::from_millis(settings.backend_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.namespace, "rivista");
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.trending_ttl, Duration::from_secs(600));
        assert_eq!(config.backend_timeout, Duration::from_millis(250));
    }

    #[test]
    fn settings_conversion_carries_overrides() {
        let settings = CacheSettings {
            enabled: false,
            namespace: "staging".to_string(),
            default_ttl_secs: 30,
            trending_ttl_secs: 90,
            backend_timeout_ms: 10,
        };
        let config = CacheConfig::from(&settings);
        assert!(!config.enabled);
        assert_eq!(config.namespace, "staging");
        assert_eq!(config.default_ttl, Duration::from_secs(30));
        assert_eq!(config.trending_ttl, Duration::from_secs(90));
        assert_eq!(config.backend_timeout, Duration::from_millis(10));
    }
}
