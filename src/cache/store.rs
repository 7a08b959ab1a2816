//! Response cache store.
//!
//! Wraps a `CacheBackend` with the read-through protocol: serve cached bytes
//! on hit, invoke the producer and store its result on miss. The cache is
//! strictly an optimization; every backend failure or timeout degrades to a
//! miss and the read still produces a correct, uncached answer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use metrics::counter;
use time::OffsetDateTime;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::backend::{CacheBackend, CacheError};
use super::config::CacheConfig;
use super::keys::CacheKey;

pub(crate) const METRIC_CACHE_HIT: &str = "rivista_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "rivista_cache_miss_total";
pub(crate) const METRIC_CACHE_PUT_FAILURE: &str = "rivista_cache_put_failure_total";

/// TTL response cache over an injected backend.
///
/// Concurrent misses on the same key each invoke their own producer and the
/// last write wins; all producers derive the same value from the same store
/// state, so the race is benign. There is no single-flight deduplication.
#[derive(Clone)]
pub struct ResponseCache {
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
}

impl ResponseCache {
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Fetch a fresh payload, or `None` on miss, expiry, backend failure or
    /// timeout. Never surfaces an error.
    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        if !self.config.enabled {
            return None;
        }

        match self.bounded(self.backend.get(key.as_str())).await {
            Ok(Some(entry)) if entry.is_fresh(OffsetDateTime::now_utc()) => {
                counter!(METRIC_CACHE_HIT).increment(1);
                debug!(cache = "response", outcome = "hit", key = %key, "serving cached payload");
                Some(entry.payload)
            }
            Ok(_) => {
                counter!(METRIC_CACHE_MISS).increment(1);
                debug!(cache = "response", outcome = "miss", key = %key, "cache miss");
                None
            }
            Err(err) => {
                counter!(METRIC_CACHE_MISS).increment(1);
                warn!(
                    cache = "response",
                    outcome = "degraded",
                    key = %key,
                    error = %err,
                    "cache get failed, treating as miss"
                );
                None
            }
        }
    }

    /// Store a payload. A failed write is logged and swallowed so it can
    /// never fail the read whose response it was caching.
    pub async fn put(&self, key: &CacheKey, payload: Bytes, ttl: Duration) {
        if !self.config.enabled {
            return;
        }

        if let Err(err) = self
            .bounded(self.backend.set(key.as_str(), payload, ttl))
            .await
        {
            counter!(METRIC_CACHE_PUT_FAILURE).increment(1);
            warn!(
                cache = "response",
                key = %key,
                error = %err,
                "cache put failed, response served uncached"
            );
        }
    }

    /// Read-through: return the cached payload on hit; on miss invoke
    /// `produce` exactly once, store its result, and return it. Producer
    /// errors propagate uncached.
    pub async fn read_through<F, Fut, E>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        produce: F,
    ) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        if let Some(payload) = self.get(key).await {
            return Ok(payload);
        }

        let payload = produce().await?;
        self.put(key, payload.clone(), ttl).await;
        Ok(payload)
    }

    /// Delete every key matching a glob pattern; returns the count deleted.
    /// Backend failure is logged and reported as zero deletions.
    pub async fn invalidate(&self, pattern: &str) -> u64 {
        if !self.config.enabled {
            return 0;
        }

        match self.bounded(self.backend.delete_pattern(pattern)).await {
            Ok(count) => {
                debug!(cache = "response", pattern, deleted = count, "purged pattern");
                count
            }
            Err(err) => {
                warn!(
                    cache = "response",
                    pattern,
                    error = %err,
                    "pattern delete failed, relying on TTL expiry"
                );
                0
            }
        }
    }

    /// Purge the whole namespace. Used at startup and on demand; the cache
    /// is a rebuildable derived view, so this is always safe.
    pub async fn clear(&self) -> u64 {
        let pattern = format!("{}:*", self.config.namespace);
        self.invalidate(&pattern).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        match timeout(self.config.backend_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.config.backend_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::backend::CacheEntry;
    use crate::infra::memory::MemoryBackend;

    fn cache_with(backend: Arc<dyn CacheBackend>) -> ResponseCache {
        ResponseCache::new(backend, CacheConfig::default())
    }

    /// Backend that fails every call, standing in for an unreachable service.
    struct DownBackend;

    #[async_trait]
    impl CacheBackend for DownBackend {
        async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
            Err(CacheError::unavailable("connection refused"))
        }

        async fn set(
            &self,
            _key: &str,
            _payload: Bytes,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            Err(CacheError::unavailable("connection refused"))
        }

        async fn delete_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
            Err(CacheError::unavailable("connection refused"))
        }
    }

    /// Backend whose calls never complete, standing in for a stalled service.
    struct StalledBackend;

    #[async_trait]
    impl CacheBackend for StalledBackend {
        async fn get(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
            std::future::pending().await
        }

        async fn set(
            &self,
            _key: &str,
            _payload: Bytes,
            _ttl: Duration,
        ) -> Result<(), CacheError> {
            std::future::pending().await
        }

        async fn delete_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
            std::future::pending().await
        }
    }

    fn key(raw: &str) -> CacheKey {
        use crate::cache::keys::{ReadRequest, derive_key};
        derive_key("rivista", &ReadRequest::anonymous(raw, vec![]))
    }

    #[tokio::test]
    async fn read_through_invokes_producer_once_per_timeline() {
        let cache = cache_with(Arc::new(MemoryBackend::new()));
        let key = key("/blogs");
        let calls = AtomicU64::new(0);

        for _ in 0..3 {
            let payload = cache
                .read_through(&key, Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(Bytes::from_static(b"listing"))
                })
                .await
                .unwrap();
            assert_eq!(payload, Bytes::from_static(b"listing"));
        }

        // [miss, hit, hit]: one production, three equal payloads.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn producer_error_propagates_uncached() {
        let cache = cache_with(Arc::new(MemoryBackend::new()));
        let key = key("/blogs");

        let result: Result<Bytes, &str> = cache
            .read_through(&key, Duration::from_secs(60), || async { Err("store down") })
            .await;
        assert_eq!(result.unwrap_err(), "store down");

        // Nothing was cached; the next producer still runs.
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn unavailable_backend_degrades_to_uncached_read() {
        let cache = cache_with(Arc::new(DownBackend));
        let key = key("/blogs");

        let payload = cache
            .read_through(&key, Duration::from_secs(60), || async {
                Ok::<_, Infallible>(Bytes::from_static(b"fresh"))
            })
            .await
            .unwrap();

        assert_eq!(payload, Bytes::from_static(b"fresh"));
    }

    #[tokio::test]
    async fn stalled_backend_is_bounded_by_timeout() {
        let config = CacheConfig {
            backend_timeout: Duration::from_millis(20),
            ..CacheConfig::default()
        };
        let cache = ResponseCache::new(Arc::new(StalledBackend), config);
        let key = key("/blogs");

        let payload = cache
            .read_through(&key, Duration::from_secs(60), || async {
                Ok::<_, Infallible>(Bytes::from_static(b"fresh"))
            })
            .await
            .unwrap();

        assert_eq!(payload, Bytes::from_static(b"fresh"));
    }

    #[tokio::test]
    async fn invalidate_on_down_backend_reports_zero() {
        let cache = cache_with(Arc::new(DownBackend));
        assert_eq!(cache.invalidate("rivista:*").await, 0);
    }

    #[tokio::test]
    async fn disabled_cache_short_circuits_to_producer() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let cache = ResponseCache::new(Arc::new(MemoryBackend::new()), config);
        let key = key("/blogs");
        let calls = AtomicU64::new(0);

        for _ in 0..2 {
            cache
                .read_through(&key, Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(Bytes::from_static(b"listing"))
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_treated_as_absent() {
        let cache = cache_with(Arc::new(MemoryBackend::new()));
        let key = key("/blogs");

        cache
            .put(&key, Bytes::from_static(b"stale"), Duration::ZERO)
            .await;

        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn clear_purges_whole_namespace() {
        let backend = Arc::new(MemoryBackend::new());
        let cache = cache_with(backend);

        cache
            .put(&key("/blogs"), Bytes::from_static(b"a"), Duration::from_secs(60))
            .await;
        cache
            .put(&key("/trending"), Bytes::from_static(b"b"), Duration::from_secs(60))
            .await;

        assert_eq!(cache.clear().await, 2);
        assert!(cache.get(&key("/blogs")).await.is_none());
    }
}
