//! Read-path facade exposed to the HTTP layer.
//!
//! Every read endpoint funnels through `cached_read` (or one of the
//! convenience reads built on it) and every write endpoint calls
//! `invalidate_for_write` after the store commits. Response payloads are
//! opaque serialized bytes to this layer; it stores and returns them whole.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::application::error::ReadError;
use crate::application::pagination::{Paginated, compute_pagination};
use crate::application::query::{BlogFilter, QueryDescriptor, Sort};
use crate::application::repos::BlogStore;
use crate::application::trending::{TrendingEngine, TrendingWeights};
use crate::cache::{
    CacheBackend, CacheConfig, InvalidationCoordinator, ReadRequest, Requester, ResponseCache,
    WriteKind, derive_key,
};
use crate::config::Settings;

/// Wires query building, key derivation, caching, invalidation, and trending
/// into the single surface the HTTP layer consumes.
///
/// Constructed once at startup with explicitly injected store and cache
/// backend handles; there is no process-global client state.
#[derive(Clone)]
pub struct ReadPath {
    store: Arc<dyn BlogStore>,
    cache: ResponseCache,
    invalidation: InvalidationCoordinator,
    trending: TrendingEngine,
    settings: Settings,
}

impl ReadPath {
    pub fn new(
        store: Arc<dyn BlogStore>,
        backend: Arc<dyn CacheBackend>,
        settings: Settings,
    ) -> Self {
        let cache = ResponseCache::new(backend, CacheConfig::from(&settings.cache));
        let invalidation = InvalidationCoordinator::new(cache.clone());
        let trending = TrendingEngine::new(
            Arc::clone(&store),
            TrendingWeights::from(&settings.trending),
        );
        Self {
            store,
            cache,
            invalidation,
            trending,
            settings,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Generic cached read: derive the key for `request`, serve from cache
    /// on hit, otherwise run `produce` and store its payload with `ttl`.
    pub async fn cached_read<F, Fut>(
        &self,
        request: &ReadRequest,
        ttl: Duration,
        produce: F,
    ) -> Result<Bytes, ReadError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, ReadError>>,
    {
        let key = derive_key(&self.cache.config().namespace, request);
        self.cache.read_through(&key, ttl, produce).await
    }

    /// Purge every cache pattern affected by a committed write. Synchronous:
    /// completes before the caller returns its response, so a client that
    /// observed its own write can never read stale cached state afterwards.
    pub async fn invalidate_for_write(&self, kind: WriteKind, blog_id: Uuid) -> u64 {
        self.invalidation.on_write(kind, blog_id).await
    }

    /// Cached, personalized blog listing serialized as JSON.
    pub async fn list_blogs(
        &self,
        filter: BlogFilter,
        sort: Sort,
        page: u32,
        page_size: u32,
        requester: &Requester,
    ) -> Result<Bytes, ReadError> {
        let descriptor =
            QueryDescriptor::build(filter, sort, page, page_size, &self.settings.query);
        let request = ReadRequest::new("/blogs", descriptor.cache_params(), requester.clone());
        let ttl = self.cache.config().default_ttl;

        self.cached_read(&request, ttl, || async {
            let (items, total_count) = self.store.query(&descriptor).await?;
            let page = Paginated::new(
                items,
                compute_pagination(total_count, descriptor.page, descriptor.page_size),
            );
            serialize(&page)
        })
        .await
    }

    /// Cached single-blog read. On a cache miss the view counter is bumped
    /// before the record is fetched; cached hits deliberately skip the
    /// increment, which is why item keys are purged on every counter write.
    pub async fn get_blog(&self, id: Uuid, requester: &Requester) -> Result<Bytes, ReadError> {
        let request = ReadRequest::new(format!("/blogs/{id}"), vec![], requester.clone());
        let ttl = self.cache.config().default_ttl;

        self.cached_read(&request, ttl, || async {
            if let Err(err) = self.store.increment_views(id).await {
                // View counts are best-effort; the read must still answer.
                warn!(blog_id = %id, error = %err, "view-count increment failed");
            }
            let record = self
                .store
                .find_by_id(id)
                .await?
                .ok_or(ReadError::NotFound)?;
            serialize(&record)
        })
        .await
    }

    /// Cached trending listing. Keyed only by `(limit, window_days)` under
    /// the anonymous scope: the ranking contains published items only, so
    /// every principal sees the same bytes. Uses the longer trending TTL.
    pub async fn trending(&self, limit: usize, window_days: u32) -> Result<Bytes, ReadError> {
        let request = ReadRequest::anonymous(
            "/trending",
            vec![
                ("limit".to_string(), limit.to_string()),
                ("window_days".to_string(), window_days.to_string()),
            ],
        );
        let ttl = self.cache.config().trending_ttl;

        self.cached_read(&request, ttl, || async {
            let ranked = self.trending.compute_trending(limit, window_days).await?;
            serialize(&ranked)
        })
        .await
    }

    /// Trending with the configured default window.
    pub async fn trending_default(&self, limit: usize) -> Result<Bytes, ReadError> {
        self.trending(limit, self.settings.trending.window_days)
            .await
    }
}

fn serialize<T: serde::Serialize>(value: &T) -> Result<Bytes, ReadError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(ReadError::serialization)
}
