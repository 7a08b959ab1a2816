//! Invalidation coordinator.
//!
//! Maps each write kind to the set of key-glob patterns it must purge and
//! issues the purges synchronously, before the write's response returns to
//! its caller. Patterns are deliberately coarse: over-invalidating costs a
//! recomputation, under-invalidating serves stale data.

use metrics::counter;
use tracing::info;
use uuid::Uuid;

use super::store::ResponseCache;

pub(crate) const METRIC_INVALIDATED_KEYS: &str = "rivista_cache_invalidated_keys_total";
pub(crate) const METRIC_INVALIDATION_RUNS: &str = "rivista_cache_invalidation_total";

/// Kind of write applied to the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
    Delete,
    LikeToggle,
    CommentAdd,
}

impl WriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteKind::Create => "create",
            WriteKind::Update => "update",
            WriteKind::Delete => "delete",
            WriteKind::LikeToggle => "like_toggle",
            WriteKind::CommentAdd => "comment_add",
        }
    }

    /// Whether this write can change which items appear in listings, as
    /// opposed to only an item's own counters.
    fn reshapes_listings(&self) -> bool {
        matches!(self, WriteKind::Create | WriteKind::Update | WriteKind::Delete)
    }
}

/// Glob patterns a write must purge, across all roles and identities.
///
/// Every write touches the item's own keys and the trending keys (trending
/// blends the item's counters). Writes that can add, remove, or retitle an
/// item additionally purge the listing keys; a like or comment leaves the
/// listing membership untouched.
pub fn patterns_for(namespace: &str, kind: WriteKind, blog_id: Uuid) -> Vec<String> {
    let mut patterns = vec![
        format!("{namespace}:*:*:/blogs/{blog_id}*"),
        format!("{namespace}:*:*:/trending*"),
    ];
    if kind.reshapes_listings() {
        patterns.push(format!("{namespace}:*:*:/blogs"));
        patterns.push(format!("{namespace}:*:*:/blogs?*"));
    }
    patterns
}

/// Purges the cache patterns affected by each write.
#[derive(Clone)]
pub struct InvalidationCoordinator {
    cache: ResponseCache,
}

impl InvalidationCoordinator {
    pub fn new(cache: ResponseCache) -> Self {
        Self { cache }
    }

    /// Purge every pattern mapped to this write. Runs to completion before
    /// returning so the caller's response is ordered after invalidation.
    /// Purge failures are logged; the short TTL elsewhere is the safety net.
    pub async fn on_write(&self, kind: WriteKind, blog_id: Uuid) -> u64 {
        if !self.cache.config().enabled {
            return 0;
        }

        let patterns = patterns_for(&self.cache.config().namespace, kind, blog_id);
        let mut deleted = 0u64;
        for pattern in &patterns {
            deleted += self.cache.invalidate(pattern).await;
        }

        counter!(METRIC_INVALIDATION_RUNS, "kind" => kind.as_str()).increment(1);
        counter!(METRIC_INVALIDATED_KEYS).increment(deleted);

        if deleted == 0 {
            // Common when nothing relevant was cached, but worth a trace
            // when diagnosing stale reads.
            info!(
                write_kind = kind.as_str(),
                %blog_id,
                "write invalidation purged no keys"
            );
        } else {
            info!(
                write_kind = kind.as_str(),
                %blog_id,
                deleted,
                "write invalidation complete"
            );
        }
        deleted
    }
}
