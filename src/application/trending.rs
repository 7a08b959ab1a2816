//! Trending ranking engine.
//!
//! Computes a weighted popularity score per published item inside a trailing
//! window and returns the top-N ordering. Read-only and idempotent over the
//! store's current state; the store query failing here surfaces to the
//! caller, since there is no cached fallback the first time.

use std::sync::Arc;
use std::time::Duration;

use metrics::histogram;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

use crate::application::repos::{BlogStore, StoreError};
use crate::config::TrendingSettings;
use crate::domain::entities::BlogRecord;
use crate::domain::types::BlogStatus;

pub(crate) const METRIC_TRENDING_COMPUTE_MS: &str = "rivista_trending_compute_ms";

const SECONDS_PER_DAY: u64 = 86_400;

/// Counter weights applied when scoring an item.
#[derive(Debug, Clone, Copy)]
pub struct TrendingWeights {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl Default for TrendingWeights {
    fn default() -> Self {
        let settings = TrendingSettings::default();
        Self::from(&settings)
    }
}

impl From<&TrendingSettings> for TrendingWeights {
    fn from(settings: &TrendingSettings) -> Self {
        Self {
            views: settings.weight_views,
            likes: settings.weight_likes,
            comments: settings.weight_comments,
        }
    }
}

impl TrendingWeights {
    /// Weighted score; monotonically non-decreasing in each counter.
    pub fn score(&self, record: &BlogRecord) -> u64 {
        record
            .view_count
            .saturating_mul(self.views)
            .saturating_add(record.like_count.saturating_mul(self.likes))
            .saturating_add(record.comment_count.saturating_mul(self.comments))
    }
}

/// One ranked item.
#[derive(Debug, Clone, Serialize)]
pub struct TrendingEntry {
    pub blog: BlogRecord,
    pub score: u64,
}

/// Computes the trending ordering over the document store.
#[derive(Clone)]
pub struct TrendingEngine {
    store: Arc<dyn BlogStore>,
    weights: TrendingWeights,
}

impl TrendingEngine {
    pub fn new(store: Arc<dyn BlogStore>, weights: TrendingWeights) -> Self {
        Self { store, weights }
    }

    /// Rank published items whose `published_at` falls within the trailing
    /// window, descending by score with ties broken by most recent
    /// publication, truncated to `limit`. Items outside the window are
    /// excluded entirely, regardless of their raw counters.
    pub async fn compute_trending(
        &self,
        limit: usize,
        window_days: u32,
    ) -> Result<Vec<TrendingEntry>, StoreError> {
        let started_at = std::time::Instant::now();
        let window_start = OffsetDateTime::now_utc()
            - Duration::from_secs(u64::from(window_days) * SECONDS_PER_DAY);

        let candidates = self.store.list_published_since(window_start).await?;

        let mut ranked: Vec<TrendingEntry> = candidates
            .into_iter()
            .filter(|record| {
                record.status == BlogStatus::Published
                    && record.published_at.is_some_and(|at| at >= window_start)
            })
            .map(|blog| TrendingEntry {
                score: self.weights.score(&blog),
                blog,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.blog.published_at.cmp(&a.blog.published_at))
        });
        ranked.truncate(limit);

        debug!(
            limit,
            window_days,
            ranked = ranked.len(),
            "trending ranking computed"
        );
        histogram!(METRIC_TRENDING_COMPUTE_MS)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::CreateBlogParams;
    use crate::infra::memory::MemoryBlogStore;

    fn params(title: &str, published_at: Option<OffsetDateTime>) -> CreateBlogParams {
        CreateBlogParams {
            title: title.to_string(),
            excerpt: String::new(),
            content: String::new(),
            category: "general".to_string(),
            tags: vec![],
            author: "tester".to_string(),
            status: BlogStatus::Published,
            published_at,
        }
    }

    async fn seed(
        store: &MemoryBlogStore,
        title: &str,
        days_ago: u64,
        views: u64,
        likes: u64,
        comments: u64,
    ) -> uuid::Uuid {
        let published = OffsetDateTime::now_utc() - Duration::from_secs(days_ago * SECONDS_PER_DAY);
        let record = store
            .create_blog(params(title, Some(published)))
            .await
            .expect("seeded blog");
        store
            .set_counters(record.id, views, likes, comments)
            .expect("counters set");
        record.id
    }

    #[tokio::test]
    async fn weighted_ranking_with_window_exclusion_and_recency_tie_break() {
        let store = Arc::new(MemoryBlogStore::new());
        // A: 100 views -> score 100, published 3 days ago.
        let a = seed(&store, "A", 3, 100, 0, 0).await;
        // B: 10 likes + 5 comments -> score 100, published 1 day ago.
        let b = seed(&store, "B", 1, 0, 10, 5).await;
        // C: outside the 7-day window; excluded despite 1000 views.
        seed(&store, "C", 10, 1000, 0, 0).await;

        let engine = TrendingEngine::new(store, TrendingWeights::default());
        let ranked = engine.compute_trending(2, 7).await.expect("ranking");

        assert_eq!(ranked.len(), 2);
        // Equal scores: the more recently published item ranks first.
        assert_eq!(ranked[0].blog.id, b);
        assert_eq!(ranked[0].score, 100);
        assert_eq!(ranked[1].blog.id, a);
        assert_eq!(ranked[1].score, 100);
    }

    #[tokio::test]
    async fn drafts_are_excluded() {
        let store = Arc::new(MemoryBlogStore::new());
        let mut draft = params("draft", Some(OffsetDateTime::now_utc()));
        draft.status = BlogStatus::Draft;
        store.create_blog(draft).await.expect("draft created");

        let engine = TrendingEngine::new(store, TrendingWeights::default());
        let ranked = engine.compute_trending(10, 7).await.expect("ranking");
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn limit_truncates_the_ordering() {
        let store = Arc::new(MemoryBlogStore::new());
        for i in 0..5 {
            seed(&store, &format!("post-{i}"), 1, 10 * (i + 1), 0, 0).await;
        }

        let engine = TrendingEngine::new(store, TrendingWeights::default());
        let ranked = engine.compute_trending(3, 7).await.expect("ranking");

        assert_eq!(ranked.len(), 3);
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
    }

    #[test]
    fn score_is_monotone_in_each_counter() {
        let weights = TrendingWeights::default();
        let base = BlogRecord {
            id: uuid::Uuid::new_v4(),
            title: "t".to_string(),
            excerpt: String::new(),
            content: String::new(),
            category: String::new(),
            tags: vec![],
            author: String::new(),
            status: BlogStatus::Published,
            view_count: 10,
            like_count: 2,
            comment_count: 1,
            published_at: Some(OffsetDateTime::now_utc()),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let score = weights.score(&base);

        let mut more_views = base.clone();
        more_views.view_count += 1;
        assert!(weights.score(&more_views) > score);

        let mut more_likes = base.clone();
        more_likes.like_count += 1;
        assert!(weights.score(&more_likes) > score);

        let mut more_comments = base;
        more_comments.comment_count += 1;
        assert!(weights.score(&more_comments) > score);
    }
}
