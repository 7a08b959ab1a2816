//! Persistent records owned by the document store.
//!
//! The read-path layer treats these as read-only snapshots; all mutation
//! happens through the store's own operations.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::BlogStatus;

/// A blog entry as returned by the document store.
///
/// `view_count`, `like_count` and `comment_count` are the popularity
/// counters consumed by the trending engine. They are mutated only by the
/// store's atomic operations, never by this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogRecord {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub status: BlogStatus,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A comment appended to a blog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub author: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
