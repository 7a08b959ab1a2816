//! Document-store trait describing the persistence adapter.
//!
//! The store is an external collaborator: this layer only issues query and
//! mutation descriptors and consumes the records that come back. Counter
//! mutation (views, likes, comments) is atomic on the store side.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::query::QueryDescriptor;
use crate::domain::entities::{BlogRecord, CommentRecord};
use crate::domain::types::BlogStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store timeout")]
    Timeout,
}

impl StoreError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateBlogParams {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub status: BlogStatus,
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct UpdateBlogParams {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub status: BlogStatus,
}

#[derive(Debug, Clone)]
pub struct AddCommentParams {
    pub blog_id: Uuid,
    pub author: String,
    pub body: String,
}

/// Read operations consumed by the read path and the trending engine.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Execute a filter/sort/pagination descriptor; returns the matching
    /// page of items plus the total match count.
    async fn query(&self, descriptor: &QueryDescriptor)
    -> Result<(Vec<BlogRecord>, u64), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogRecord>, StoreError>;

    /// All published items with `published_at >= since`, counters included.
    async fn list_published_since(
        &self,
        since: OffsetDateTime,
    ) -> Result<Vec<BlogRecord>, StoreError>;

    /// Atomic view-counter increment.
    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError>;

    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, StoreError>;

    async fn update_blog(&self, params: UpdateBlogParams) -> Result<BlogRecord, StoreError>;

    async fn delete_blog(&self, id: Uuid) -> Result<(), StoreError>;

    /// Toggle `user`'s like on a blog; returns the updated record.
    async fn toggle_like(&self, id: Uuid, user: &str) -> Result<BlogRecord, StoreError>;

    /// Append a comment record; returns the updated blog.
    async fn add_comment(&self, params: AddCommentParams) -> Result<BlogRecord, StoreError>;

    async fn list_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRecord>, StoreError>;
}
