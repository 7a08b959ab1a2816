//! In-memory adapters.
//!
//! `MemoryBackend` implements the cache-backend contract (TTL get/set,
//! glob pattern delete) in-process; `MemoryBlogStore` implements the
//! document-store trait. Both are used by the test suites and for local
//! development; production deployments plug networked services behind the
//! same traits.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::query::{QueryDescriptor, SortDirection, SortField};
use crate::application::repos::{
    AddCommentParams, BlogStore, CreateBlogParams, StoreError, UpdateBlogParams,
};
use crate::cache::{CacheBackend, CacheEntry, CacheError, glob_match};
use crate::domain::entities::{BlogRecord, CommentRecord};
use crate::domain::types::BlogStatus;

// ============================================================================
// Cache backend
// ============================================================================

/// In-memory TTL key-value backend.
///
/// Single-key operations are atomic per `DashMap` shard; there are no
/// cross-key transactions, matching the contract of a networked backend.
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired, not yet reaped) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let now = OffsetDateTime::now_utc();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh(now) {
                return Ok(Some(entry.clone()));
            }
        }
        // Expired entries are reaped lazily on access.
        let _ = self
            .entries
            .remove_if(key, |_, entry| !entry.is_fresh(now));
        Ok(None)
    }

    async fn set(&self, key: &str, payload: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), CacheEntry::new(payload, ttl));
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        let mut deleted = 0u64;
        for key in matching {
            if self.entries.remove(&key).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

// ============================================================================
// Blog store
// ============================================================================

struct BlogState {
    blogs: HashMap<Uuid, BlogRecord>,
    likes: HashMap<Uuid, HashSet<String>>,
    comments: HashMap<Uuid, Vec<CommentRecord>>,
}

/// In-memory document store for blogs.
pub struct MemoryBlogStore {
    state: RwLock<BlogState>,
}

impl Default for MemoryBlogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlogStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BlogState {
                blogs: HashMap::new(),
                likes: HashMap::new(),
                comments: HashMap::new(),
            }),
        }
    }

    /// Overwrite a blog's popularity counters. Seeding helper for tests and
    /// fixtures; the trait surface only mutates counters atomically.
    pub fn set_counters(
        &self,
        id: Uuid,
        views: u64,
        likes: u64,
        comments: u64,
    ) -> Result<(), StoreError> {
        let mut state = self.write();
        let record = state.blogs.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.view_count = views;
        record.like_count = likes;
        record.comment_count = comments;
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BlogState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BlogState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches_filter(record: &BlogRecord, descriptor: &QueryDescriptor) -> bool {
    if let Some(status) = descriptor.status {
        if record.status != status {
            return false;
        }
    }
    if let Some(category) = &descriptor.category {
        if !record.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    if let Some(author) = &descriptor.author {
        if record.author != *author {
            return false;
        }
    }
    if !descriptor.tags.is_empty() {
        let tags: HashSet<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();
        if !descriptor
            .tags
            .iter()
            .all(|wanted| tags.contains(&wanted.to_lowercase()))
        {
            return false;
        }
    }
    if let Some(search) = &descriptor.search {
        // Case-insensitive literal match across the searchable fields. The
        // escaped pattern form is for regex-language stores; here the
        // literal is compared directly, so metacharacters match themselves.
        let needle = search.literal.to_lowercase();
        let mut haystacks = vec![
            record.title.to_lowercase(),
            record.content.to_lowercase(),
            record.excerpt.to_lowercase(),
            record.category.to_lowercase(),
        ];
        haystacks.extend(record.tags.iter().map(|t| t.to_lowercase()));
        if !haystacks.iter().any(|hay| hay.contains(&needle)) {
            return false;
        }
    }
    true
}

fn sort_records(records: &mut [BlogRecord], descriptor: &QueryDescriptor) {
    records.sort_by(|a, b| {
        let ordering = match descriptor.sort.field {
            SortField::PublishedAt => a.published_at.cmp(&b.published_at),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Views => a.view_count.cmp(&b.view_count),
            SortField::Likes => a.like_count.cmp(&b.like_count),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        match descriptor.sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn query(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<(Vec<BlogRecord>, u64), StoreError> {
        let state = self.read();
        let mut matching: Vec<BlogRecord> = state
            .blogs
            .values()
            .filter(|record| matches_filter(record, descriptor))
            .cloned()
            .collect();
        drop(state);

        sort_records(&mut matching, descriptor);
        let total = matching.len() as u64;

        let offset = usize::try_from(descriptor.offset()).unwrap_or(usize::MAX);
        let page: Vec<BlogRecord> = matching
            .into_iter()
            .skip(offset)
            .take(descriptor.page_size as usize)
            .collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogRecord>, StoreError> {
        Ok(self.read().blogs.get(&id).cloned())
    }

    async fn list_published_since(
        &self,
        since: OffsetDateTime,
    ) -> Result<Vec<BlogRecord>, StoreError> {
        Ok(self
            .read()
            .blogs
            .values()
            .filter(|record| {
                record.status == BlogStatus::Published
                    && record.published_at.is_some_and(|at| at >= since)
            })
            .cloned()
            .collect())
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.write();
        let record = state.blogs.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.view_count += 1;
        Ok(())
    }

    async fn create_blog(&self, params: CreateBlogParams) -> Result<BlogRecord, StoreError> {
        if params.title.trim().is_empty() {
            return Err(StoreError::invalid_input("title must not be empty"));
        }
        let now = OffsetDateTime::now_utc();
        let record = BlogRecord {
            id: Uuid::new_v4(),
            title: params.title,
            excerpt: params.excerpt,
            content: params.content,
            category: params.category,
            tags: params.tags,
            author: params.author,
            status: params.status,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            published_at: params.published_at,
            created_at: now,
            updated_at: now,
        };
        self.write().blogs.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_blog(&self, params: UpdateBlogParams) -> Result<BlogRecord, StoreError> {
        let mut state = self.write();
        let record = state.blogs.get_mut(&params.id).ok_or(StoreError::NotFound)?;
        record.title = params.title;
        record.excerpt = params.excerpt;
        record.content = params.content;
        record.category = params.category;
        record.tags = params.tags;
        record.status = params.status;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete_blog(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.write();
        state.blogs.remove(&id).ok_or(StoreError::NotFound)?;
        state.likes.remove(&id);
        state.comments.remove(&id);
        Ok(())
    }

    async fn toggle_like(&self, id: Uuid, user: &str) -> Result<BlogRecord, StoreError> {
        let mut state = self.write();
        if !state.blogs.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        let likers = state.likes.entry(id).or_default();
        let liked = if likers.remove(user) {
            false
        } else {
            likers.insert(user.to_string());
            true
        };
        let record = state.blogs.get_mut(&id).ok_or(StoreError::NotFound)?;
        if liked {
            record.like_count += 1;
        } else {
            record.like_count = record.like_count.saturating_sub(1);
        }
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn add_comment(&self, params: AddCommentParams) -> Result<BlogRecord, StoreError> {
        let mut state = self.write();
        if !state.blogs.contains_key(&params.blog_id) {
            return Err(StoreError::NotFound);
        }
        let comment = CommentRecord {
            id: Uuid::new_v4(),
            blog_id: params.blog_id,
            author: params.author,
            body: params.body,
            created_at: OffsetDateTime::now_utc(),
        };
        state.comments.entry(params.blog_id).or_default().push(comment);
        let record = state
            .blogs
            .get_mut(&params.blog_id)
            .ok_or(StoreError::NotFound)?;
        record.comment_count += 1;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn list_comments(&self, blog_id: Uuid) -> Result<Vec<CommentRecord>, StoreError> {
        Ok(self
            .read()
            .comments
            .get(&blog_id)
            .cloned()
            .unwrap_or_default())
    }
}
