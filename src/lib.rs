//! Rivista read-path performance layer.
//!
//! A personalized, TTL-based response cache and a trending-ranking engine
//! sitting in front of the blog platform's document store. The HTTP layer
//! calls [`application::ReadPath::cached_read`] on every read endpoint and
//! [`application::ReadPath::invalidate_for_write`] after every write
//! commits; the store and the cache backend are injected behind the
//! [`application::repos::BlogStore`] and [`cache::CacheBackend`] traits.
//!
//! The cache is strictly an optimization: backend unavailability degrades
//! every read to the uncached path and every invalidation to a logged no-op
//! backed by TTL expiry. Store failures, by contrast, surface to the caller.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

pub use crate::application::{ReadError, ReadPath};
pub use crate::cache::{CacheBackend, ResponseCache, WriteKind};
pub use crate::config::Settings;
