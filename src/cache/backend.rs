//! Cache backend abstraction.
//!
//! The response cache talks to a TTL-backed key-value service through the
//! `CacheBackend` trait: single-key get, set-with-ttl, and glob-style
//! pattern delete, each one network round-trip with no cross-key
//! transactions. `infra::memory::MemoryBackend` implements it in-process;
//! a networked store plugs in behind the same trait.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use time::OffsetDateTime;

/// Failure of a cache backend call.
///
/// These are never surfaced to the caller of a read: the response cache
/// treats every variant as a miss and falls through to the store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache backend call exceeded {0:?}")]
    Timeout(Duration),
}

impl CacheError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// A stored cache entry. Replaced wholesale on every `set`, never patched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Bytes,
    pub stored_at: OffsetDateTime,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(payload: Bytes, ttl: Duration) -> Self {
        Self {
            payload,
            stored_at: OffsetDateTime::now_utc(),
            ttl,
        }
    }

    /// An entry is fresh while `now - stored_at < ttl`. Expired entries are
    /// treated as absent whether or not the backend has purged them.
    pub fn is_fresh(&self, now: OffsetDateTime) -> bool {
        now - self.stored_at < self.ttl
    }
}

/// TTL-backed key-value backend consumed by the response cache.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a fresh entry, or `None` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Store a payload under `key` with the given TTL.
    async fn set(&self, key: &str, payload: Bytes, ttl: Duration) -> Result<(), CacheError>;

    /// Delete every key matching a glob pattern; returns the count deleted.
    /// Zero matches is a no-op, not an error.
    async fn delete_pattern(&self, pattern: &str) -> Result<u64, CacheError>;
}

/// Match a key against a glob pattern.
///
/// This is the pattern language of `delete_pattern`: `*` matches any
/// sequence of characters (including separators); everything else is
/// literal. `?` is an ordinary character because it appears in keys as the
/// query-string separator.
pub fn glob_match(pattern: &str, candidate: &str) -> bool {
    let p = pattern.as_bytes();
    let c = candidate.as_bytes();
    let (mut pi, mut ci) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ci < c.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some((pi, ci));
            pi += 1;
        } else if pi < p.len() && p[pi] == c[ci] {
            pi += 1;
            ci += 1;
        } else if let Some((star_pi, star_ci)) = star {
            // Backtrack: widen the last `*` by one character.
            pi = star_pi + 1;
            ci = star_ci + 1;
            star = Some((star_pi, star_ci + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
