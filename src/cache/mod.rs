//! Rivista response-cache subsystem.
//!
//! A personalized, TTL-based cache sitting in front of the document store:
//!
//! - **Key derivation** (`keys`): canonical keys scoped by namespace, role,
//!   identity, and normalized request path.
//! - **Response store** (`store`): read-through get/put/invalidate over a
//!   TTL key-value backend; all backend failures degrade to misses.
//! - **Invalidation** (`invalidation`): write-kind to key-glob mapping,
//!   purged synchronously before each write's response returns.
//!
//! ## Configuration
//!
//! Cache behavior is controlled via the `[cache]` settings section:
//!
//! ```toml
//! [cache]
//! enabled = true
//! namespace = "rivista"
//! default_ttl_secs = 300
//! trending_ttl_secs = 600
//! backend_timeout_ms = 250
//! ```

pub mod backend;
mod config;
mod invalidation;
pub mod keys;
mod store;

pub use backend::{CacheBackend, CacheEntry, CacheError, glob_match};
pub use config::CacheConfig;
pub use invalidation::{InvalidationCoordinator, WriteKind, patterns_for};
pub use keys::{ANONYMOUS_SEGMENT, CacheKey, ReadRequest, Requester, derive_key};
pub use store::ResponseCache;
