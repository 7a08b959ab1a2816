//! Read-path error taxonomy.
//!
//! Failures of the optimization layer (cache, invalidation) are handled in
//! `cache::store` and never reach this type; what surfaces here is the
//! data-producing layer failing, which the caller must see.

use thiserror::Error;

use crate::application::repos::StoreError;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("resource not found")]
    NotFound,
    #[error("response serialization failed: {0}")]
    Serialization(String),
}

impl ReadError {
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }
}
