//! Domain layer: content entities and shared value types.

pub mod entities;
pub mod types;
