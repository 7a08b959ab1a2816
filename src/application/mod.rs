//! Application layer: read-path services over the document store.

pub mod error;
pub mod pagination;
pub mod query;
pub mod read_path;
pub mod repos;
pub mod trending;

pub use error::ReadError;
pub use read_path::ReadPath;
