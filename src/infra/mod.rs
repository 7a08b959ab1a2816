//! Infrastructure layer: telemetry and in-memory adapters.

pub mod error;
pub mod memory;
pub mod telemetry;

pub use error::InfraError;
