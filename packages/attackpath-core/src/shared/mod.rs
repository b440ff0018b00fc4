//! Shared module - Common types used across all features
//!
//! Only serde/serde_json here; no graph or solver dependencies.

pub mod models;

// Re-exports for convenience
pub use models::*;
