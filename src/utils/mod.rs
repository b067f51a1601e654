//! Shared utilities: constants and caching

pub mod cache;
pub mod constants;

pub use cache::{AuditCache, CacheStats};
