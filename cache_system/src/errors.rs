//! Error types for cache operations
//!
//! This module defines the errors returned by the registry. Page fetch
//! failures are not among them: they are recorded on the page.

use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    #[error("Query key {key} is already cached with a different entity type")]
    TypeMismatch { key: String },
}
