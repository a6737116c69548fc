//! Convenience re-exports for common list-source usage

// Core traits
pub use crate::entity::Entity;
pub use crate::source::{ListResponse, ListSource};

// Error types
pub use crate::errors::LoadError;

// Fetching
pub use crate::fetcher::PagedFetcher;
pub use crate::json_source::{JsonListSource, Transport};

// Query identity
pub use crate::query::{FilterValue, QueryKey};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
