//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::cache::{FetchOutcome, FetchRequest, PageCache, Settlement, SkipReason};
pub use crate::errors::CacheError;
pub use crate::page::{Page, PageStatus};
pub use crate::params::CacheParams;
pub use crate::registry::{CacheHandle, CacheRegistry};

// Re-export centralized config
pub use config::CacheConfig;

// Common external dependencies
pub use serde::{Deserialize, Serialize};
pub use tokio;
