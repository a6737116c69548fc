//! Cache system for shared paginated queries
//!
//! This crate provides the per-query page cache and the process-wide
//! registry that shares one cache per query key among all consumers.

pub mod cache;
pub mod errors;
pub mod page;
pub mod params;
pub mod prelude;
pub mod registry;

// Re-export centralized config
pub use config::CacheConfig;

pub use cache::{FetchOutcome, FetchRequest, PageCache, Settlement, SkipReason};
pub use errors::CacheError;
pub use page::{Page, PageStatus};
pub use params::CacheParams;
pub use registry::{CacheHandle, CacheRegistry};
