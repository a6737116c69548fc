//! Cache parameter configuration
//!
//! This module defines the CacheParams struct
//! carrying page size and freshness windows as durations.

use config::CacheConfig;
use std::time::Duration;

/// Cache parameters shared by every page cache of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheParams {
    /// A page shorter than this ends pagination
    pub page_size: usize,
    /// Fresh window after the last successful fetch
    pub stale_time: Duration,
    /// Residency window after the last consumer unmounts
    pub gc_time: Duration,
}

impl CacheParams {
    pub fn new(page_size: usize, stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            page_size,
            stale_time,
            gc_time,
        }
    }
}

impl From<&CacheConfig> for CacheParams {
    fn from(config: &CacheConfig) -> Self {
        Self::new(config.page_size, config.stale_time(), config.gc_time())
    }
}

impl Default for CacheParams {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}
