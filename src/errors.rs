//! Error types for the PageHaus crate
//!
//! This module contains all error types that can be returned by PageHaus operations.
//! Page fetch failures are not among them: those are recorded on the page
//! and rendered by the list.

use cache_system::CacheError;
use config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageHausError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signal subscriptions are full, cannot mount a picker on {key}")]
    SubscriptionRejected { key: String },
}
