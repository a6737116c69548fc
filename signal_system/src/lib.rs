//! Signal system for page cache events
//!
//! This crate provides synchronous change notifications for
//! shared page caches in the PageHaus ecosystem.

pub mod event;
pub mod manager;
pub mod prelude;
pub mod types;

pub use event::{CacheEvent, CacheEventKind};
pub use manager::{SignalManager, SignalStats};
pub use types::{CallbackId, EventCallback};

// Re-export centralized config
pub use config::SignalConfig;
