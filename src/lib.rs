//! # PageHaus
//!
//! Incremental paginated selection loader: searchable pickers over large
//! remote collections, fetching further pages as the user scrolls, with one
//! shared page cache per query no matter how many pickers are mounted.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagehaus::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(transport: impl Transport + 'static) -> Result<(), PageHausError> {
//! let pagehaus = PageHaus::new(AppConfig::default())?;
//! let _gc = pagehaus.spawn_gc();
//!
//! let source: Arc<dyn ListSource<Student>> = Arc::new(JsonListSource::new(transport, "/users"));
//! let field = SelectionState::new();
//!
//! let mut picker = pagehaus.mount_picker(Student::query_key(), source, field.clone())?;
//! if let Some(initial) = picker.open() {
//!     initial.settled().await;
//! }
//!
//! picker.set_search_term("nguyen");
//! let view = picker.render();
//! if let Some(row) = view.rows.first() {
//!     picker.select(&row.id);
//! }
//! println!("selected: {:?}", field.value());
//! # Ok(())
//! # }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod entities;
pub mod errors;
pub mod picker;
pub mod prelude;

// Re-export the main public types for convenience
pub use self::core::PageHaus;
pub use errors::PageHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, SignalConfig, TriggerConfig};

// Re-export internal crates used by the public API
pub use cache_system;
pub use list_source;
pub use signal_system;

// Re-export external dependencies used in public API
pub use async_trait;
