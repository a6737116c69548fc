//! Convenience re-exports for common PageHaus usage
//!
//! This prelude module re-exports the most commonly used items from the PageHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use pagehaus::prelude::*;
//!
//! // Now you have access to all the common PageHaus types and traits
//! ```

// Core PageHaus components
pub use crate::core::PageHaus;
pub use crate::entities::{Room, Student};
pub use crate::errors::PageHausError;
pub use crate::picker::{
    CloseReason, FormField, GatePhase, GateState, KeyOutcome, LifecycleGate, ListRow, ListView,
    Picker, PickerKey, ScrollTrigger, SelectableList, SelectionState, SentinelId, SentinelState,
    Suppression, TriggerOutcome,
};

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, SignalConfig, TriggerConfig};

// Re-export list source types
pub use list_source::prelude::*;

// Re-export signal system for event handling
pub use signal_system::prelude::*;

// Re-export cache system
pub use cache_system::prelude::*;

// Common external dependencies
pub use async_trait;
pub use tokio;
