//! Picker components
//!
//! This module wires the lifecycle gate, the scroll trigger and the
//! selectable list around one shared page cache.

pub mod controller;
pub mod form_field;
pub mod lifecycle;
pub mod scroll_trigger;
pub mod selectable_list;

pub use controller::{KeyOutcome, Picker, PickerKey};
pub use form_field::{FormField, SelectionState};
pub use lifecycle::{CloseReason, GatePhase, GateState, LifecycleGate};
pub use scroll_trigger::{ScrollTrigger, SentinelId, Suppression, TriggerOutcome};
pub use selectable_list::{ListRow, ListView, SelectableList, SentinelState};
