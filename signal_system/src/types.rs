//! Type definitions for signal system
//!
//! This module contains the callback and handle types
//! shared between the manager and its subscribers.

use crate::event::CacheEvent;
use std::sync::Arc;
use uuid::Uuid;

/// Event callback invoked synchronously on every emitted event
pub type EventCallback = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// Handle returned on subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(Uuid);

impl CallbackId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
