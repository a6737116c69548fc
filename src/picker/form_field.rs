//! Form field collaborator
//!
//! The selection belongs to the surrounding form. The picker only writes
//! the chosen id into it and never validates it.

use std::sync::{Arc, Mutex};

/// A controlled value holder receiving the selected entity's id
pub trait FormField<Id>: Send + Sync {
    fn set_value(&self, id: Id);

    fn value(&self) -> Option<Id>;
}

/// Shared `{ selected_id }` holder; clones observe the same value
#[derive(Debug)]
pub struct SelectionState<Id> {
    selected_id: Arc<Mutex<Option<Id>>>,
}

impl<Id> Clone for SelectionState<Id> {
    fn clone(&self) -> Self {
        Self {
            selected_id: Arc::clone(&self.selected_id),
        }
    }
}

impl<Id> Default for SelectionState<Id> {
    fn default() -> Self {
        Self {
            selected_id: Arc::new(Mutex::new(None)),
        }
    }
}

impl<Id> SelectionState<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form reset
    pub fn clear(&self) {
        *self.selected_id.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl<Id: Clone + Send> FormField<Id> for SelectionState<Id> {
    fn set_value(&self, id: Id) {
        *self.selected_id.lock().unwrap_or_else(|e| e.into_inner()) = Some(id);
    }

    fn value(&self) -> Option<Id> {
        self.selected_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
