//! Page cache event types and definitions
//!
//! This module defines the structure of cache events
//! that flow through the signal system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cache event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheEventKind {
    /// A cache instance was created for a query key
    Created,
    /// A page entered the Loading state
    PageLoading,
    /// A page settled as Success and was appended to the flattened list
    PageCommitted,
    /// A page settled as Error
    PageFailed,
    /// All pages were discarded
    Invalidated,
    /// The cache was dropped from the registry after its gc window
    Evicted,
}

/// Cache event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEvent {
    /// Unique event ID
    pub id: Uuid,
    /// Event type
    pub kind: CacheEventKind,
    /// Query key rendered as text
    pub query: String,
    /// Page index (if the event concerns one page)
    pub page_index: Option<u32>,
    /// Items carried by a committed page
    pub item_count: Option<usize>,
    /// Error text of a failed page
    pub error: Option<String>,
    /// Event timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CacheEvent {
    pub fn new(kind: CacheEventKind, query: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            query: query.into(),
            page_index: None,
            item_count: None,
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_page(mut self, page_index: u32) -> Self {
        self.page_index = Some(page_index);
        self
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = Some(item_count);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
