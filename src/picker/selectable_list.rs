//! Selectable list
//!
//! Renders the cache's flattened items through a client-side search
//! filter, plus the loading and error affordances and the sentinel slot.
//! Filtering only narrows what is already loaded; it never mutates the
//! cache and never fetches.

use crate::picker::form_field::FormField;
use crate::picker::lifecycle::{CloseReason, LifecycleGate};
use cache_system::{FetchRequest, PageCache, SkipReason};
use list_source::Entity;
use std::sync::Arc;

pub const LOADING_MESSAGE: &str = "Loading…";
pub const FAILED_MESSAGE: &str = "Failed to load";
pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// What the sentinel area shows below the last row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelState {
    /// A fetch for this key is in flight
    LoadingMore,
    /// A trigger was just swallowed by the throttle window
    Throttled,
    /// Idle with a next page available; doubles as a manual load-more action
    LoadMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow<Id> {
    pub id: Id,
    pub label: String,
    pub detail: Option<String>,
    pub selected: bool,
    pub highlighted: bool,
}

/// One render of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<Id> {
    pub rows: Vec<ListRow<Id>>,
    /// Shown instead of rows when the filtered view is empty
    pub empty_message: Option<&'static str>,
    /// Error text of a failed first page, rendered with a retry action
    pub retry: Option<String>,
    /// Error text of a failed later page, rendered under the loaded rows
    pub inline_error: Option<String>,
    /// Present iff a next page exists
    pub sentinel: Option<SentinelState>,
    /// A search is active while more server-side data is unloaded
    pub limited_to_loaded: bool,
}

pub struct SelectableList<E: Entity> {
    cache: Arc<PageCache<E>>,
    gate: Arc<LifecycleGate>,
    field: Arc<dyn FormField<E::Id>>,
    search: String,
    highlighted: usize,
}

impl<E: Entity> std::fmt::Debug for SelectableList<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectableList")
            .field("query", self.cache.key())
            .field("search", &self.search)
            .field("highlighted", &self.highlighted)
            .finish()
    }
}

impl<E: Entity> SelectableList<E> {
    pub fn new(
        cache: Arc<PageCache<E>>,
        gate: Arc<LifecycleGate>,
        field: Arc<dyn FormField<E::Id>>,
    ) -> Self {
        Self {
            cache,
            gate,
            field,
            search: String::new(),
            highlighted: 0,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Replace the search text; the highlight returns to the first row
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.highlighted = 0;
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    fn matches(&self, needle: &str, item: &E) -> bool {
        needle.is_empty() || item.searchable_text().to_lowercase().contains(needle)
    }

    /// Loaded items that pass the search filter, in page order
    pub fn filtered_items(&self) -> Vec<E> {
        let needle = self.search.trim().to_lowercase();
        self.cache
            .flattened_items()
            .iter()
            .filter(|item| self.matches(&needle, item))
            .cloned()
            .collect()
    }

    pub fn render(&self, throttled: bool) -> ListView<E::Id> {
        let items = self.filtered_items();
        let selected = self.field.value();
        let highlighted = self.highlighted.min(items.len().saturating_sub(1));

        let rows: Vec<ListRow<E::Id>> = items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let id = item.id();
                ListRow {
                    selected: selected.as_ref() == Some(&id),
                    highlighted: position == highlighted,
                    label: item.label(),
                    detail: item.detail(),
                    id,
                }
            })
            .collect();

        let (retry, inline_error) = match self.cache.last_error() {
            Some((1, err)) => (Some(err.to_string()), None),
            Some((_, err)) => (None, Some(err.to_string())),
            None => (None, None),
        };

        let fetching = self.cache.fetching_index();
        let has_next_page = self.cache.has_next_page();

        let empty_message = rows.is_empty().then(|| {
            if fetching == Some(1) {
                LOADING_MESSAGE
            } else if retry.is_some() {
                FAILED_MESSAGE
            } else {
                NO_RESULTS_MESSAGE
            }
        });

        let sentinel = has_next_page.then(|| {
            if fetching.is_some() {
                SentinelState::LoadingMore
            } else if throttled {
                SentinelState::Throttled
            } else {
                SentinelState::LoadMore
            }
        });

        ListView {
            rows,
            empty_message,
            retry,
            inline_error,
            sentinel,
            limited_to_loaded: has_next_page && !self.search.trim().is_empty(),
        }
    }

    /// Report `id` to the form field and close the surface
    ///
    /// Returns the chosen entity, or `None` when it is not loaded.
    pub fn select(&mut self, id: &E::Id) -> Option<E> {
        let entity = self
            .cache
            .flattened_items()
            .iter()
            .find(|item| &item.id() == id)
            .cloned()?;

        self.field.set_value(entity.id());
        self.gate.close(CloseReason::Selection);
        crate::debug_log!(query = %self.cache.key(), id = %id, "entity selected");
        Some(entity)
    }

    /// Retry the failed page
    ///
    /// A failed first page drops everything and refetches page 1; a failed
    /// later page is fetched again in place. While a fetch is in flight
    /// this is skipped, so a repeated retry never discards a running
    /// fetch. `None` while the surface is closed.
    pub fn retry(&self) -> Option<FetchRequest> {
        if !self.gate.enabled() {
            return None;
        }
        let first_page_failed = matches!(self.cache.last_error(), Some((1, _)));
        if first_page_failed && !self.cache.invalidate_if_idle() {
            return Some(FetchRequest::Skipped(SkipReason::InFlight));
        }
        Some(self.cache.fetch_next_page())
    }

    /// Manual load-more, bypassing the scroll throttle but not the cache's gating
    pub fn load_more(&self) -> Option<FetchRequest> {
        if !self.gate.enabled() {
            return None;
        }
        Some(self.cache.fetch_next_page())
    }

    /// Move the highlight by `delta` rows, clamped to the filtered view
    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.filtered_items().len();
        if len == 0 {
            self.highlighted = 0;
            return;
        }
        let current = self.highlighted.min(len - 1) as isize;
        self.highlighted = (current + delta).clamp(0, len as isize - 1) as usize;
    }

    /// Select the highlighted row, clamped to the filtered view as rendered
    pub fn select_highlighted(&mut self) -> Option<E> {
        let items = self.filtered_items();
        let position = self.highlighted.min(items.len().saturating_sub(1));
        let id = items.get(position)?.id();
        self.select(&id)
    }
}
