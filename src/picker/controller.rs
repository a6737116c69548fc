//! Picker
//!
//! A mounted picker over one shared page cache: it owns the lifecycle gate,
//! the scroll trigger and the selectable list, and wires them to the form
//! field. Dropping the picker unmounts it from the cache registry.

use crate::errors::PageHausError;
use crate::picker::form_field::FormField;
use crate::picker::lifecycle::{CloseReason, LifecycleGate};
use crate::picker::scroll_trigger::{ScrollTrigger, SentinelId, TriggerOutcome};
use crate::picker::selectable_list::{ListView, SelectableList};
use cache_system::{CacheHandle, FetchRequest, PageCache};
use config::TriggerConfig;
use list_source::{Entity, QueryKey};
use signal_system::{CallbackId, SignalManager};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const DEFAULT_PLACEHOLDER: &str = "Select an option";

/// Keys the picker reacts to while open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Moved,
    Selected,
    Dismissed,
    Ignored,
}

pub struct Picker<E: Entity> {
    handle: CacheHandle<E>,
    gate: Arc<LifecycleGate>,
    trigger: ScrollTrigger<E>,
    list: SelectableList<E>,
    field: Arc<dyn FormField<E::Id>>,
    placeholder: String,
    dirty: Arc<AtomicBool>,
    subscription: CallbackId,
    signals: Arc<SignalManager>,
}

impl<E: Entity> std::fmt::Debug for Picker<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picker")
            .field("query", self.handle.key())
            .field("gate", &self.gate.state())
            .field("list", &self.list)
            .finish()
    }
}

impl<E: Entity> Picker<E> {
    pub fn new(
        handle: CacheHandle<E>,
        field: Arc<dyn FormField<E::Id>>,
        signals: Arc<SignalManager>,
        trigger_config: &TriggerConfig,
    ) -> Result<Self, PageHausError> {
        let gate = Arc::new(LifecycleGate::new());
        let cache = Arc::clone(handle.cache());

        let mut trigger = ScrollTrigger::new(Arc::clone(&cache), gate.subscribe(), trigger_config);
        trigger.observe(SentinelId::next());
        let list = SelectableList::new(cache, Arc::clone(&gate), Arc::clone(&field));

        let dirty = Arc::new(AtomicBool::new(true));
        let watched = handle.key().to_string();
        let flag = Arc::clone(&dirty);
        // Without a subscription the host would never learn to re-render
        let subscription = signals
            .add_callback(move |event| {
                if event.query == watched {
                    flag.store(true, Ordering::Release);
                }
            })
            .ok_or_else(|| PageHausError::SubscriptionRejected {
                key: handle.key().to_string(),
            })?;

        Ok(Self {
            handle,
            gate,
            trigger,
            list,
            field,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            dirty,
            subscription,
            signals,
        })
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn key(&self) -> &QueryKey {
        self.handle.key()
    }

    pub fn cache(&self) -> &Arc<PageCache<E>> {
        self.handle.cache()
    }

    pub fn gate(&self) -> &LifecycleGate {
        &self.gate
    }

    pub fn is_open(&self) -> bool {
        self.gate.enabled()
    }

    /// Open the surface and start the initial load when needed
    ///
    /// A stale cache is invalidated first unless a fetch is in flight.
    /// Returns the page-1 request when one was issued; a fresh cache is
    /// shown as is.
    pub fn open(&mut self) -> Option<FetchRequest> {
        if !self.gate.open() {
            return None;
        }
        crate::debug_log!(query = %self.handle.key(), "picker surface opened");

        // Stale data stays on screen while another consumer's fetch runs
        let cache = self.handle.cache();
        if cache.is_stale() && cache.invalidate_if_idle() {
            crate::debug_log!(query = %self.handle.key(), "reloading stale cache");
        }
        if !cache.is_empty() {
            return None;
        }

        let request = cache.fetch_next_page();
        request.is_issued().then_some(request)
    }

    pub fn close(&mut self, reason: CloseReason) -> bool {
        self.gate.close(reason)
    }

    pub fn render(&self) -> ListView<E::Id> {
        self.list.render(self.trigger.is_throttled())
    }

    /// Sentinel the host should place after the last row
    pub fn sentinel(&self) -> Option<SentinelId> {
        self.trigger.sentinel()
    }

    /// Forward a visibility change of the sentinel
    pub fn notify_sentinel(&mut self, visible: bool) -> TriggerOutcome {
        match self.trigger.sentinel() {
            Some(sentinel) => self.trigger.notify_visibility(sentinel, visible),
            None => TriggerOutcome::Ignored,
        }
    }

    pub fn handle_key(&mut self, key: PickerKey) -> KeyOutcome {
        if !self.gate.enabled() {
            return KeyOutcome::Ignored;
        }
        match key {
            PickerKey::Up => {
                self.list.move_highlight(-1);
                KeyOutcome::Moved
            }
            PickerKey::Down => {
                self.list.move_highlight(1);
                KeyOutcome::Moved
            }
            PickerKey::Enter => match self.list.select_highlighted() {
                Some(_) => KeyOutcome::Selected,
                None => KeyOutcome::Ignored,
            },
            PickerKey::Escape => {
                self.gate.close(CloseReason::DismissKey);
                KeyOutcome::Dismissed
            }
        }
    }

    /// Label for the picker trigger
    ///
    /// The selected entity's label when it is loaded, else the placeholder.
    pub fn selected_label(&self) -> String {
        self.field
            .value()
            .and_then(|id| {
                self.handle
                    .flattened_items()
                    .iter()
                    .find(|item| item.id() == id)
                    .map(|item| item.label())
            })
            .unwrap_or_else(|| self.placeholder.clone())
    }

    /// Whether the cache changed since the last call
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.list.set_search_term(term);
    }

    pub fn select(&mut self, id: &E::Id) -> Option<E> {
        self.list.select(id)
    }

    pub fn retry(&self) -> Option<FetchRequest> {
        self.list.retry()
    }

    pub fn load_more(&self) -> Option<FetchRequest> {
        self.list.load_more()
    }
}

impl<E: Entity> Drop for Picker<E> {
    fn drop(&mut self) {
        self.signals.remove_callback(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::form_field::SelectionState;
    use crate::picker::selectable_list::SentinelState;
    use cache_system::{CacheParams, CacheRegistry, PageStatus};
    use list_source::testing::{numbered, ScriptedSource, TestItem};
    use std::time::Duration;

    struct Fixture {
        source: Arc<ScriptedSource<TestItem>>,
        signals: Arc<SignalManager>,
        registry: Arc<CacheRegistry>,
        field: SelectionState<u32>,
    }

    impl Fixture {
        fn new() -> Self {
            let signals = Arc::new(SignalManager::default());
            Self {
                source: Arc::new(ScriptedSource::new()),
                registry: CacheRegistry::new(CacheParams::default(), Arc::clone(&signals)),
                signals,
                field: SelectionState::new(),
            }
        }

        fn mount(&self) -> Picker<TestItem> {
            let handle = self
                .registry
                .acquire::<TestItem>(QueryKey::new("items"), self.source.clone())
                .unwrap();
            Picker::new(
                handle,
                Arc::new(self.field.clone()),
                Arc::clone(&self.signals),
                &TriggerConfig::default(),
            )
            .unwrap()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_loads_first_page_once() {
        let f = Fixture::new();
        f.source.push_page(1, numbered(1..=10));
        let mut picker = f.mount();

        picker.open().unwrap().settled().await.unwrap();
        assert_eq!(picker.render().rows.len(), 10);

        picker.close(CloseReason::OutsideInteraction);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(picker.open().is_none(), "fresh cache is reused");
        assert_eq!(f.source.calls(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_after_stale_time_reloads_from_first_page() {
        let f = Fixture::new();
        f.source.push_page(1, numbered(1..=10));
        f.source.push_page(2, numbered(11..=20));
        f.source.push_page(1, numbered(101..=103));
        let mut picker = f.mount();

        picker.open().unwrap().settled().await.unwrap();
        picker.load_more().unwrap().settled().await.unwrap();
        picker.close(CloseReason::OutsideInteraction);

        tokio::time::advance(Duration::from_secs(301)).await;
        picker.open().unwrap().settled().await.unwrap();

        let ids: Vec<u32> = picker.render().rows.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![101, 102, 103]);
        assert_eq!(f.source.calls(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_keyboard_navigation_and_selection() {
        let f = Fixture::new();
        f.source.push_page(1, numbered(1..=3));
        let mut picker = f.mount();
        picker.open().unwrap().settled().await.unwrap();

        assert_eq!(picker.handle_key(PickerKey::Down), KeyOutcome::Moved);
        assert_eq!(picker.handle_key(PickerKey::Down), KeyOutcome::Moved);
        assert_eq!(picker.handle_key(PickerKey::Up), KeyOutcome::Moved);
        assert_eq!(picker.handle_key(PickerKey::Enter), KeyOutcome::Selected);

        assert_eq!(f.field.value(), Some(2));
        assert!(!picker.is_open());
        assert_eq!(picker.handle_key(PickerKey::Down), KeyOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_escape_dismisses() {
        let f = Fixture::new();
        let mut picker = f.mount();
        picker.open();

        assert_eq!(picker.handle_key(PickerKey::Escape), KeyOutcome::Dismissed);
        assert!(!picker.is_open());
        assert_eq!(f.field.value(), None);
    }

    #[tokio::test]
    async fn test_selected_label_falls_back_to_placeholder() {
        let f = Fixture::new();
        f.source.push_page(1, numbered(1..=3));
        let mut picker = f.mount().with_placeholder("Choose an item");
        assert_eq!(picker.selected_label(), "Choose an item");

        picker.open().unwrap().settled().await.unwrap();
        picker.select(&3);
        assert_eq!(picker.selected_label(), "item-3");

        f.field.set_value(99);
        assert_eq!(picker.selected_label(), "Choose an item");
    }

    #[tokio::test]
    async fn test_cache_events_mark_picker_dirty() {
        let f = Fixture::new();
        f.source.push_page(1, numbered(1..=10));
        let mut picker = f.mount();
        assert!(picker.take_dirty());
        assert!(!picker.take_dirty());

        picker.open().unwrap().settled().await.unwrap();
        assert!(picker.take_dirty());

        let listeners = f.signals.callback_count();
        drop(picker);
        assert_eq!(f.signals.callback_count(), listeners - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_drives_pagination() {
        let f = Fixture::new();
        f.source.push_page(1, numbered(1..=10));
        f.source.push_page(2, numbered(11..=14));
        let mut picker = f.mount();
        picker.open().unwrap().settled().await.unwrap();
        assert_eq!(picker.render().sentinel, Some(SentinelState::LoadMore));

        match picker.notify_sentinel(true) {
            TriggerOutcome::Issued(request) => {
                request.settled().await.unwrap();
            }
            other => panic!("expected a fetch, got {:?}", other),
        }

        let view = picker.render();
        assert_eq!(view.rows.len(), 14);
        assert_eq!(view.sentinel, None);
        assert_eq!(picker.cache().page_status(2), Some(PageStatus::Success));
    }

    #[tokio::test]
    async fn test_first_page_failure_waits_for_retry() {
        let f = Fixture::new();
        f.source.push_error(1, list_source::LoadError::transport("502"));
        f.source.push_page(1, numbered(1..=2));
        let mut picker = f.mount();

        picker.open().unwrap().settled().await.unwrap();
        assert!(picker.render().retry.is_some());

        picker.close(CloseReason::OutsideInteraction);
        assert!(picker.open().is_none(), "reopening does not retry by itself");

        picker.retry().unwrap().settled().await.unwrap();
        assert_eq!(picker.render().rows.len(), 2);
        assert_eq!(f.source.calls(), vec![1, 1]);
    }
}
