//! Scripted list source for tests
//!
//! Replays queued responses per page index, records every call, and can
//! hold a page in flight until the test releases it.

use crate::entity::Entity;
use crate::errors::LoadError;
use crate::query::QueryKey;
use crate::source::{ListResponse, ListSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Minimal entity used by tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestItem {
    pub id: u32,
    pub name: String,
}

impl TestItem {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for TestItem {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn searchable_text(&self) -> String {
        self.name.clone()
    }
}

/// Items `item-<n>` for every id in the range
pub fn numbered(ids: impl IntoIterator<Item = u32>) -> Vec<TestItem> {
    ids.into_iter()
        .map(|id| TestItem::new(id, format!("item-{}", id)))
        .collect()
}

/// Releases a held page
#[derive(Debug, Clone)]
pub struct PageGate(Arc<Notify>);

impl PageGate {
    pub fn release(&self) {
        self.0.notify_one();
    }
}

type Scripted<E> = Result<Vec<E>, LoadError>;

/// In-memory list source driven by a script
pub struct ScriptedSource<E> {
    responses: Mutex<HashMap<u32, VecDeque<Scripted<E>>>>,
    holds: Mutex<HashMap<u32, Arc<Notify>>>,
    calls: Mutex<Vec<u32>>,
}

impl<E> Default for ScriptedSource<E> {
    fn default() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl<E> ScriptedSource<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for a page
    pub fn push_page(&self, page: u32, items: Vec<E>) {
        self.push(page, Ok(items));
    }

    /// Queue a failure for a page
    pub fn push_error(&self, page: u32, error: LoadError) {
        self.push(page, Err(error));
    }

    fn push(&self, page: u32, response: Scripted<E>) {
        self.responses
            .lock()
            .unwrap()
            .entry(page)
            .or_default()
            .push_back(response);
    }

    /// Hold the next request for `page` until the returned gate is released
    pub fn hold_page(&self, page: u32) -> PageGate {
        let notify = Arc::new(Notify::new());
        self.holds.lock().unwrap().insert(page, Arc::clone(&notify));
        PageGate(notify)
    }

    /// Page indices requested so far, in call order
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, page: u32) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| **p == page).count()
    }
}

#[async_trait]
impl<E: Entity> ListSource<E> for ScriptedSource<E> {
    async fn list_entities(&self, page: u32, _query: &QueryKey) -> Result<ListResponse<E>, LoadError> {
        self.calls.lock().unwrap().push(page);

        let hold = self.holds.lock().unwrap().remove(&page);
        if let Some(notify) = hold {
            notify.notified().await;
        }

        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&page)
            .and_then(VecDeque::pop_front);

        match next {
            Some(Ok(items)) => Ok(ListResponse::new(items)),
            Some(Err(err)) => Err(err),
            None => Ok(ListResponse::new(Vec::new())),
        }
    }
}
