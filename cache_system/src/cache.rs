//! Page cache implementation
//!
//! One `PageCache` orchestrates the ordered page fetches of a single query
//! key. All bookkeeping happens synchronously under one mutex; the only
//! suspension point is the remote call, which runs in a spawned task so
//! that a consumer going away never cancels a fetch mid-flight.

use crate::page::{Page, PageStatus};
use crate::params::CacheParams;
use list_source::{Entity, ListResponse, LoadError, PagedFetcher, QueryKey};
use signal_system::{CacheEvent, CacheEventKind, SignalManager};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Why `fetch_next_page` did nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The last successful page was short, or the only page failed
    NoNextPage,
    /// A fetch for this key is already Loading
    InFlight,
    /// Bookkeeping refused the next index (never seen from correct callers)
    Rejected(LoadError),
}

/// How a fetch settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Committed { items: usize },
    Failed(LoadError),
    /// The cache was invalidated while the fetch was in flight
    Discarded,
}

/// Result of one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub index: u32,
    pub settlement: Settlement,
}

/// Answer of `fetch_next_page`
#[derive(Debug)]
pub enum FetchRequest {
    /// A fetch was started; dropping the handle does not cancel it
    Issued {
        index: u32,
        handle: JoinHandle<FetchOutcome>,
    },
    Skipped(SkipReason),
}

impl FetchRequest {
    pub fn is_issued(&self) -> bool {
        matches!(self, FetchRequest::Issued { .. })
    }

    /// Wait for an issued fetch to settle
    pub async fn settled(self) -> Option<FetchOutcome> {
        match self {
            FetchRequest::Issued { handle, .. } => handle.await.ok(),
            FetchRequest::Skipped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    index: u32,
    generation: u64,
}

struct CacheState<E> {
    pages: Vec<Page<E>>,
    flattened: Arc<Vec<E>>,
    has_next_page: bool,
    in_flight: Option<InFlight>,
    generation: u64,
    last_success_at: Option<Instant>,
    version: u64,
}

impl<E: Clone> CacheState<E> {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            flattened: Arc::new(Vec::new()),
            has_next_page: false,
            in_flight: None,
            generation: 0,
            last_success_at: None,
            version: 0,
        }
    }

    fn success_count(&self) -> u32 {
        self.pages.iter().filter(|p| p.is_success()).count() as u32
    }

    /// Index the next fetch would request
    ///
    /// An empty cache always admits its initial page.
    fn next_index(&self) -> Option<u32> {
        if self.pages.is_empty() {
            return Some(1);
        }
        self.has_next_page.then(|| self.success_count() + 1)
    }

    /// Create (or reuse a failed) page at `index` and mark it Loading
    fn begin(&mut self, index: u32) -> Result<(), LoadError> {
        let len = self.pages.len() as u32;
        if index == len + 1 {
            let mut page = Page::new(index);
            page.mark_loading()?;
            self.pages.push(page);
            return Ok(());
        }

        match self.pages.last_mut() {
            Some(last) if index == len && last.status() == PageStatus::Error => last.mark_loading(),
            _ => Err(LoadError::invariant(format!(
                "page {} is out of sequence after {} pages",
                index, len
            ))),
        }
    }

    fn page_mut(&mut self, index: u32) -> Result<&mut Page<E>, LoadError> {
        self.pages
            .iter_mut()
            .find(|p| p.index() == index)
            .ok_or_else(|| LoadError::invariant(format!("page {} is not tracked", index)))
    }

    fn refresh_flattened(&mut self) {
        let items: Vec<E> = self
            .pages
            .iter()
            .filter(|p| p.is_success())
            .flat_map(|p| p.items().iter().cloned())
            .collect();
        self.flattened = Arc::new(items);
    }
}

/// Ordered page sequence, flattened candidate list and continuation
/// signal for one query key
pub struct PageCache<E: Entity> {
    key: QueryKey,
    fetcher: PagedFetcher<E>,
    params: CacheParams,
    signals: Arc<SignalManager>,
    state: Mutex<CacheState<E>>,
}

impl<E: Entity> std::fmt::Debug for PageCache<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("PageCache")
            .field("key", &self.key)
            .field("pages", &state.pages.len())
            .field("items", &state.flattened.len())
            .field("has_next_page", &state.has_next_page)
            .field("fetching", &state.in_flight.map(|f| f.index))
            .finish()
    }
}

impl<E: Entity> PageCache<E> {
    pub fn new(fetcher: PagedFetcher<E>, params: CacheParams, signals: Arc<SignalManager>) -> Self {
        Self {
            key: fetcher.query().clone(),
            fetcher,
            params,
            signals,
            state: Mutex::new(CacheState::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<E>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn params(&self) -> &CacheParams {
        &self.params
    }

    /// Snapshot of the ordered page sequence
    pub fn pages(&self) -> Vec<Page<E>> {
        self.lock().pages.clone()
    }

    pub fn page_status(&self, index: u32) -> Option<PageStatus> {
        self.lock()
            .pages
            .iter()
            .find(|p| p.index() == index)
            .map(Page::status)
    }

    /// Concatenation of all Success pages' items, in index order
    ///
    /// The same allocation is returned until the page set changes.
    pub fn flattened_items(&self) -> Arc<Vec<E>> {
        Arc::clone(&self.lock().flattened)
    }

    pub fn has_next_page(&self) -> bool {
        self.lock().has_next_page
    }

    pub fn is_fetching(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Index currently Loading, if any
    pub fn fetching_index(&self) -> Option<u32> {
        self.lock().in_flight.map(|f| f.index)
    }

    /// No page has been requested since creation or the last invalidation
    pub fn is_empty(&self) -> bool {
        self.lock().pages.is_empty()
    }

    /// Error of the most recent page, when that page failed
    pub fn last_error(&self) -> Option<(u32, LoadError)> {
        let state = self.lock();
        state
            .pages
            .last()
            .and_then(|p| p.error().map(|e| (p.index(), e.clone())))
    }

    /// Within staleTime of the last successful fetch
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }

    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.lock()
            .last_success_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.params.stale_time)
    }

    /// Holds committed data that is past its staleTime
    ///
    /// A cache whose only page failed is not stale; it waits for a retry.
    pub fn is_stale(&self) -> bool {
        let now = Instant::now();
        self.lock()
            .last_success_at
            .is_some_and(|at| now.saturating_duration_since(at) >= self.params.stale_time)
    }

    /// Bumped on every page transition and invalidation
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Start fetching the next page
    ///
    /// No-op unless a next page exists and nothing is Loading for this key;
    /// an empty cache always admits page 1. The remote call runs in its own
    /// task and commits to this cache even if every consumer is gone.
    pub fn fetch_next_page(self: &Arc<Self>) -> FetchRequest {
        let (index, generation) = {
            let mut state = self.lock();
            if state.in_flight.is_some() {
                return FetchRequest::Skipped(SkipReason::InFlight);
            }
            let Some(index) = state.next_index() else {
                return FetchRequest::Skipped(SkipReason::NoNextPage);
            };
            if let Err(err) = state.begin(index) {
                tracing::warn!(query = %self.key, page = index, error = %err, "refusing page fetch");
                return FetchRequest::Skipped(SkipReason::Rejected(err));
            }
            let generation = state.generation;
            state.in_flight = Some(InFlight { index, generation });
            state.version += 1;
            (index, generation)
        };

        #[cfg(feature = "debug-logging")]
        tracing::debug!(query = %self.key, page = index, "page loading");

        self.signals.emit(
            CacheEvent::new(CacheEventKind::PageLoading, self.key.to_string()).with_page(index),
        );

        let cache = Arc::clone(self);
        let handle = tokio::spawn(async move {
            // A panicking source must still release the key
            let fetcher = cache.fetcher.clone();
            let result = match tokio::spawn(async move { fetcher.fetch(index).await }).await {
                Ok(result) => result,
                Err(err) => Err(LoadError::transport(format!("page fetch aborted: {}", err))),
            };
            cache.settle(index, generation, result)
        });

        FetchRequest::Issued { index, handle }
    }

    fn settle(
        &self,
        index: u32,
        generation: u64,
        result: Result<ListResponse<E>, LoadError>,
    ) -> FetchOutcome {
        let (settlement, event) = {
            let mut state = self.lock();
            state.in_flight = None;

            if generation != state.generation {
                tracing::debug!(query = %self.key, page = index, "discarding fetch from before invalidation");
                return FetchOutcome {
                    index,
                    settlement: Settlement::Discarded,
                };
            }

            let now = Instant::now();
            let page_size = self.params.page_size;
            let applied = state.page_mut(index).and_then(|page| match result {
                Ok(response) => {
                    let count = response.data.len();
                    page.succeed(response.data).map(|_| Ok(count))
                }
                Err(err) => page.fail(err.clone()).map(|_| Err(err)),
            });

            state.version += 1;
            match applied {
                Ok(Ok(count)) => {
                    state.has_next_page = count >= page_size;
                    state.last_success_at = Some(now);
                    state.refresh_flattened();
                    (
                        Settlement::Committed { items: count },
                        CacheEvent::new(CacheEventKind::PageCommitted, self.key.to_string())
                            .with_page(index)
                            .with_item_count(count),
                    )
                }
                Ok(Err(err)) | Err(err) => {
                    tracing::warn!(query = %self.key, page = index, error = %err, "page fetch failed");
                    (
                        Settlement::Failed(err.clone()),
                        CacheEvent::new(CacheEventKind::PageFailed, self.key.to_string())
                            .with_page(index)
                            .with_error(err.to_string()),
                    )
                }
            }
        };

        self.signals.emit(event);
        FetchOutcome { index, settlement }
    }

    /// Discard every page so the next fetch starts again from page 1
    ///
    /// A fetch still in flight keeps the key busy until it settles and is
    /// then discarded instead of committed.
    pub fn invalidate(&self) {
        Self::reset(&mut self.lock());
        self.announce_invalidated();
    }

    /// Invalidate unless a fetch is in flight; returns whether it did
    ///
    /// Callers that refetch right after invalidating use this, since a
    /// discarded in-flight fetch would otherwise leave the key empty.
    pub fn invalidate_if_idle(&self) -> bool {
        {
            let mut state = self.lock();
            if state.in_flight.is_some() {
                return false;
            }
            Self::reset(&mut state);
        }
        self.announce_invalidated();
        true
    }

    fn reset(state: &mut CacheState<E>) {
        state.generation += 1;
        state.pages.clear();
        state.flattened = Arc::new(Vec::new());
        state.has_next_page = false;
        state.last_success_at = None;
        state.version += 1;
    }

    fn announce_invalidated(&self) {
        #[cfg(feature = "debug-logging")]
        tracing::debug!(query = %self.key, "cache invalidated");

        self.signals
            .emit(CacheEvent::new(CacheEventKind::Invalidated, self.key.to_string()));
    }
}
