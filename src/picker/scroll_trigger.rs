//! Scroll trigger
//!
//! Watches the visibility of a sentinel placed after the last list row and
//! asks the page cache for the next page when it scrolls into view. Only a
//! not-visible -> visible transition counts, and issued requests are
//! throttled so a burst of transitions collapses into one fetch.

use crate::picker::lifecycle::GateState;
use cache_system::{FetchRequest, PageCache, SkipReason};
use config::TriggerConfig;
use list_source::Entity;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

static NEXT_SENTINEL: AtomicU64 = AtomicU64::new(1);

/// Host-side handle of a sentinel node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SentinelId(u64);

impl SentinelId {
    pub fn next() -> Self {
        Self(NEXT_SENTINEL.fetch_add(1, Ordering::Relaxed))
    }
}

/// Why a visibility transition did not issue a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suppression {
    /// The picker surface is closed
    Disabled,
    NoNextPage,
    InFlight,
    /// Inside the throttle window of the last issued request
    Throttled,
}

#[derive(Debug)]
pub enum TriggerOutcome {
    /// Not a not-visible -> visible transition of the observed sentinel
    Ignored,
    Issued(FetchRequest),
    Suppressed(Suppression),
}

impl TriggerOutcome {
    pub fn is_issued(&self) -> bool {
        matches!(self, TriggerOutcome::Issued(_))
    }
}

pub struct ScrollTrigger<E: Entity> {
    cache: Arc<PageCache<E>>,
    gate: watch::Receiver<GateState>,
    throttle_delay: Duration,
    sentinel: Option<SentinelId>,
    visible: bool,
    seen_opened: u64,
    last_issued: Option<Instant>,
    throttled_at: Option<Instant>,
}

impl<E: Entity> std::fmt::Debug for ScrollTrigger<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollTrigger")
            .field("query", self.cache.key())
            .field("sentinel", &self.sentinel)
            .field("visible", &self.visible)
            .field("throttle_delay", &self.throttle_delay)
            .finish()
    }
}

impl<E: Entity> ScrollTrigger<E> {
    pub fn new(
        cache: Arc<PageCache<E>>,
        gate: watch::Receiver<GateState>,
        config: &TriggerConfig,
    ) -> Self {
        let seen_opened = gate.borrow().opened;
        Self {
            cache,
            gate,
            throttle_delay: config.throttle_delay(),
            sentinel: None,
            visible: false,
            seen_opened,
            last_issued: None,
            throttled_at: None,
        }
    }

    /// Start watching a sentinel; any previous one is forgotten
    pub fn observe(&mut self, sentinel: SentinelId) {
        self.sentinel = Some(sentinel);
        self.visible = false;
    }

    pub fn sentinel(&self) -> Option<SentinelId> {
        self.sentinel
    }

    /// Armed iff the lifecycle gate is open
    pub fn enabled(&self) -> bool {
        self.gate.borrow().is_open()
    }

    /// A recent trigger was swallowed by the throttle window
    pub fn is_throttled(&self) -> bool {
        self.is_throttled_at(Instant::now())
    }

    fn is_throttled_at(&self, now: Instant) -> bool {
        self.throttled_at.is_some() && self.within_window(now)
    }

    fn within_window(&self, now: Instant) -> bool {
        self.last_issued
            .is_some_and(|at| now.saturating_duration_since(at) < self.throttle_delay)
    }

    /// Host notification that the sentinel's visibility changed
    pub fn notify_visibility(&mut self, sentinel: SentinelId, visible: bool) -> TriggerOutcome {
        if self.sentinel != Some(sentinel) {
            return TriggerOutcome::Ignored;
        }

        // The sentinel is unmounted with a closed surface; after reopening
        // its first visibility report is a fresh transition.
        let opened = self.gate.borrow().opened;
        if opened != self.seen_opened {
            self.seen_opened = opened;
            self.visible = false;
        }

        let became_visible = visible && !self.visible;
        self.visible = visible;
        if !became_visible {
            return TriggerOutcome::Ignored;
        }
        self.on_become_visible()
    }

    fn on_become_visible(&mut self) -> TriggerOutcome {
        let now = Instant::now();

        if !self.enabled() {
            return TriggerOutcome::Suppressed(Suppression::Disabled);
        }
        if !self.cache.has_next_page() {
            self.last_issued = None;
            self.throttled_at = None;
            return TriggerOutcome::Suppressed(Suppression::NoNextPage);
        }
        if self.cache.is_fetching() {
            return TriggerOutcome::Suppressed(Suppression::InFlight);
        }
        if self.within_window(now) {
            self.throttled_at = Some(now);
            crate::trace_log!(query = %self.cache.key(), "sentinel trigger throttled");
            return TriggerOutcome::Suppressed(Suppression::Throttled);
        }

        match self.cache.fetch_next_page() {
            FetchRequest::Skipped(SkipReason::InFlight) => {
                TriggerOutcome::Suppressed(Suppression::InFlight)
            }
            FetchRequest::Skipped(_) => TriggerOutcome::Suppressed(Suppression::NoNextPage),
            issued => {
                self.last_issued = Some(now);
                self.throttled_at = None;
                crate::debug_log!(query = %self.cache.key(), "sentinel requested next page");
                TriggerOutcome::Issued(issued)
            }
        }
    }
}
