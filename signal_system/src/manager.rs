use crate::event::CacheEvent;
use crate::types::{CallbackId, EventCallback};
use config::SignalConfig;
use std::sync::{Arc, RwLock};

/// Signal manager for page cache notifications
pub struct SignalManager {
    config: SignalConfig,
    callbacks: RwLock<Vec<(CallbackId, EventCallback)>>,
    emitted: std::sync::atomic::AtomicU64,
}

/// Snapshot of manager counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalStats {
    pub callback_count: usize,
    pub events_emitted: u64,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .field("max_callbacks", &self.config.max_callbacks)
            .finish()
    }
}

impl SignalManager {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            callbacks: RwLock::new(Vec::new()),
            emitted: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Add event callback
    ///
    /// Returns `None` once `max_callbacks` subscribers are registered.
    pub fn add_callback<F>(&self, callback: F) -> Option<CallbackId>
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        let mut callbacks = self.callbacks.write().unwrap_or_else(|e| e.into_inner());
        if callbacks.len() >= self.config.max_callbacks {
            tracing::warn!(
                max_callbacks = self.config.max_callbacks,
                "signal callback limit reached, subscription rejected"
            );
            return None;
        }

        let id = CallbackId::new();
        callbacks.push((id, Arc::new(callback)));
        Some(id)
    }

    /// Remove a callback by id, returns whether it was registered
    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut callbacks = self.callbacks.write().unwrap_or_else(|e| e.into_inner());
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Emit event to all subscribers
    ///
    /// Callbacks run after the registry lock is released, so a callback
    /// may itself subscribe or unsubscribe.
    pub fn emit(&self, event: CacheEvent) {
        let snapshot: Vec<EventCallback> = {
            let callbacks = self.callbacks.read().unwrap_or_else(|e| e.into_inner());
            callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };

        self.emitted
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        for callback in snapshot {
            callback(&event);
        }
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        let mut callbacks = self.callbacks.write().unwrap_or_else(|e| e.into_inner());
        callbacks.clear();
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn stats(&self) -> SignalStats {
        SignalStats {
            callback_count: self.callback_count(),
            events_emitted: self.emitted.load(std::sync::atomic::Ordering::Relaxed),
        }
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}
