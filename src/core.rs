//! Core PageHaus functionality
//!
//! This module contains the main PageHaus struct, which owns the shared
//! cache registry and signal manager and mounts pickers on them.

use std::path::Path;
use std::sync::Arc;

use cache_system::{CacheParams, CacheRegistry};
use config::AppConfig;
use list_source::{Entity, ListSource, QueryKey};
use signal_system::SignalManager;
use tokio::task::JoinHandle;

use crate::errors::PageHausError;
use crate::picker::{FormField, Picker};

/// Main PageHaus coordinator that owns the cache registry and signals
pub struct PageHaus {
    config: AppConfig,
    signals: Arc<SignalManager>,
    registry: Arc<CacheRegistry>,
}

impl std::fmt::Debug for PageHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHaus")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

impl PageHaus {
    /// Create new PageHaus from a validated configuration
    pub fn new(config: AppConfig) -> Result<Self, PageHausError> {
        config.validate()?;

        let signals = Arc::new(SignalManager::new(config.signal.clone()));
        let registry = CacheRegistry::new(CacheParams::from(&config.cache), Arc::clone(&signals));

        Ok(Self {
            config,
            signals,
            registry,
        })
    }

    /// Create PageHaus from `.env` / `PAGEHAUS_CONFIG` / `./pagehaus.toml`
    pub fn from_config() -> Result<Self, PageHausError> {
        Self::new(AppConfig::load()?)
    }

    /// Create PageHaus from a specific TOML file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, PageHausError> {
        Self::new(AppConfig::from_file(path)?)
    }

    /// Mount a picker on the shared cache for `key`
    ///
    /// The first picker mounted for a key decides its list source. Fails
    /// when the signal manager has no room for the picker's subscription.
    pub fn mount_picker<E, F>(
        &self,
        key: QueryKey,
        source: Arc<dyn ListSource<E>>,
        field: F,
    ) -> Result<Picker<E>, PageHausError>
    where
        E: Entity,
        F: FormField<E::Id> + 'static,
    {
        let handle = self.registry.acquire(key, source)?;
        crate::debug_log!(query = %handle.key(), "picker mounted");

        Picker::new(
            handle,
            Arc::new(field),
            Arc::clone(&self.signals),
            &self.config.trigger,
        )
    }

    /// Start the background eviction sweep at the configured interval
    pub fn spawn_gc(&self) -> JoinHandle<()> {
        self.registry.spawn_gc(self.config.cache.gc_interval())
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }

    pub fn signals(&self) -> &Arc<SignalManager> {
        &self.signals
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::SelectionState;
    use config::{CacheConfig, SignalConfig};
    use list_source::testing::{numbered, ScriptedSource, TestItem};

    #[test]
    fn test_rejects_invalid_config() {
        let config = AppConfig {
            cache: CacheConfig::new(0, 300, 600, 60),
            ..AppConfig::default()
        };
        assert!(matches!(
            PageHaus::new(config),
            Err(PageHausError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_mount_fails_when_subscriptions_are_full() {
        let config = AppConfig {
            signal: SignalConfig::new(1),
            ..AppConfig::default()
        };
        let pagehaus = PageHaus::new(config).unwrap();
        let source = Arc::new(ScriptedSource::<TestItem>::new());
        let key = QueryKey::new("items");

        let first = pagehaus
            .mount_picker::<TestItem, _>(key.clone(), source.clone(), SelectionState::new())
            .unwrap();
        let err = pagehaus
            .mount_picker::<TestItem, _>(key.clone(), source.clone(), SelectionState::new())
            .unwrap_err();
        assert!(matches!(err, PageHausError::SubscriptionRejected { .. }));
        assert_eq!(pagehaus.registry().consumer_count(&key), Some(1));

        drop(first);
        let mut second = pagehaus
            .mount_picker::<TestItem, _>(key.clone(), source.clone(), SelectionState::new())
            .unwrap();
        second.take_dirty();
        second.open().unwrap().settled().await.unwrap();
        assert!(second.take_dirty());
    }

    #[tokio::test]
    async fn test_pickers_on_same_key_share_cache() {
        let pagehaus = PageHaus::new(AppConfig::default()).unwrap();
        let source = Arc::new(ScriptedSource::new());
        source.push_page(1, numbered(1..=10));
        let key = QueryKey::new("items");

        let mut first = pagehaus
            .mount_picker::<TestItem, _>(key.clone(), source.clone(), SelectionState::new())
            .unwrap();
        let second = pagehaus
            .mount_picker::<TestItem, _>(key.clone(), source.clone(), SelectionState::new())
            .unwrap();

        assert!(Arc::ptr_eq(first.cache(), second.cache()));
        assert_eq!(pagehaus.registry().consumer_count(&key), Some(2));

        first.open().unwrap().settled().await.unwrap();
        assert_eq!(second.render().rows.len(), 10);

        drop(first);
        drop(second);
        assert_eq!(pagehaus.registry().consumer_count(&key), Some(0));
    }
}
