//! Process-wide cache registry
//!
//! One `PageCache` per `QueryKey`, shared by every consumer that asks for
//! the same key. Consumers hold a `CacheHandle`; when the last handle for a
//! key drops, the cache stays resident for `gc_time` and is then evicted.

use crate::cache::PageCache;
use crate::errors::CacheError;
use crate::params::CacheParams;
use list_source::{Entity, ListSource, PagedFetcher, QueryKey};
use signal_system::{CacheEvent, CacheEventKind, SignalManager};
use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

struct RegistryEntry {
    cache: Arc<dyn Any + Send + Sync>,
    consumers: usize,
    idle_since: Option<Instant>,
}

/// Registry of shared page caches keyed by query
pub struct CacheRegistry {
    params: CacheParams,
    signals: Arc<SignalManager>,
    entries: Mutex<HashMap<QueryKey, RegistryEntry>>,
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("params", &self.params)
            .field("entries", &self.len())
            .finish()
    }
}

impl CacheRegistry {
    pub fn new(params: CacheParams, signals: Arc<SignalManager>) -> Arc<Self> {
        Arc::new(Self {
            params,
            signals,
            entries: Mutex::new(HashMap::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, RegistryEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn params(&self) -> &CacheParams {
        &self.params
    }

    pub fn signals(&self) -> &Arc<SignalManager> {
        &self.signals
    }

    /// Mount a consumer on the cache for `key`, creating it on first access
    ///
    /// The source is only used when the cache is created; later consumers
    /// share the first one's fetcher.
    pub fn acquire<E: Entity>(
        self: &Arc<Self>,
        key: QueryKey,
        source: Arc<dyn ListSource<E>>,
    ) -> Result<CacheHandle<E>, CacheError> {
        self.evict_expired();

        let (cache, created) = {
            let mut entries = self.lock();
            match entries.entry(key.clone()) {
                Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    let cache = Arc::clone(&entry.cache)
                        .downcast::<PageCache<E>>()
                        .map_err(|_| CacheError::TypeMismatch {
                            key: key.to_string(),
                        })?;
                    entry.consumers += 1;
                    entry.idle_since = None;
                    (cache, false)
                }
                Entry::Vacant(vacant) => {
                    let fetcher = PagedFetcher::new(source, key.clone());
                    let cache = Arc::new(PageCache::new(
                        fetcher,
                        self.params,
                        Arc::clone(&self.signals),
                    ));
                    let shared: Arc<dyn Any + Send + Sync> = cache.clone();
                    vacant.insert(RegistryEntry {
                        cache: shared,
                        consumers: 1,
                        idle_since: None,
                    });
                    (cache, true)
                }
            }
        };

        if created {
            #[cfg(feature = "debug-logging")]
            tracing::debug!(query = %key, "page cache created");

            self.signals
                .emit(CacheEvent::new(CacheEventKind::Created, key.to_string()));
        }

        Ok(CacheHandle {
            cache,
            registry: Arc::clone(self),
            key,
        })
    }

    /// Peek at a resident cache without mounting a consumer
    pub fn get<E: Entity>(&self, key: &QueryKey) -> Option<Arc<PageCache<E>>> {
        self.lock()
            .get(key)
            .and_then(|entry| Arc::clone(&entry.cache).downcast::<PageCache<E>>().ok())
    }

    fn release(&self, key: &QueryKey) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.consumers = entry.consumers.saturating_sub(1);
            if entry.consumers == 0 {
                entry.idle_since = Some(Instant::now());
            }
        }
    }

    /// Evict caches with no consumers idle for at least `gc_time`
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let gc_time = self.params.gc_time;

        let evicted: Vec<QueryKey> = {
            let mut entries = self.lock();
            let expired: Vec<QueryKey> = entries
                .iter()
                .filter(|(_, entry)| {
                    entry.consumers == 0
                        && entry
                            .idle_since
                            .is_some_and(|since| now.saturating_duration_since(since) >= gc_time)
                })
                .map(|(key, _)| key.clone())
                .collect();
            for key in &expired {
                entries.remove(key);
            }
            expired
        };

        for key in &evicted {
            #[cfg(feature = "debug-logging")]
            tracing::debug!(query = %key, "page cache evicted");

            self.signals
                .emit(CacheEvent::new(CacheEventKind::Evicted, key.to_string()));
        }
        evicted.len()
    }

    /// Run `evict_expired` every `interval` until the registry is dropped
    pub fn spawn_gc(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let registry: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match registry.upgrade() {
                    Some(registry) => {
                        registry.evict_expired();
                    }
                    None => break,
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Mounted consumers of a resident cache
    pub fn consumer_count(&self, key: &QueryKey) -> Option<usize> {
        self.lock().get(key).map(|entry| entry.consumers)
    }
}

/// A mounted consumer of a shared page cache
///
/// Dereferences to the shared `Arc<PageCache<E>>`; dropping it unmounts.
pub struct CacheHandle<E: Entity> {
    cache: Arc<PageCache<E>>,
    registry: Arc<CacheRegistry>,
    key: QueryKey,
}

impl<E: Entity> CacheHandle<E> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn cache(&self) -> &Arc<PageCache<E>> {
        &self.cache
    }
}

impl<E: Entity> Deref for CacheHandle<E> {
    type Target = Arc<PageCache<E>>;

    fn deref(&self) -> &Self::Target {
        &self.cache
    }
}

impl<E: Entity> std::fmt::Debug for CacheHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle")
            .field("key", &self.key)
            .finish()
    }
}

impl<E: Entity> Drop for CacheHandle<E> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use list_source::testing::{numbered, ScriptedSource, TestItem};

    #[derive(Debug, Clone)]
    struct Other;

    impl Entity for Other {
        type Id = u8;
        fn id(&self) -> u8 {
            0
        }
        fn label(&self) -> String {
            String::new()
        }
        fn searchable_text(&self) -> String {
            String::new()
        }
    }

    fn registry() -> Arc<CacheRegistry> {
        CacheRegistry::new(CacheParams::default(), Arc::new(SignalManager::default()))
    }

    #[tokio::test]
    async fn test_same_key_shares_one_cache() {
        let registry = registry();
        let source = Arc::new(ScriptedSource::new());
        source.push_page(1, numbered(1..=10));
        let key = QueryKey::new("items");

        let a = registry.acquire::<TestItem>(key.clone(), source.clone()).unwrap();
        let b = registry.acquire::<TestItem>(key.clone(), source.clone()).unwrap();
        assert!(Arc::ptr_eq(a.cache(), b.cache()));
        assert_eq!(registry.consumer_count(&key), Some(2));

        a.fetch_next_page().settled().await.unwrap();
        assert_eq!(b.flattened_items().len(), 10);
        assert_eq!(source.calls_for(1), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let registry = registry();
        let source = Arc::new(ScriptedSource::<TestItem>::new());
        let a = registry
            .acquire::<TestItem>(QueryKey::new("items").with_filter("kind", "a"), source.clone())
            .unwrap();
        let b = registry
            .acquire::<TestItem>(QueryKey::new("items").with_filter("kind", "b"), source.clone())
            .unwrap();
        assert!(!Arc::ptr_eq(a.cache(), b.cache()));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_an_error() {
        let registry = registry();
        let key = QueryKey::new("items");
        let _items = registry
            .acquire::<TestItem>(key.clone(), Arc::new(ScriptedSource::<TestItem>::new()))
            .unwrap();

        let err = registry
            .acquire::<Other>(key.clone(), Arc::new(ScriptedSource::<Other>::new()))
            .unwrap_err();
        assert!(matches!(err, CacheError::TypeMismatch { .. }));
        assert_eq!(registry.consumer_count(&key), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_after_gc_time_without_consumers() {
        let registry = registry();
        let key = QueryKey::new("items");
        let source: Arc<ScriptedSource<TestItem>> = Arc::new(ScriptedSource::new());

        let handle = registry.acquire::<TestItem>(key.clone(), source.clone()).unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(registry.evict_expired(), 0, "mounted caches are never evicted");

        drop(handle);
        assert_eq!(registry.consumer_count(&key), Some(0));
        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(registry.evict_expired(), 0);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(registry.evict_expired(), 1);
        assert!(!registry.contains(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remount_within_gc_time_keeps_pages() {
        let registry = registry();
        let key = QueryKey::new("items");
        let source = Arc::new(ScriptedSource::new());
        source.push_page(1, numbered(1..=10));

        let handle = registry.acquire::<TestItem>(key.clone(), source.clone()).unwrap();
        handle.fetch_next_page().settled().await.unwrap();
        drop(handle);

        tokio::time::advance(Duration::from_secs(300)).await;
        let handle = registry.acquire::<TestItem>(key.clone(), source.clone()).unwrap();
        assert_eq!(handle.flattened_items().len(), 10);

        drop(handle);
        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(registry.evict_expired(), 0, "idle clock restarts on remount");
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_gc_sweeps_and_stops_with_registry() {
        let registry = registry();
        let key = QueryKey::new("items");
        let handle = registry
            .acquire::<TestItem>(key.clone(), Arc::new(ScriptedSource::<TestItem>::new()))
            .unwrap();
        let gc = registry.spawn_gc(Duration::from_secs(60));
        drop(handle);

        tokio::time::sleep(Duration::from_secs(661)).await;
        assert!(!registry.contains(&key));

        drop(registry);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(gc.is_finished());
    }
}
