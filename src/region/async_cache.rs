//! Async region cache facade.
//!
//! Same contract as [`RegionCache`](crate::region::RegionCache). Storage calls are
//! in-memory and short, so they run inline on the calling task; the store's own
//! locking is the only serialization between concurrent callers.

use std::sync::Arc;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::invalidation::Broadcaster;
use crate::region::{RegionCore, RegionSizes};
use crate::store::{CacheStats, ExpiringStore, Expiration, MemoryStore};

// == Async Region Cache ==
/// Async region cache. Clones share the same store and broadcaster, so one
/// instance can be handed to any number of tasks.
pub struct AsyncRegionCache<V> {
    core: Arc<RegionCore<V>>,
}

impl<V> Clone for AsyncRegionCache<V> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<V> AsyncRegionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a facade over `store`, signaling through the process-wide broadcaster.
    pub fn new<S>(store: S, config: &CacheConfig) -> Self
    where
        S: ExpiringStore<V> + 'static,
    {
        Self::with_broadcaster(store, config, Broadcaster::global().clone())
    }

    pub fn with_broadcaster<S>(store: S, config: &CacheConfig, broadcaster: Broadcaster) -> Self
    where
        S: ExpiringStore<V> + 'static,
    {
        Self {
            core: Arc::new(RegionCore::new(
                Arc::new(store),
                broadcaster,
                config.expiration,
            )),
        }
    }

    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(MemoryStore::from_config(config), config)
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        self.core.broadcaster()
    }

    // == Add ==
    /// Stores `value` under (`key`, `region`) unless an entry already exists.
    pub async fn add(&self, key: &str, value: V, region: Option<&str>) -> Result<bool> {
        self.core
            .add(key, value, region, self.core.default_expiration())
    }

    pub async fn add_non_expiring(&self, key: &str, value: V, region: Option<&str>) -> Result<bool> {
        self.core.add(key, value, region, Expiration::Never)
    }

    pub async fn add_with_expiration(
        &self,
        key: &str,
        value: V,
        region: Option<&str>,
        expiration: Expiration,
    ) -> Result<bool> {
        self.core.add(key, value, region, expiration)
    }

    // == Lookups ==
    pub async fn get(&self, key: &str, region: Option<&str>) -> Result<Option<V>> {
        self.core.get(key, region)
    }

    pub async fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
        self.core.contains(key, region)
    }

    // == Removal ==
    pub async fn remove(&self, key: &str, region: Option<&str>) -> Result<bool> {
        self.core.remove(key, region)
    }

    /// Invalidates every entry subscribed to `region` (default region for `None`).
    pub async fn clear(&self, region: Option<&str>) -> usize {
        self.core.clear(region)
    }

    pub async fn clear_all(&self) -> usize {
        self.core.clear_all()
    }

    // == Accounting ==
    pub async fn size(&self) -> Result<usize> {
        self.core.size()
    }

    pub async fn size_by_region(&self) -> Result<RegionSizes> {
        self.core.size_by_region()
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        self.core.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    fn test_cache() -> AsyncRegionCache<String> {
        AsyncRegionCache::with_broadcaster(
            MemoryStore::new(None),
            &CacheConfig::default(),
            Broadcaster::new(),
        )
    }

    #[tokio::test]
    async fn test_add_get_remove() {
        let cache = test_cache();

        assert!(cache.add("k", "v".into(), Some("r")).await.unwrap());
        assert!(!cache.add("k", "other".into(), Some("r")).await.unwrap());
        assert_eq!(cache.get("k", Some("r")).await.unwrap(), Some("v".into()));

        assert!(cache.remove("k", Some("r")).await.unwrap());
        assert!(!cache.contains("k", Some("r")).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let cache = test_cache();
        let result = cache.add("", "v".into(), None).await;
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_clear_twice_is_idempotent() {
        let cache = test_cache();

        cache.add("k", "v".into(), Some("r")).await.unwrap();
        assert_eq!(cache.clear(Some("r")).await, 1);
        assert_eq!(cache.clear(Some("r")).await, 0);
        assert_eq!(cache.get("k", Some("r")).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_store_one_value() {
        let cache = test_cache();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.add("shared", format!("v{}", i), Some("r")).await })
            })
            .collect();

        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                added += 1;
            }
        }

        assert_eq!(added, 1);
        assert_eq!(cache.size().await.unwrap(), 1);
        assert_eq!(cache.broadcaster().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_size_by_region() {
        let cache = test_cache();

        cache.add("a", "1".into(), Some("x")).await.unwrap();
        cache.add("b", "2".into(), Some("x")).await.unwrap();

        let sizes = cache.size_by_region().await.unwrap();
        assert_eq!(sizes.get("x"), Some(&2));
        assert_eq!(cache.stats().await.unwrap().total_entries, 2);
    }

    #[test]
    fn test_add_with_expiration_on_blocking_runtime() {
        let cache = test_cache();

        tokio_test::block_on(async {
            let short = Expiration::Sliding(std::time::Duration::from_millis(30));
            assert!(cache.add_with_expiration("short", "v".into(), None, short).await.unwrap());
            assert!(cache
                .add_with_expiration("pinned", "v".into(), None, Expiration::Never)
                .await
                .unwrap());
        });

        std::thread::sleep(std::time::Duration::from_millis(60));

        tokio_test::block_on(async {
            assert_eq!(cache.get("short", None).await.unwrap(), None);
            assert_eq!(cache.get("pinned", None).await.unwrap(), Some("v".into()));
        });
    }
}
