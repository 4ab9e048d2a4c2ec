//! Blocking region cache facade.

use std::sync::Arc;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::invalidation::Broadcaster;
use crate::region::{RegionCore, RegionSizes};
use crate::store::{CacheStats, ExpiringStore, Expiration, MemoryStore};

// == Region Cache ==
/// Blocking region cache. Clones share the same store and broadcaster.
///
/// # Example
/// ```ignore
/// let cache = RegionCache::in_memory(&CacheConfig::default());
/// cache.add("42", user, Some("users"))?;
/// cache.clear(Some("users"));
/// assert!(cache.get("42", Some("users"))?.is_none());
/// ```
pub struct RegionCache<V> {
    core: Arc<RegionCore<V>>,
}

impl<V> Clone for RegionCache<V> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<V> RegionCache<V>
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

    /// Creates a facade over `store` that signals through `broadcaster`.
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

    /// Creates a facade over a fresh [`MemoryStore`] sized by `config`.
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(MemoryStore::from_config(config), config)
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        self.core.broadcaster()
    }

    // == Add ==
    /// Stores `value` under (`key`, `region`) with the instance's default policy.
    ///
    /// Returns `false` without overwriting when an entry already exists.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty key, `StorageUnavailable` if the store is down.
    pub fn add(&self, key: &str, value: V, region: Option<&str>) -> Result<bool> {
        self.core
            .add(key, value, region, self.core.default_expiration())
    }

    /// Like [`RegionCache::add`], but the entry never expires on its own.
    pub fn add_non_expiring(&self, key: &str, value: V, region: Option<&str>) -> Result<bool> {
        self.core.add(key, value, region, Expiration::Never)
    }

    /// Like [`RegionCache::add`] with an explicit expiration.
    pub fn add_with_expiration(
        &self,
        key: &str,
        value: V,
        region: Option<&str>,
        expiration: Expiration,
    ) -> Result<bool> {
        self.core.add(key, value, region, expiration)
    }

    // == Lookups ==
    /// Returns the value under (`key`, `region`); absence is `Ok(None)`.
    pub fn get(&self, key: &str, region: Option<&str>) -> Result<Option<V>> {
        self.core.get(key, region)
    }

    pub fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
        self.core.contains(key, region)
    }

    // == Removal ==
    /// Removes one entry; returns whether it existed.
    pub fn remove(&self, key: &str, region: Option<&str>) -> Result<bool> {
        self.core.remove(key, region)
    }

    /// Invalidates every entry subscribed to `region` at call time.
    ///
    /// `None` clears the default region only; see [`RegionCache::clear_all`].
    /// Returns the number of entries signaled.
    pub fn clear(&self, region: Option<&str>) -> usize {
        self.core.clear(region)
    }

    /// Invalidates every entry of every region on this facade's broadcaster.
    pub fn clear_all(&self) -> usize {
        self.core.clear_all()
    }

    // == Accounting ==
    pub fn size(&self) -> Result<usize> {
        self.core.size()
    }

    pub fn size_by_region(&self) -> Result<RegionSizes> {
        self.core.size_by_region()
    }

    pub fn stats(&self) -> Result<CacheStats> {
        self.core.stats()
    }
}
