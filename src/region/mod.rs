//! Region Cache Module
//!
//! Region-aware CRUD over an [`ExpiringStore`]. Entries are addressed by
//! (key, region); every stored entry subscribes to its region on the
//! [`Broadcaster`], which is how a whole region is cleared at once.

mod async_cache;
mod cache;


pub use async_cache::AsyncRegionCache;
pub use cache::RegionCache;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::invalidation::Broadcaster;
use crate::key::{physical_key, region_of, region_topic};
use crate::store::{CacheStats, EntryPolicy, ExpiringStore, Expiration};

/// Entry count per region, as reported by `size_by_region`.
pub type RegionSizes = BTreeMap<String, usize>;

// == Region Core ==
/// State and logic shared by the blocking and async facades.
pub(crate) struct RegionCore<V> {
    store: Arc<dyn ExpiringStore<V>>,
    broadcaster: Broadcaster,
    expiration: Expiration,
}

impl<V> RegionCore<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        store: Arc<dyn ExpiringStore<V>>,
        broadcaster: Broadcaster,
        expiration: Expiration,
    ) -> Self {
        Self {
            store,
            broadcaster,
            expiration,
        }
    }

    pub(crate) fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub(crate) fn default_expiration(&self) -> Expiration {
        self.expiration
    }

    // == Add ==
    /// Validates the key, subscribes the entry to its region and inserts it
    /// unless an entry already lives at the physical key.
    pub(crate) fn add(
        &self,
        key: &str,
        value: V,
        region: Option<&str>,
        expiration: Expiration,
    ) -> Result<bool> {
        let physical = physical_key(key, region)?;
        let topic = region_topic(region);
        let policy =
            EntryPolicy::new(expiration).with_subscription(self.broadcaster.subscribe(&topic));

        let added = self.store.insert_if_absent(physical, value, policy)?;
        if added {
            debug!(key, region = %topic, "Cache entry added");
        } else {
            debug!(key, region = %topic, "Cache entry already present, add skipped");
        }
        Ok(added)
    }

    // == Get ==
    pub(crate) fn get(&self, key: &str, region: Option<&str>) -> Result<Option<V>> {
        let physical = physical_key(key, region)?;
        let value = self.store.get(&physical)?;
        debug!(key, region = %region_topic(region), hit = value.is_some(), "Cache lookup");
        Ok(value)
    }

    pub(crate) fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
        let physical = physical_key(key, region)?;
        self.store.contains(&physical)
    }

    // == Remove ==
    pub(crate) fn remove(&self, key: &str, region: Option<&str>) -> Result<bool> {
        let physical = physical_key(key, region)?;
        self.store.remove(&physical)
    }

    // == Clear ==
    /// Signals the region's topic; a missing region means the default region.
    pub(crate) fn clear(&self, region: Option<&str>) -> usize {
        let topic = region_topic(region);
        let cleared = self.broadcaster.signal(Some(&topic));
        info!(region = %topic, cleared, "Cache region cleared");
        cleared
    }

    pub(crate) fn clear_all(&self) -> usize {
        let cleared = self.broadcaster.signal(None);
        info!(cleared, "Cache cleared");
        cleared
    }

    // == Size ==
    pub(crate) fn size(&self) -> Result<usize> {
        self.store.count()
    }

    /// Partitions the store's keys by the region encoded in each physical key.
    pub(crate) fn size_by_region(&self) -> Result<RegionSizes> {
        let mut sizes = RegionSizes::new();
        for key in self.store.keys()? {
            *sizes.entry(region_of(&key).to_string()).or_insert(0) += 1;
        }
        Ok(sizes)
    }

    pub(crate) fn stats(&self) -> Result<CacheStats> {
        self.store.stats()
    }
}
