//! Memory Store Module
//!
//! In-memory [`ExpiringStore`]: a HashMap of entries with sliding expiration, an
//! optional entry ceiling enforced by LRU eviction, and invalidation hooks wired
//! to each entry's subscription.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::invalidation::SubscriptionId;
use crate::store::{CacheStats, EntryPolicy, ExpiringStore, LruTracker, StoredEntry};

// == Memory Store ==
/// Thread-safe in-memory store. Clones share the same entries.
pub struct MemoryStore<V> {
    inner: Arc<StoreInner<V>>,
}

struct StoreInner<V> {
    state: Mutex<StoreState<V>>,
    /// Entry ceiling, `None` for unbounded
    max_entries: Option<usize>,
}

struct StoreState<V> {
    entries: HashMap<String, StoredEntry<V>>,
    lru: LruTracker,
    stats: CacheStats,
    shut_down: bool,
}

impl<V> StoreState<V> {
    fn ensure_open(&self) -> Result<()> {
        if self.shut_down {
            return Err(CacheError::StorageUnavailable(
                "memory store has been shut down".to_string(),
            ));
        }
        Ok(())
    }

    fn take(&mut self, key: &str) -> Option<StoredEntry<V>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    /// Removes `key` if its entry expired, handing the entry back for dropping.
    fn take_if_expired(&mut self, key: &str) -> Option<StoredEntry<V>> {
        if self.entries.get(key)?.is_expired() {
            let expired = self.take(key);
            self.stats.record_expirations(1);
            expired
        } else {
            None
        }
    }

    fn take_all_expired(&mut self) -> Vec<StoredEntry<V>> {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let expired: Vec<StoredEntry<V>> = expired_keys
            .iter()
            .filter_map(|key| self.take(key))
            .collect();
        self.stats.record_expirations(expired.len());
        expired
    }
}

impl<V> Clone for MemoryStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries (`None` = unbounded).
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState {
                    entries: HashMap::new(),
                    lru: LruTracker::new(),
                    stats: CacheStats::new(),
                    shut_down: false,
                }),
                max_entries,
            }),
        }
    }

    /// Creates a store sized by the configuration's entry ceiling.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries)
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.inner.max_entries
    }

    // == Invalidate ==
    /// Drops `key` if it still holds the entry owned by `subscription`.
    ///
    /// A newer entry stored at the same key after the old one went away is left
    /// untouched.
    fn invalidate(&self, key: &str, subscription: SubscriptionId) {
        let removed = {
            let mut state = self.inner.state.lock();
            let owned = state
                .entries
                .get(key)
                .and_then(StoredEntry::subscription_id)
                == Some(subscription);
            if !owned {
                return;
            }
            state.stats.record_invalidation();
            state.take(key)
        };

        if removed.is_some() {
            debug!(key, subscription, "Entry invalidated");
        }
    }

    fn invalidation_hook(
        &self,
        key: String,
        subscription: SubscriptionId,
    ) -> impl FnOnce() + Send + 'static {
        let store: Weak<StoreInner<V>> = Arc::downgrade(&self.inner);
        move || {
            if let Some(inner) = store.upgrade() {
                MemoryStore { inner }.invalidate(&key, subscription);
            }
        }
    }

    // == Purge Expired ==
    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> Result<usize> {
        let expired = {
            let mut state = self.inner.state.lock();
            state.ensure_open()?;
            state.take_all_expired()
        };
        Ok(expired.len())
    }

    // == Shutdown ==
    /// Drops every entry and refuses all further operations with
    /// `StorageUnavailable`. Idempotent.
    pub fn shutdown(&self) {
        let drained: Vec<StoredEntry<V>> = {
            let mut state = self.inner.state.lock();
            state.shut_down = true;
            state.lru.clear();
            state.stats.set_total_entries(0);
            state.entries.drain().map(|(_, entry)| entry).collect()
        };
        debug!(dropped = drained.len(), "Memory store shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.state.lock().shut_down
    }
}

impl<V> ExpiringStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Insert If Absent ==
    /// Stores `value` at `key` unless a live entry is already there.
    ///
    /// At capacity, the least recently used entry is evicted first. When the
    /// policy's subscription was signaled before the entry could be stored, the
    /// entry is discarded straight away and the insert still reports success.
    fn insert_if_absent(&self, key: String, value: V, policy: EntryPolicy) -> Result<bool> {
        let EntryPolicy {
            expiration,
            subscription,
        } = policy;

        // Arm before locking: a hook for an already signaled subscription runs here.
        if let Some(subscription) = &subscription {
            subscription.on_signal(self.invalidation_hook(key.clone(), subscription.id()));
        }

        let mut dropped = Vec::new();
        let inserted = {
            let mut state = self.inner.state.lock();
            state.ensure_open()?;

            dropped.extend(state.take_if_expired(&key));
            if state.entries.contains_key(&key) {
                false
            } else if subscription.as_ref().is_some_and(|s| s.is_signaled()) {
                state.stats.record_invalidation();
                true
            } else {
                if let Some(max) = self.inner.max_entries {
                    while state.entries.len() >= max.max(1) {
                        let Some(oldest) = state.lru.evict_oldest() else {
                            break;
                        };
                        dropped.extend(state.entries.remove(&oldest));
                        state.stats.record_eviction();
                    }
                }

                state
                    .entries
                    .insert(key.clone(), StoredEntry::new(value, expiration, subscription));
                state.lru.touch(&key);
                let len = state.entries.len();
                state.stats.set_total_entries(len);
                true
            }
        };

        drop(dropped);
        Ok(inserted)
    }

    // == Get ==
    /// Returns a clone of the live value at `key`, restarting its sliding window.
    fn get(&self, key: &str) -> Result<Option<V>> {
        let mut state = self.inner.state.lock();
        state.ensure_open()?;

        let expired = state.take_if_expired(key);
        let value = match state.entries.get_mut(key) {
            Some(entry) => {
                entry.touch();
                Some(entry.value.clone())
            }
            None => None,
        };

        match value {
            Some(_) => {
                state.stats.record_hit();
                state.lru.touch(key);
            }
            None => state.stats.record_miss(),
        }
        drop(state);
        drop(expired);
        Ok(value)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        let mut state = self.inner.state.lock();
        state.ensure_open()?;

        let expired = state.take_if_expired(key);
        let found = state.entries.contains_key(key);
        drop(state);
        drop(expired);
        Ok(found)
    }

    // == Remove ==
    fn remove(&self, key: &str) -> Result<bool> {
        let removed = {
            let mut state = self.inner.state.lock();
            state.ensure_open()?;
            state.take(key)
        };
        Ok(removed.is_some())
    }

    fn count(&self) -> Result<usize> {
        let (count, expired) = {
            let mut state = self.inner.state.lock();
            state.ensure_open()?;
            let expired = state.take_all_expired();
            (state.entries.len(), expired)
        };
        drop(expired);
        Ok(count)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let (keys, expired) = {
            let mut state = self.inner.state.lock();
            state.ensure_open()?;
            let expired = state.take_all_expired();
            (state.entries.keys().cloned().collect(), expired)
        };
        drop(expired);
        Ok(keys)
    }

    // == Stats ==
    fn stats(&self) -> Result<CacheStats> {
        let state = self.inner.state.lock();
        state.ensure_open()?;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        Ok(stats)
    }
}
