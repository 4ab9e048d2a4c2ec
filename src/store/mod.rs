//! Storage Module
//!
//! The expiring key/value store the region cache is layered on: the
//! [`ExpiringStore`] contract and its in-memory implementation, [`MemoryStore`].

mod entry;
mod lru;
mod memory;
mod policy;
mod stats;

// Re-export public types
pub use entry::StoredEntry;
pub use lru::LruTracker;
pub use memory::MemoryStore;
pub use policy::{EntryPolicy, Expiration, DEFAULT_SLIDING_EXPIRATION};
pub use stats::CacheStats;

use crate::error::Result;

// == Expiring Store ==
/// Storage collaborator contract.
///
/// Implementations must be internally thread-safe. Every operation may fail
/// with `StorageUnavailable` once the store can no longer serve requests; absence
/// is reported through `Ok(None)` / `Ok(false)`, never as an error.
///
/// The invalidation hook is part of [`EntryPolicy`]: when the policy carries a
/// subscription, the store installs a hook on it that drops the entry once the
/// subscription fires.
pub trait ExpiringStore<V>: Send + Sync {
    /// Stores `value` unless a live entry exists at `key`. Never overwrites.
    fn insert_if_absent(&self, key: String, value: V, policy: EntryPolicy) -> Result<bool>;

    fn get(&self, key: &str) -> Result<Option<V>>;

    fn contains(&self, key: &str) -> Result<bool>;

    /// Removes the entry at `key`; returns whether one was present.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Number of live entries.
    fn count(&self) -> Result<usize>;

    /// Snapshot of the live physical keys.
    fn keys(&self) -> Result<Vec<String>>;

    /// Performance counters, if the store keeps any.
    fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats::default())
    }
}
