//! Region Cache - in-process caching with region-wide invalidation
//!
//! Values are stored under a (key, region) pair with sliding expiration.
//! Clearing a region broadcasts an invalidation signal to every entry
//! subscribed to it. On top of the region cache sits a cache-aside
//! orchestrator that memoizes computations.

pub mod api;
pub mod config;
pub mod error;
pub mod execute;
pub mod invalidation;
pub mod key;
pub mod models;
pub mod region;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::{CacheConfig, StoreProfile};
pub use error::{CacheError, Result};
pub use execute::{
    AsyncExecutableRequest, AsyncExecuteCache, AsyncSecondaryCache, CheckOptions,
    ExecutableRequest, ExecuteCache, ExecuteResponse, SecondaryCache,
};
pub use invalidation::{Broadcaster, Subscription};
pub use region::{AsyncRegionCache, RegionCache};
pub use store::{Expiration, ExpiringStore, MemoryStore};
pub use tasks::spawn_expiration_task;
