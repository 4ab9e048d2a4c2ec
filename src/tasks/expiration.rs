//! Expiration Sweep Task
//!
//! Expired entries are already dropped lazily when touched; the sweep reclaims
//! the ones nobody reads again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a task that purges expired entries from `store` every `interval`.
///
/// The task exits on its own once the store is shut down; during server
/// shutdown the returned handle can also be aborted.
///
/// # Example
/// ```ignore
/// let store = MemoryStore::<String>::new(None);
/// let sweep = spawn_expiration_task(store.clone(), Duration::from_secs(20));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_expiration_task<V>(store: MemoryStore<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs_f64(),
            "Starting expiration sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            match store.purge_expired() {
                Ok(0) => debug!("Expiration sweep: no expired entries found"),
                Ok(removed) => info!(removed, "Expiration sweep: removed expired entries"),
                Err(e) => {
                    info!(error = %e, "Store unavailable, stopping expiration sweep");
                    break;
                }
            }
        }
    })
}
