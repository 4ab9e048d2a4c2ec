//! Invalidation Broadcaster
//!
//! A publish/subscribe channel keyed by region name. Every stored entry holds a
//! [`Subscription`]; signaling a region fires the hook of each live subscription
//! for that region, and the hook asks the owning store to drop its entry. This is
//! how whole regions are invalidated without the store knowing about regions.
//!
//! Delivery is synchronous: when [`Broadcaster::signal`] returns, every
//! subscription that was registered for the region at call time has fired.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::key::normalize_region;

/// Unique identity of a subscription within its broadcaster.
pub type SubscriptionId = u64;

type Hook = Box<dyn FnOnce() + Send + 'static>;

// == Slot ==
/// Callback slot shared between a subscription and the broadcaster table.
///
/// A slot fires at most once. A hook registered after the slot fired runs
/// immediately; a disarmed slot never runs anything again.
#[derive(Default)]
struct Slot {
    state: Mutex<SlotState>,
}

#[derive(Default)]
struct SlotState {
    signaled: bool,
    disarmed: bool,
    hook: Option<Hook>,
}

impl Slot {
    fn fire(&self, id: SubscriptionId) -> bool {
        let hook = {
            let mut state = self.state.lock();
            if state.disarmed || state.signaled {
                return false;
            }
            state.signaled = true;
            state.hook.take()
        };

        if let Some(hook) = hook {
            run_hook(id, hook);
        }
        true
    }

    fn arm(&self, id: SubscriptionId, hook: Hook) {
        let mut state = self.state.lock();
        if state.disarmed {
            return;
        }
        if !state.signaled {
            state.hook = Some(hook);
            return;
        }
        drop(state);
        run_hook(id, hook);
    }

    fn disarm(&self) {
        let mut state = self.state.lock();
        state.disarmed = true;
        state.hook = None;
    }

    fn is_signaled(&self) -> bool {
        self.state.lock().signaled
    }
}

fn run_hook(id: SubscriptionId, hook: Hook) {
    if catch_unwind(AssertUnwindSafe(hook)).is_err() {
        warn!(subscription = id, "Invalidation hook panicked");
    }
}

// == Broadcaster ==
struct Registration {
    region: String,
    slot: Arc<Slot>,
}

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    subscriptions: RwLock<HashMap<SubscriptionId, Registration>>,
}

impl Inner {
    fn remove(&self, id: SubscriptionId) -> bool {
        self.subscriptions.write().remove(&id).is_some()
    }
}

/// Region-keyed invalidation channel.
///
/// Cloning is cheap and yields a handle to the same subscription table.
/// [`Broadcaster::global`] is the process-wide instance used by default;
/// independent instances are useful when unrelated caches must not see each
/// other's signals.
#[derive(Clone, Default)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

impl Broadcaster {
    // == Constructor ==
    /// Creates an independent broadcaster with an empty subscription table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide broadcaster.
    pub fn global() -> &'static Broadcaster {
        static GLOBAL: OnceLock<Broadcaster> = OnceLock::new();
        GLOBAL.get_or_init(Broadcaster::new)
    }

    // == Subscribe ==
    /// Registers a callback slot for `region` (compared case-insensitively).
    ///
    /// The slot stays empty until [`Subscription::on_signal`] installs a hook.
    /// Dropping the returned handle unsubscribes it.
    pub fn subscribe(&self, region: &str) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let region = region.to_lowercase();
        let slot = Arc::new(Slot::default());

        self.inner.subscriptions.write().insert(
            id,
            Registration {
                region: region.clone(),
                slot: Arc::clone(&slot),
            },
        );

        Subscription {
            id,
            region,
            slot,
            broadcaster: Arc::downgrade(&self.inner),
        }
    }

    // == Signal ==
    /// Fires every live subscription for `region`, or every subscription at all
    /// when `region` is `None` or empty.
    ///
    /// Returns how many subscriptions fired. A panicking hook is logged and does
    /// not stop delivery to the others.
    pub fn signal(&self, region: Option<&str>) -> usize {
        let target = normalize_region(region).map(str::to_lowercase);

        // Snapshot first: hooks remove entries, which unsubscribes them.
        let matched: Vec<(SubscriptionId, Arc<Slot>)> = {
            let subscriptions = self.inner.subscriptions.read();
            subscriptions
                .iter()
                .filter(|(_, registration)| match &target {
                    None => true,
                    Some(target) => registration.region == *target,
                })
                .map(|(id, registration)| (*id, Arc::clone(&registration.slot)))
                .collect()
        };

        let fired = matched
            .into_iter()
            .filter(|(id, slot)| slot.fire(*id))
            .count();

        debug!(
            region = target.as_deref().unwrap_or("*"),
            fired, "Invalidation signal delivered"
        );
        fired
    }

    // == Unsubscribe ==
    /// Removes a subscription from the table. Unknown ids are ignored.
    ///
    /// Returns whether the id was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.remove(id)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriptions.read().len()
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// == Subscription ==
/// A stored entry's registration with a [`Broadcaster`].
///
/// The storage collaborator installs its removal hook with
/// [`Subscription::on_signal`]. Dropping the subscription unsubscribes it and
/// guarantees the hook will not run afterwards.
pub struct Subscription {
    id: SubscriptionId,
    region: String,
    slot: Arc<Slot>,
    broadcaster: Weak<Inner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Installs the hook to run when the region is signaled.
    ///
    /// If the region was already signaled since this subscription was created,
    /// the hook runs immediately on the calling thread. Must not be called while
    /// holding a lock the hook itself takes.
    pub fn on_signal<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.slot.arm(self.id, Box::new(hook));
    }

    /// Whether a signal has reached this subscription.
    pub fn is_signaled(&self) -> bool {
        self.slot.is_signaled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.slot.disarm();
        if let Some(inner) = self.broadcaster.upgrade() {
            inner.remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("region", &self.region)
            .finish()
    }
}
