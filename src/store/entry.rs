//! Stored Entry Module
//!
//! A value held by the memory store, with its expiration clock and the
//! invalidation subscription it owns.

use std::time::Instant;

use crate::invalidation::{Subscription, SubscriptionId};
use crate::store::Expiration;

// == Stored Entry ==
/// A single entry of the memory store.
///
/// Dropping the entry drops its subscription, which unsubscribes it from the
/// broadcaster.
#[derive(Debug)]
pub struct StoredEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration strategy chosen at insert time
    pub expiration: Expiration,
    /// Last read, the reference point of sliding expiration
    pub last_access: Instant,
    subscription: Option<Subscription>,
}

impl<V> StoredEntry<V> {
    // == Constructor ==
    pub fn new(value: V, expiration: Expiration, subscription: Option<Subscription>) -> Self {
        Self {
            value,
            expiration,
            last_access: Instant::now(),
            subscription,
        }
    }

    // == Is Expired ==
    /// Checks whether the sliding window has fully elapsed since the last read.
    ///
    /// Non-expiring entries never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        match self.expiration.window() {
            Some(window) => now.saturating_duration_since(self.last_access) >= window,
            None => false,
        }
    }

    /// Restarts the sliding window.
    pub fn touch(&mut self) {
        self.last_access = Instant::now();
    }

    /// Identity of the invalidation subscription this entry owns.
    pub fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription.as_ref().map(Subscription::id)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::invalidation::Broadcaster;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_never_expiring() {
        let entry = StoredEntry::new("value", Expiration::Never, None);

        assert!(!entry.is_expired());
        assert!(entry.subscription_id().is_none());
    }

    #[test]
    fn test_entry_sliding_expiration() {
        let entry = StoredEntry::new("value", Expiration::Sliding(Duration::from_millis(40)), None);
        assert!(!entry.is_expired());

        sleep(Duration::from_millis(60));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_touch_restarts_window() {
        let mut entry =
            StoredEntry::new("value", Expiration::Sliding(Duration::from_millis(80)), None);

        sleep(Duration::from_millis(50));
        entry.touch();
        sleep(Duration::from_millis(50));

        assert!(!entry.is_expired(), "read should have extended the entry");
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = StoredEntry::new("value", Expiration::Sliding(Duration::from_secs(10)), None);
        let boundary = entry.last_access + Duration::from_secs(10);

        assert!(entry.is_expired_at(boundary), "entry should be expired at boundary");
        assert!(!entry.is_expired_at(boundary - Duration::from_millis(1)));
    }

    #[test]
    fn test_entry_owns_subscription() {
        let broadcaster = Broadcaster::new();
        let subscription = broadcaster.subscribe("r");
        let id = subscription.id();

        let entry = StoredEntry::new(1u32, Expiration::Never, Some(subscription));
        assert_eq!(entry.subscription_id(), Some(id));

        drop(entry);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
