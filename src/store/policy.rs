//! Entry Policy Module
//!
//! Expiration strategy and invalidation subscription attached to each insert.

use std::time::Duration;

use crate::invalidation::Subscription;

/// Sliding window applied to entries stored with the default policy (12 hours).
pub const DEFAULT_SLIDING_EXPIRATION: Duration = Duration::from_secs(12 * 60 * 60);

// == Expiration ==
/// How long an entry stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Expires once it has not been read for the given duration
    Sliding(Duration),
    /// Lives until removed, evicted or invalidated
    Never,
}

impl Expiration {
    /// Builds an expiration from a number of seconds, `0` meaning [`Expiration::Never`].
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Expiration::Never
        } else {
            Expiration::Sliding(Duration::from_secs(secs))
        }
    }

    /// Sliding window length, or `None` for non-expiring entries.
    pub fn window(&self) -> Option<Duration> {
        match self {
            Expiration::Sliding(window) => Some(*window),
            Expiration::Never => None,
        }
    }
}

impl Default for Expiration {
    fn default() -> Self {
        Expiration::Sliding(DEFAULT_SLIDING_EXPIRATION)
    }
}

// == Entry Policy ==
/// Expiration and invalidation settings handed to the store with each insert.
#[derive(Debug, Default)]
pub struct EntryPolicy {
    pub expiration: Expiration,
    /// When set, the store drops the entry as soon as this subscription fires
    pub subscription: Option<Subscription>,
}

impl EntryPolicy {
    pub fn new(expiration: Expiration) -> Self {
        Self {
            expiration,
            subscription: None,
        }
    }

    /// Attaches the invalidation subscription the stored entry will own.
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }
}
