//! Configuration Module
//!
//! Per-instance cache settings and the storage presets they start from, loaded
//! from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::store::Expiration;

// == Store Profile ==
/// Storage preset. Each profile fixes the write-lock switch and the entry
/// ceiling; the other knobs are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreProfile {
    /// Unbounded store, population serialized by the write-lock
    #[default]
    Default,
    /// Bounded store for light workloads, no write-lock
    Small,
    /// Unbounded store backing an execute cache, no write-lock
    Execute,
    /// Bounded store backing an execute cache, no write-lock
    ExecuteSmall,
}

impl StoreProfile {
    pub fn lock_enabled(&self) -> bool {
        matches!(self, StoreProfile::Default)
    }

    pub fn max_entries(&self) -> Option<usize> {
        match self {
            StoreProfile::Default | StoreProfile::Execute => None,
            StoreProfile::Small => Some(10_000),
            StoreProfile::ExecuteSmall => Some(50_000),
        }
    }
}

impl FromStr for StoreProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "default" => Ok(StoreProfile::Default),
            "small" => Ok(StoreProfile::Small),
            "execute" => Ok(StoreProfile::Execute),
            "execute-small" => Ok(StoreProfile::ExecuteSmall),
            other => Err(format!("unknown cache profile '{}'", other)),
        }
    }
}

// == Cache Config ==
/// Cache instance configuration.
///
/// Every value can be set through environment variables; unset or unparsable
/// variables fall back to the selected profile's values.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Preset the remaining fields were derived from
    pub profile: StoreProfile,
    /// Instance caching toggle; `force_cache` overrides it per call
    pub enabled: bool,
    /// Serialize cache population with a write-lock
    pub lock_enabled: bool,
    /// Policy applied by `add`
    pub expiration: Expiration,
    /// Entry ceiling of the store, `None` for unbounded
    pub max_entries: Option<usize>,
    /// Interval of the background expiration sweep
    pub poll_interval: Duration,
    /// HTTP server port
    pub server_port: u16,
}

impl CacheConfig {
    /// Default sweep interval (2 minutes).
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(120);

    /// Creates the configuration of a profile with every other knob at its default.
    pub fn for_profile(profile: StoreProfile) -> Self {
        Self {
            profile,
            enabled: true,
            lock_enabled: profile.lock_enabled(),
            expiration: Expiration::default(),
            max_entries: profile.max_entries(),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            server_port: 3000,
        }
    }

    pub fn small() -> Self {
        Self::for_profile(StoreProfile::Small)
    }

    pub fn execute() -> Self {
        Self::for_profile(StoreProfile::Execute)
    }

    pub fn execute_small() -> Self {
        Self::for_profile(StoreProfile::ExecuteSmall)
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PROFILE` - `default`, `small`, `execute` or `execute-small` (default: `default`)
    /// - `CACHE_ENABLED` - Caching toggle (default: true)
    /// - `CACHE_LOCK_ENABLED` - Population write-lock (default: from profile)
    /// - `CACHE_SLIDING_SECS` - Sliding expiration in seconds, 0 = never (default: 43200)
    /// - `CACHE_MAX_ENTRIES` - Entry ceiling, 0 = unbounded (default: from profile)
    /// - `CACHE_POLL_INTERVAL_SECS` - Expiration sweep interval (default: 120)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let profile = parse_var("CACHE_PROFILE").unwrap_or_default();
        let mut config = Self::for_profile(profile);

        if let Some(enabled) = parse_var("CACHE_ENABLED") {
            config.enabled = enabled;
        }
        if let Some(lock_enabled) = parse_var("CACHE_LOCK_ENABLED") {
            config.lock_enabled = lock_enabled;
        }
        if let Some(secs) = parse_var("CACHE_SLIDING_SECS") {
            config.expiration = Expiration::from_secs(secs);
        }
        if let Some(max) = parse_var::<usize>("CACHE_MAX_ENTRIES") {
            config.max_entries = (max > 0).then_some(max);
        }
        if let Some(secs) = parse_var::<u64>("CACHE_POLL_INTERVAL_SECS") {
            config.poll_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(port) = parse_var("SERVER_PORT") {
            config.server_port = port;
        }
        config
    }

    /// Same configuration with caching switched on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Same configuration with the population write-lock switched on or off.
    pub fn with_lock(mut self, lock_enabled: bool) -> Self {
        self.lock_enabled = lock_enabled;
        self
    }

    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::for_profile(StoreProfile::Default)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
