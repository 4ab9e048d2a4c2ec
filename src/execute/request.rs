//! Executable requests, their responses and the per-call check options.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{CacheError, Result};

// == Execute Response ==
/// Result of an executable request, as produced by the computation or served
/// from cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteResponse<T> {
    /// Computed value
    pub value: T,
    /// Whether the orchestrator may store this response
    pub cacheable: bool,
    /// Set by the orchestrator when the response came from cache
    pub was_cached: bool,
    /// Set by the orchestrator: whether caching was on for the call
    pub cache_enabled: bool,
}

impl<T> ExecuteResponse<T> {
    /// A response the orchestrator will store on a miss.
    pub fn cacheable(value: T) -> Self {
        Self {
            value,
            cacheable: true,
            was_cached: false,
            cache_enabled: false,
        }
    }

    /// A response returned to the caller but never stored.
    pub fn uncacheable(value: T) -> Self {
        Self {
            cacheable: false,
            ..Self::cacheable(value)
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

// == Executable Request ==
/// Unit of work the blocking orchestrator can serve from cache.
///
/// `Error` is the caller's own error type: computation failures come back from
/// `check` unchanged, and cache failures are converted into it.
pub trait ExecutableRequest {
    type Output: Clone + Send + Sync + 'static;
    type Error: From<CacheError> + fmt::Display;

    /// Key the response is cached under (combined with the region).
    fn cache_key(&self) -> &str;

    fn execute(&self) -> std::result::Result<ExecuteResponse<Self::Output>, Self::Error>;
}

/// Unit of work the async orchestrator can serve from cache.
#[async_trait]
pub trait AsyncExecutableRequest: Send + Sync {
    type Output: Clone + Send + Sync + 'static;
    type Error: From<CacheError> + fmt::Display + Send;

    fn cache_key(&self) -> &str;

    async fn execute(&self) -> std::result::Result<ExecuteResponse<Self::Output>, Self::Error>;
}

// == Secondary Caches ==
/// A cache a blocking orchestrator mirrors freshly computed responses into.
pub trait SecondaryCache<T> {
    /// Stores `response` under (`cache_key`, `region`); `false` if not stored.
    fn add(&self, cache_key: &str, response: &ExecuteResponse<T>, region: Option<&str>)
        -> Result<bool>;
}

/// A cache an async orchestrator mirrors freshly computed responses into.
#[async_trait]
pub trait AsyncSecondaryCache<T>: Send + Sync
where
    T: Send + Sync,
{
    async fn add(
        &self,
        cache_key: &str,
        response: &ExecuteResponse<T>,
        region: Option<&str>,
    ) -> Result<bool>;
}

// == Check Options ==
/// Per-call switches of `check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions<'a> {
    /// Region the response lives in; `None` is the default region
    pub region: Option<&'a str>,
    /// Run the computation on a miss; when `false` a miss returns `None`
    pub execute: bool,
    /// Use the cache even if the instance has caching switched off
    pub force_cache: bool,
}

impl<'a> CheckOptions<'a> {
    pub fn new() -> Self {
        Self {
            region: None,
            execute: true,
            force_cache: false,
        }
    }

    /// Options targeting `region`.
    pub fn region(region: &'a str) -> Self {
        Self::new().in_region(region)
    }

    pub fn in_region(mut self, region: &'a str) -> Self {
        self.region = Some(region);
        self
    }

    /// Lookup only: never run the computation.
    pub fn lookup_only(mut self) -> Self {
        self.execute = false;
        self
    }

    pub fn force_cache(mut self) -> Self {
        self.force_cache = true;
        self
    }
}

impl Default for CheckOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}
