//! Async execute-cache orchestrator.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::config::CacheConfig;
use crate::error::Result;
use crate::execute::{AsyncExecutableRequest, AsyncSecondaryCache, CheckOptions, ExecuteResponse};
use crate::key::region_topic;
use crate::region::AsyncRegionCache;

// == Async Execute Cache ==
/// Async counterpart of [`ExecuteCache`](crate::execute::ExecuteCache).
///
/// The computation is awaited without holding any lock; the optional write
/// lock is a tokio lock held only while the response is added.
pub struct AsyncExecuteCache<T> {
    cache: AsyncRegionCache<ExecuteResponse<T>>,
    enabled: bool,
    write_lock: Option<RwLock<()>>,
}

impl<T> AsyncExecuteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cache: AsyncRegionCache<ExecuteResponse<T>>, config: &CacheConfig) -> Self {
        Self {
            cache,
            enabled: config.enabled,
            write_lock: config.lock_enabled.then(|| RwLock::new(())),
        }
    }

    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(AsyncRegionCache::in_memory(config), config)
    }

    pub fn cache(&self) -> &AsyncRegionCache<ExecuteResponse<T>> {
        &self.cache
    }

    pub fn caching_enabled(&self, force_cache: bool) -> bool {
        force_cache || self.enabled
    }

    pub fn lock_enabled(&self) -> bool {
        self.write_lock.is_some()
    }

    // == Check ==
    /// Returns the cached response for `request`, awaiting the computation on
    /// a miss. Same rules as the blocking `check`.
    pub async fn check<R>(
        &self,
        request: &R,
        secondary: Option<&dyn AsyncSecondaryCache<T>>,
        options: CheckOptions<'_>,
    ) -> std::result::Result<Option<ExecuteResponse<T>>, R::Error>
    where
        R: AsyncExecutableRequest<Output = T>,
    {
        let result = self.check_inner(request, secondary, options).await;
        if let Err(e) = &result {
            error!(
                operation = "check",
                key = request.cache_key(),
                region = %region_topic(options.region),
                error = %e,
                "Execute cache check failed"
            );
        }
        result
    }

    async fn check_inner<R>(
        &self,
        request: &R,
        secondary: Option<&dyn AsyncSecondaryCache<T>>,
        options: CheckOptions<'_>,
    ) -> std::result::Result<Option<ExecuteResponse<T>>, R::Error>
    where
        R: AsyncExecutableRequest<Output = T>,
    {
        let key = request.cache_key();
        let cache_enabled = self.caching_enabled(options.force_cache);

        if !cache_enabled {
            debug!(key, "Caching disabled, executing request");
            return request.execute().await.map(Some);
        }

        if self.cache.contains(key, options.region).await? {
            if let Some(mut cached) = self.cache.get(key, options.region).await? {
                cached.was_cached = true;
                cached.cache_enabled = cache_enabled;
                return Ok(Some(cached));
            }
        }

        if !options.execute {
            return Ok(None);
        }

        let mut response = request.execute().await?;
        if response.cacheable {
            self.populate(key, &response, secondary, options.region)
                .await?;
        }
        response.cache_enabled = cache_enabled;
        Ok(Some(response))
    }

    async fn populate(
        &self,
        key: &str,
        response: &ExecuteResponse<T>,
        secondary: Option<&dyn AsyncSecondaryCache<T>>,
        region: Option<&str>,
    ) -> Result<bool> {
        let _guard = match &self.write_lock {
            Some(lock) => Some(lock.write().await),
            None => None,
        };

        let primary = self.cache.add(key, response.clone(), region).await?;
        let mirrored = match secondary {
            Some(secondary) => secondary.add(key, response, region).await?,
            None => true,
        };

        if !(primary && mirrored) {
            debug!(key, primary, mirrored, "Execute cache population skipped");
        }
        Ok(primary && mirrored)
    }

    // == Add ==
    pub async fn add<R>(
        &self,
        request: &R,
        response: ExecuteResponse<T>,
        region: Option<&str>,
        force_cache: bool,
    ) -> Result<bool>
    where
        R: AsyncExecutableRequest<Output = T>,
    {
        if !self.caching_enabled(force_cache) {
            return Ok(false);
        }
        self.cache.add(request.cache_key(), response, region).await
    }
}

#[async_trait]
impl<T> AsyncSecondaryCache<T> for AsyncExecuteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn add(
        &self,
        cache_key: &str,
        response: &ExecuteResponse<T>,
        region: Option<&str>,
    ) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        self.cache.add(cache_key, response.clone(), region).await
    }
}
