//! Blocking execute-cache orchestrator.

use parking_lot::RwLock;
use tracing::{debug, error};

use crate::config::CacheConfig;
use crate::error::Result;
use crate::execute::{CheckOptions, ExecutableRequest, ExecuteResponse, SecondaryCache};
use crate::key::region_topic;
use crate::region::RegionCache;

// == Execute Cache ==
/// Cache-aside wrapper around computations that produce an [`ExecuteResponse`].
///
/// Concurrent misses on the same key each run the computation; the first add
/// wins and later adds are no-ops. The optional write lock only serializes the
/// population step.
pub struct ExecuteCache<T> {
    cache: RegionCache<ExecuteResponse<T>>,
    enabled: bool,
    write_lock: Option<RwLock<()>>,
}

impl<T> ExecuteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(cache: RegionCache<ExecuteResponse<T>>, config: &CacheConfig) -> Self {
        Self {
            cache,
            enabled: config.enabled,
            write_lock: config.lock_enabled.then(|| RwLock::new(())),
        }
    }

    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(RegionCache::in_memory(config), config)
    }

    /// The region cache responses are stored in.
    pub fn cache(&self) -> &RegionCache<ExecuteResponse<T>> {
        &self.cache
    }

    /// Whether a call with the given `force_cache` flag goes through the cache.
    pub fn caching_enabled(&self, force_cache: bool) -> bool {
        force_cache || self.enabled
    }

    pub fn lock_enabled(&self) -> bool {
        self.write_lock.is_some()
    }

    // == Check ==
    /// Returns the cached response for `request`, computing and storing it on a
    /// miss.
    ///
    /// With caching off (and not forced) the computation runs every time and
    /// nothing is stored. A miss with `options.execute == false` yields
    /// `Ok(None)`. Cacheable results are mirrored into `secondary` when given.
    ///
    /// # Errors
    /// Computation errors are returned unchanged; cache failures are converted
    /// into `R::Error`.
    pub fn check<R>(
        &self,
        request: &R,
        secondary: Option<&dyn SecondaryCache<T>>,
        options: CheckOptions<'_>,
    ) -> std::result::Result<Option<ExecuteResponse<T>>, R::Error>
    where
        R: ExecutableRequest<Output = T>,
    {
        let result = self.check_inner(request, secondary, options);
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

    fn check_inner<R>(
        &self,
        request: &R,
        secondary: Option<&dyn SecondaryCache<T>>,
        options: CheckOptions<'_>,
    ) -> std::result::Result<Option<ExecuteResponse<T>>, R::Error>
    where
        R: ExecutableRequest<Output = T>,
    {
        let key = request.cache_key();
        let cache_enabled = self.caching_enabled(options.force_cache);

        if !cache_enabled {
            debug!(key, "Caching disabled, executing request");
            return request.execute().map(Some);
        }

        if self.cache.contains(key, options.region)? {
            // An entry evicted between contains and get falls through to the miss path.
            if let Some(mut cached) = self.cache.get(key, options.region)? {
                cached.was_cached = true;
                cached.cache_enabled = cache_enabled;
                return Ok(Some(cached));
            }
        }

        if !options.execute {
            return Ok(None);
        }

        let mut response = request.execute()?;
        if response.cacheable {
            self.populate(key, &response, secondary, options.region)?;
        }
        response.cache_enabled = cache_enabled;
        Ok(Some(response))
    }

    /// Adds a fresh response to the primary and secondary caches under the
    /// write lock, if any.
    fn populate(
        &self,
        key: &str,
        response: &ExecuteResponse<T>,
        secondary: Option<&dyn SecondaryCache<T>>,
        region: Option<&str>,
    ) -> Result<bool> {
        let _guard = self.write_lock.as_ref().map(|lock| lock.write());

        let primary = self.cache.add(key, response.clone(), region)?;
        let mirrored = match secondary {
            Some(secondary) => secondary.add(key, response, region)?,
            None => true,
        };

        if !(primary && mirrored) {
            debug!(key, primary, mirrored, "Execute cache population skipped");
        }
        Ok(primary && mirrored)
    }

    // == Add ==
    /// Stores `response` for `request` directly. Returns `false` when caching is
    /// off for this call or an entry already exists.
    pub fn add<R>(
        &self,
        request: &R,
        response: ExecuteResponse<T>,
        region: Option<&str>,
        force_cache: bool,
    ) -> Result<bool>
    where
        R: ExecutableRequest<Output = T>,
    {
        if !self.caching_enabled(force_cache) {
            return Ok(false);
        }
        self.cache.add(request.cache_key(), response, region)
    }
}

impl<T> SecondaryCache<T> for ExecuteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn add(
        &self,
        cache_key: &str,
        response: &ExecuteResponse<T>,
        region: Option<&str>,
    ) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        self.cache.add(cache_key, response.clone(), region)
    }
}
