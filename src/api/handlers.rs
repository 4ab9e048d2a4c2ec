//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::invalidation::Broadcaster;
use crate::models::{
    AddEntryRequest, AddEntryResponse, ClearResponse, GetEntryResponse, HealthResponse,
    RegionQuery, RemoveResponse, StatsResponse,
};
use crate::region::AsyncRegionCache;
use crate::store::MemoryStore;

/// Application state shared across all handlers.
///
/// `store` is the same store the cache writes to, kept for the sweep task and
/// shutdown.
#[derive(Clone)]
pub struct AppState {
    pub cache: AsyncRegionCache<String>,
    pub store: MemoryStore<String>,
}

impl AppState {
    /// Creates a state over `store` with its own broadcaster.
    pub fn with_broadcaster(
        store: MemoryStore<String>,
        config: &CacheConfig,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            cache: AsyncRegionCache::with_broadcaster(store.clone(), config, broadcaster),
            store,
        }
    }

    /// Creates a state from configuration, signaling through the process-wide
    /// broadcaster.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_broadcaster(
            MemoryStore::from_config(config),
            config,
            Broadcaster::global().clone(),
        )
    }
}

/// Handler for PUT /entries/:key
///
/// Adds a value unless one already exists; `added` reports which happened.
pub async fn add_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<RegionQuery>,
    Json(req): Json<AddEntryRequest>,
) -> Result<Json<AddEntryResponse>> {
    let region = query.region();
    let added = if req.non_expiring {
        state.cache.add_non_expiring(&key, req.value, region).await?
    } else {
        state.cache.add(&key, req.value, region).await?
    };

    Ok(Json(AddEntryResponse::new(key, region, added)))
}

/// Handler for GET /entries/:key
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<GetEntryResponse>> {
    let region = query.region();
    match state.cache.get(&key, region).await? {
        Some(value) => Ok(Json(GetEntryResponse::new(key, region, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /entries/:key
pub async fn remove_entry_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<RegionQuery>,
) -> Result<Json<RemoveResponse>> {
    let region = query.region();
    let removed = state.cache.remove(&key, region).await?;

    Ok(Json(RemoveResponse::new(key, region, removed)))
}

/// Handler for DELETE /regions/:region
pub async fn clear_region_handler(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Json<ClearResponse> {
    let cleared = state.cache.clear(Some(&region)).await;
    Json(ClearResponse::region(&region, cleared))
}

/// Handler for DELETE /regions
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.clear_all().await;
    info!(cleared, "Full cache clear requested over HTTP");
    Json(ClearResponse::all(cleared))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let size = state.cache.size().await?;
    let regions = state.cache.size_by_region().await?;
    let stats = state.cache.stats().await?;

    Ok(Json(StatsResponse::new(size, regions, &stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::with_broadcaster(
            MemoryStore::new(Some(100)),
            &CacheConfig::default(),
            Broadcaster::new(),
        )
    }

    fn in_region(region: &str) -> Query<RegionQuery> {
        Query(RegionQuery {
            region: Some(region.to_string()),
        })
    }

    fn add_request(value: &str) -> Json<AddEntryRequest> {
        Json(AddEntryRequest {
            value: value.to_string(),
            non_expiring: false,
        })
    }

    #[tokio::test]
    async fn test_add_and_get_handler() {
        let state = test_state();

        let added = add_entry_handler(
            State(state.clone()),
            Path("k".to_string()),
            in_region("users"),
            add_request("v"),
        )
        .await
        .unwrap();
        assert!(added.added);
        assert_eq!(added.region, "users");

        let response = get_entry_handler(State(state), Path("k".to_string()), in_region("users"))
            .await
            .unwrap();
        assert_eq!(response.value, "v");
    }

    #[tokio::test]
    async fn test_second_add_reports_not_added() {
        let state = test_state();

        for expected in [true, false] {
            let response = add_entry_handler(
                State(state.clone()),
                Path("k".to_string()),
                Query(RegionQuery::default()),
                add_request("v"),
            )
            .await
            .unwrap();
            assert_eq!(response.added, expected);
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let state = test_state();

        let result =
            get_entry_handler(State(state), Path("missing".to_string()), Query(RegionQuery::default()))
                .await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_handler() {
        let state = test_state();
        state.cache.add("k", "v".into(), None).await.unwrap();

        let response =
            remove_entry_handler(State(state.clone()), Path("k".to_string()), Query(RegionQuery::default()))
                .await
                .unwrap();
        assert!(response.removed);
        assert!(!state.cache.contains("k", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_region_handler() {
        let state = test_state();
        state.cache.add("a", "1".into(), Some("x")).await.unwrap();
        state.cache.add("b", "2".into(), Some("y")).await.unwrap();

        let response = clear_region_handler(State(state.clone()), Path("X".to_string())).await;
        assert_eq!(response.cleared, 1);
        assert_eq!(response.region.as_deref(), Some("x"));
        assert_eq!(state.cache.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        state.cache.add("a", "1".into(), Some("x")).await.unwrap();
        state.cache.get("a", Some("x")).await.unwrap();

        let response = stats_handler(State(state)).await.unwrap();
        assert_eq!(response.size, 1);
        assert_eq!(response.regions.get("x"), Some(&1));
        assert_eq!(response.hits, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
