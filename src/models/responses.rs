//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::key::region_topic;
use crate::region::RegionSizes;
use crate::store::CacheStats;

/// Response body for `PUT /entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct AddEntryResponse {
    pub key: String,
    /// Normalized region the entry was filed under
    pub region: String,
    /// `false` when an entry already existed and was left untouched
    pub added: bool,
}

impl AddEntryResponse {
    pub fn new(key: impl Into<String>, region: Option<&str>, added: bool) -> Self {
        Self {
            key: key.into(),
            region: region_topic(region),
            added,
        }
    }
}

/// Response body for `GET /entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetEntryResponse {
    pub key: String,
    pub region: String,
    pub value: String,
}

impl GetEntryResponse {
    pub fn new(key: impl Into<String>, region: Option<&str>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            region: region_topic(region),
            value: value.into(),
        }
    }
}

/// Response body for `DELETE /entries/:key`
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    pub key: String,
    pub region: String,
    /// Whether an entry was actually removed
    pub removed: bool,
}

impl RemoveResponse {
    pub fn new(key: impl Into<String>, region: Option<&str>, removed: bool) -> Self {
        Self {
            key: key.into(),
            region: region_topic(region),
            removed,
        }
    }
}

/// Response body for the region clearing routes
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Cleared region, absent for a full clear
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Number of entries signaled
    pub cleared: usize,
}

impl ClearResponse {
    pub fn region(region: &str, cleared: usize) -> Self {
        Self {
            region: Some(region_topic(Some(region))),
            cleared,
        }
    }

    pub fn all(cleared: usize) -> Self {
        Self {
            region: None,
            cleared,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Current number of entries in cache
    pub size: usize,
    /// Entry count per region
    pub regions: RegionSizes,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(size: usize, regions: RegionSizes, stats: &CacheStats) -> Self {
        Self {
            size,
            regions,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            invalidations: stats.invalidations,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_response_normalizes_region() {
        let resp = AddEntryResponse::new("k", Some("Users"), true);
        assert_eq!(resp.region, "users");

        let resp = AddEntryResponse::new("k", None, false);
        assert_eq!(resp.region, "none");
    }

    #[test]
    fn test_clear_all_omits_region() {
        let json = serde_json::to_string(&ClearResponse::all(3)).unwrap();
        assert_eq!(json, r#"{"cleared":3}"#);

        let json = serde_json::to_string(&ClearResponse::region("Orders", 1)).unwrap();
        assert!(json.contains(r#""region":"orders""#));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(0, RegionSizes::new(), &stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_stats_response_serializes_regions() {
        let mut regions = RegionSizes::new();
        regions.insert("users".into(), 2);
        let resp = StatsResponse::new(2, regions, &CacheStats::default());

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["size"], 2);
        assert_eq!(json["regions"]["users"], 2);
        assert_eq!(json["hit_rate"], 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
