//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Request body for `PUT /entries/:key`
#[derive(Debug, Clone, Deserialize)]
pub struct AddEntryRequest {
    /// The value to store
    pub value: String,
    /// Store without sliding expiration
    #[serde(default)]
    pub non_expiring: bool,
}

/// `?region=` query parameter shared by the entry routes.
///
/// A missing or empty region addresses the default region.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionQuery {
    #[serde(default)]
    pub region: Option<String>,
}

impl RegionQuery {
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}
