//! Key Codec
//!
//! Maps a logical (key, region) pair onto the physical key handed to the
//! storage collaborator, and recovers the region from a physical key for
//! per-region accounting.

use crate::error::{CacheError, Result};

// == Public Constants ==
/// Separates the region prefix from the logical key inside a physical key.
///
/// Neither keys nor regions may contain it, so a physical key splits back into
/// at most one (region, key) pair.
pub const REGION_SEPARATOR: char = '\u{1f}';

/// Name of the region entries belong to when stored without one.
pub const DEFAULT_REGION: &str = "none";

/// Normalizes an optional region: `None` and `Some("")` both mean "no region".
pub fn normalize_region(region: Option<&str>) -> Option<&str> {
    region.filter(|r| !r.is_empty())
}

/// Returns the broadcast topic an entry stored under `region` subscribes to.
pub fn region_topic(region: Option<&str>) -> String {
    normalize_region(region)
        .unwrap_or(DEFAULT_REGION)
        .to_lowercase()
}

// == Physical Key ==
/// Builds the physical key for `key` in `region`.
///
/// Lookups are case-insensitive: both parts are lower-cased. Without a region the
/// lower-cased key is returned as is.
///
/// # Errors
/// `InvalidArgument` if `key` is empty or if either part contains
/// [`REGION_SEPARATOR`].
pub fn physical_key(key: &str, region: Option<&str>) -> Result<String> {
    if key.is_empty() {
        return Err(CacheError::invalid("key must not be empty"));
    }
    if key.contains(REGION_SEPARATOR) {
        return Err(CacheError::invalid(
            "key must not contain the region separator",
        ));
    }

    match normalize_region(region) {
        None => Ok(key.to_lowercase()),
        Some(region) => {
            if region.contains(REGION_SEPARATOR) {
                return Err(CacheError::invalid(
                    "region must not contain the region separator",
                ));
            }
            let mut physical = String::with_capacity(region.len() + key.len() + 1);
            physical.push_str(&region.to_lowercase());
            physical.push(REGION_SEPARATOR);
            physical.push_str(&key.to_lowercase());
            Ok(physical)
        }
    }
}

// == Region Of ==
/// Returns the region a physical key was stored under.
///
/// Keys without exactly one separator belong to [`DEFAULT_REGION`]. Only used for
/// accounting, never for lookups.
pub fn region_of(physical_key: &str) -> &str {
    let mut parts = physical_key.split(REGION_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(region), Some(_), None) => region,
        _ => DEFAULT_REGION,
    }
}
