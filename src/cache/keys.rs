//! Listing cache key derivation.
//!
//! Keys have the shape `{prefix}:{sha256 hex}` where the digest covers the
//! canonical JSON of a normalized [`MovieQuery`].

use sha2::{Digest, Sha256};

use crate::domain::listing::MovieQuery;

/// Default namespace for listing keys.
pub const DEFAULT_KEY_PREFIX: &str = "movies";

/// Derive the cache key for a normalized listing query.
///
/// Struct fields serialize in declaration order, so equal queries always hash
/// to the same key.
pub fn listing_cache_key(prefix: &str, query: &MovieQuery) -> Result<String, serde_json::Error> {
    let canonical = serde_json::to_vec(query)?;
    let digest = Sha256::digest(&canonical);
    Ok(format!("{prefix}:{}", hex::encode(&digest[..])))
}

/// Pattern matching every listing key under `prefix`.
pub fn prefix_pattern(prefix: &str) -> String {
    format!("{prefix}:*")
}
