//! Cache storage contract shared by the listing cache backends.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend `{backend}` failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
    #[error("cache configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    pub fn backend(backend: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            backend,
            message: err.to_string(),
        }
    }
}

/// Key/value store for serialized listing pages.
///
/// Values are opaque strings; callers own the encoding. Implementations must
/// treat an expired entry exactly like a missing one.
#[async_trait]
pub trait ListingCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Drop every entry whose key starts with `{prefix}:`. Returns how many were removed.
    async fn invalidate(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Short backend label used in logs and metrics.
    fn name(&self) -> &'static str;
}
