//! Listing cache.
//!
//! Normalized listing queries map to deterministic keys (see [`listing_cache_key`])
//! and serialized result pages are stored under them with a TTL. Two backends
//! exist: a bounded in-process LRU and Redis. Caching is off unless enabled in
//! the `[cache]` configuration section:
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "redis"
//! redis_url = "redis://127.0.0.1:6379"
//! ttl_seconds = 300
//! ```

mod config;
mod keys;
mod lock;
mod memory;
mod redis_cache;
mod store;

use std::sync::Arc;

use tracing::{info, warn};

pub use config::{
    CacheBackend, CacheConfig, DEFAULT_MEMORY_CAPACITY, DEFAULT_TTL_SECS, MAX_TTL_SECS,
};
pub use keys::{DEFAULT_KEY_PREFIX, listing_cache_key, prefix_pattern};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
pub use store::{CacheError, ListingCache};

/// Build the configured listing cache, or `None` when caching is disabled.
pub async fn build_listing_cache(
    config: &CacheConfig,
) -> Result<Option<Arc<dyn ListingCache>>, CacheError> {
    if !config.enabled {
        return Ok(None);
    }

    let cache: Arc<dyn ListingCache> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new(config.memory_capacity)),
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref().ok_or_else(|| {
                CacheError::Configuration("redis backend requires `cache.redis_url`".to_string())
            })?;
            Arc::new(RedisCache::connect(url).await?)
        }
    };

    info!(
        target: "marquee::cache",
        backend = cache.name(),
        ttl_secs = config.ttl.as_secs(),
        prefix = %config.key_prefix,
        "listing cache enabled"
    );

    Ok(Some(cache))
}

/// Drop every cached listing under `prefix`, logging instead of failing.
///
/// Returns how many entries were removed.
pub async fn flush_listings(cache: &dyn ListingCache, prefix: &str) -> u64 {
    match cache.invalidate(prefix).await {
        Ok(removed) => {
            info!(target: "marquee::cache", prefix, removed, "cached listings flushed");
            removed
        }
        Err(err) => {
            warn!(target: "marquee::cache", prefix, error = %err, "failed to flush cached listings");
            0
        }
    }
}
