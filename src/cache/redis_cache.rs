//! Redis-backed listing cache.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info};

use super::keys::prefix_pattern;
use super::store::{CacheError, ListingCache};

const BACKEND: &str = "redis";

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        info!(target: "marquee::cache", "connecting to redis listing cache");

        let client = redis::Client::open(redis_url)
            .map_err(|err| CacheError::Configuration(format!("invalid redis url: {err}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|err| CacheError::backend(BACKEND, err))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl ListingCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|err| CacheError::backend(BACKEND, err))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|err| CacheError::backend(BACKEND, err))
    }

    async fn invalidate(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(prefix_pattern(prefix))
            .await
            .map_err(|err| CacheError::backend(BACKEND, err))?;

        if keys.is_empty() {
            return Ok(0);
        }

        debug!(
            target: "marquee::cache",
            count = keys.len(),
            prefix,
            "deleting cached listings"
        );
        let removed: u64 = conn
            .del(keys)
            .await
            .map_err(|err| CacheError::backend(BACKEND, err))?;
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        BACKEND
    }
}
