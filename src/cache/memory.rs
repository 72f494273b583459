//! In-process listing cache backed by a bounded LRU.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;

use super::lock::mutex_lock;
use super::store::{CacheError, ListingCache};

const SOURCE: &str = "cache::memory";

struct Entry {
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
    value: String,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

pub struct MemoryCache {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ListingCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) if entry.is_live(Instant::now()) => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now().checked_add(ttl);
        let mut entries = mutex_lock(&self.entries, SOURCE, "set");
        if let Some((evicted, _)) = entries.push(key.to_string(), Entry { expires_at, value })
            && evicted != key
        {
            counter!("marquee_cache_evict_total", "backend" => self.name()).increment(1);
        }
        Ok(())
    }

    async fn invalidate(&self, prefix: &str) -> Result<u64, CacheError> {
        let namespace = format!("{prefix}:");
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate");
        let stale: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(&namespace))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        Ok(stale.len() as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
