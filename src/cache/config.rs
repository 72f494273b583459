//! Listing cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use super::keys::DEFAULT_KEY_PREFIX;

pub const DEFAULT_TTL_SECS: u64 = 300;
/// Upper bound on listing TTLs (30 days).
pub const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;
pub const DEFAULT_MEMORY_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

impl CacheBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Listings are only cached when enabled.
    pub enabled: bool,
    pub backend: CacheBackend,
    /// Required for the redis backend.
    pub redis_url: Option<String>,
    pub ttl: Duration,
    pub key_prefix: String,
    /// Entry bound for the memory backend.
    pub memory_capacity: NonZeroUsize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: CacheBackend::default(),
            redis_url: None,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            memory_capacity: NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            backend: settings.backend,
            redis_url: settings.redis_url.clone(),
            ttl: settings.ttl,
            key_prefix: settings.key_prefix.clone(),
            memory_capacity: settings.memory_capacity,
        }
    }
}
