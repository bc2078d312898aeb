//! Process-local tier backed by moka

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::policy::EvictionPolicy;
use moka::Expiry;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    pub max_capacity: u64,
    /// TTL the tiered cache applies when writing into this tier
    pub default_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            default_ttl: Duration::from_secs(300),
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
}

/// Stored payload and the lifetime it was written with
#[derive(Debug, Clone)]
struct Stored {
    payload: Arc<str>,
    lifetime: Duration,
}

/// Moka expiry policy reading the lifetime off each stored value
struct StoredLifetime;

impl Expiry<String, Stored> for StoredLifetime {
    fn expire_after_create(&self, _: &String, stored: &Stored, _: Instant) -> Option<Duration> {
        Some(stored.lifetime)
    }

    fn expire_after_update(
        &self,
        _: &String,
        stored: &Stored,
        _: Instant,
        _: Option<Duration>,
    ) -> Option<Duration> {
        // Overwrites restart the clock with the new lifetime
        Some(stored.lifetime)
    }
}

/// Bounded LRU cache with per-entry TTL
///
/// Reads never see an expired entry; moka filters them on lookup even before
/// its maintenance tasks reclaim the slot.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: MokaCache<String, Stored>,
    config: InMemoryCacheConfig,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(StoredLifetime)
            .build();

        Self { entries, config }
    }

    pub fn config(&self) -> &InMemoryCacheConfig {
        &self.config
    }

    /// Runs moka's pending evictions so counts are exact
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self
            .entries
            .get(key)
            .await
            .map(|stored| stored.payload.to_string()))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let stored = Stored {
            payload: Arc::from(value),
            lifetime: ttl,
        };
        self.entries.insert(key.to_owned(), stored).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries.invalidate_all();
        self.sync().await;
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.sync().await;
        Ok(self.entries.entry_count() as usize)
    }
}
