//! Cache factory building the tier stack from configuration

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::cache::{Cache, CacheTier, DEFAULT_KEY_NAMESPACE};

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::noop::NoopCache;
use super::redis::{RedisCache, RedisCacheConfig};
use super::tiered::{TierSlot, TieredCache};

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Namespace prepended to every cache key
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,
    /// Minimum TTL for any write, in milliseconds
    #[serde(default = "default_ttl_floor_ms")]
    pub ttl_floor_ms: u64,
    /// Caps the TTL of results produced by the keyword fallback
    #[serde(default)]
    pub degraded_ttl_secs: Option<u64>,
    /// Enables caching of unknown dataset ids with this TTL
    #[serde(default)]
    pub negative_ttl_secs: Option<u64>,
    #[serde(default)]
    pub memory: MemoryTierConfig,
    #[serde(default)]
    pub shared: SharedTierConfig,
}

/// Process-local tier
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryTierConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    #[serde(default = "default_memory_ttl_secs")]
    pub ttl_secs: u64,
}

/// Shared Redis tier; absent when no URL is configured
#[derive(Debug, Clone, Deserialize)]
pub struct SharedTierConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default = "default_shared_ttl_secs")]
    pub ttl_secs: u64,
    /// Bound on every call to the shared tier
    #[serde(default = "default_shared_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_key_namespace() -> String {
    DEFAULT_KEY_NAMESPACE.to_string()
}

fn default_ttl_floor_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_memory_ttl_secs() -> u64 {
    300
}

fn default_shared_ttl_secs() -> u64 {
    1800
}

fn default_shared_timeout_ms() -> u64 {
    250
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_namespace: default_key_namespace(),
            ttl_floor_ms: default_ttl_floor_ms(),
            degraded_ttl_secs: None,
            negative_ttl_secs: None,
            memory: MemoryTierConfig::default(),
            shared: SharedTierConfig::default(),
        }
    }
}

impl Default for MemoryTierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: default_max_capacity(),
            ttl_secs: default_memory_ttl_secs(),
        }
    }
}

impl Default for SharedTierConfig {
    fn default() -> Self {
        Self {
            url: None,
            key_prefix: None,
            ttl_secs: default_shared_ttl_secs(),
            timeout_ms: default_shared_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl CacheConfig {
    /// Sets the shared tier URL
    pub fn with_shared_url(mut self, url: impl Into<String>) -> Self {
        self.shared.url = Some(url.into());
        self
    }

    /// Sets the memory tier capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.memory.max_capacity = capacity;
        self
    }

    pub fn with_negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl_secs = Some(ttl.as_secs());
        self
    }

    pub fn with_degraded_ttl(mut self, ttl: Duration) -> Self {
        self.degraded_ttl_secs = Some(ttl.as_secs());
        self
    }

    pub fn ttl_floor(&self) -> Duration {
        Duration::from_millis(self.ttl_floor_ms)
    }

    pub fn degraded_ttl(&self) -> Option<Duration> {
        self.degraded_ttl_secs.map(Duration::from_secs)
    }

    pub fn negative_ttl(&self) -> Option<Duration> {
        self.negative_ttl_secs.map(Duration::from_secs)
    }

    /// Whether a shared tier should be attempted
    pub fn shared_enabled(&self) -> bool {
        self.shared
            .url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// Factory for creating the tier stack
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Builds memory then shared tiers
    ///
    /// A disabled memory tier or an absent/unreachable shared tier becomes a
    /// no-op tier, so the lookup order never changes shape.
    pub async fn create(&self, config: &CacheConfig) -> TieredCache {
        let memory = self.create_memory(config);
        let shared = self.create_shared(config).await;

        TieredCache::new(vec![memory, shared]).with_ttl_floor(config.ttl_floor())
    }

    fn create_memory(&self, config: &CacheConfig) -> TierSlot {
        let ttl = Duration::from_secs(config.memory.ttl_secs);

        let cache: Arc<dyn Cache> = if config.memory.enabled {
            info!(
                max_capacity = config.memory.max_capacity,
                ttl_secs = config.memory.ttl_secs,
                "Memory cache tier enabled"
            );
            Arc::new(InMemoryCache::with_config(
                InMemoryCacheConfig::default()
                    .with_max_capacity(config.memory.max_capacity)
                    .with_default_ttl(ttl),
            ))
        } else {
            info!("Memory cache tier disabled");
            Arc::new(NoopCache::new())
        };

        TierSlot::new(CacheTier::Memory, cache, ttl)
    }

    async fn create_shared(&self, config: &CacheConfig) -> TierSlot {
        let ttl = Duration::from_secs(config.shared.ttl_secs);
        let timeout = Duration::from_millis(config.shared.timeout_ms);

        let cache: Arc<dyn Cache> = match config.shared.url.as_deref() {
            Some(url) if config.shared_enabled() => {
                let mut redis_config = RedisCacheConfig::new(url)
                    .with_default_ttl(ttl)
                    .with_namespace(config.key_namespace.clone())
                    .with_connection_timeout(Duration::from_millis(config.shared.connect_timeout_ms));

                if let Some(prefix) = &config.shared.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                match RedisCache::new(redis_config).await {
                    Ok(cache) => {
                        info!(ttl_secs = config.shared.ttl_secs, "Shared cache tier connected");
                        Arc::new(cache)
                    }
                    Err(e) => {
                        warn!(error = %e, "Shared cache tier unavailable, continuing without it");
                        Arc::new(NoopCache::new())
                    }
                }
            }
            _ => {
                info!("Shared cache tier not configured");
                Arc::new(NoopCache::new())
            }
        };

        TierSlot::new(CacheTier::Shared, cache, ttl).with_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();

        assert_eq!(config.key_namespace, "catalog");
        assert_eq!(config.ttl_floor(), Duration::from_secs(1));
        assert_eq!(config.memory.ttl_secs, 300);
        assert_eq!(config.shared.ttl_secs, 1800);
        assert_eq!(config.shared.timeout_ms, 250);
        assert!(config.degraded_ttl().is_none());
        assert!(config.negative_ttl().is_none());
        assert!(!config.shared_enabled());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: CacheConfig = serde_json::from_str(
            r#"{"memory":{"max_capacity":5},"shared":{"url":"redis://cache:6379"},"negative_ttl_secs":30}"#,
        )
        .unwrap();

        assert_eq!(config.memory.max_capacity, 5);
        assert_eq!(config.memory.ttl_secs, 300);
        assert!(config.shared_enabled());
        assert_eq!(config.negative_ttl(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_blank_url_means_absent() {
        let config = CacheConfig::default().with_shared_url("  ");
        assert!(!config.shared_enabled());
    }

    #[tokio::test]
    async fn test_create_without_shared_tier() {
        let tiers = CacheFactory::new().create(&CacheConfig::default()).await;

        let names: Vec<_> = tiers.tiers().iter().map(|t| t.tier()).collect();
        assert_eq!(names, vec![CacheTier::Memory, CacheTier::Shared]);

        let shared = &tiers.tiers()[1];
        shared.cache().set("k", &1u32, Duration::from_secs(5)).await.unwrap();
        assert!(shared.cache().get::<u32>("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_shared_tier_degrades_to_noop() {
        let mut config = CacheConfig::default().with_shared_url("redis://127.0.0.1:1");
        config.shared.connect_timeout_ms = 200;

        let tiers = CacheFactory::new().create(&config).await;

        assert_eq!(tiers.tiers()[1].cache().size().await.unwrap(), 0);
    }
}
