//! Shared tier backed by Redis

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};

use crate::domain::cache::{Cache, DEFAULT_KEY_NAMESPACE};
use crate::domain::DomainError;

/// Keys fetched per `SCAN` round trip
const SCAN_BATCH: usize = 500;

#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    pub url: String,
    pub default_ttl: Duration,
    /// Prepended to every key, for instances sharing one Redis database
    pub key_prefix: Option<String>,
    /// Leading segment of every key this gateway writes; bounds `clear` and `size`
    pub namespace: String,
    pub connection_timeout: Duration,
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            default_ttl: Duration::from_secs(1800),
            key_prefix: None,
            namespace: DEFAULT_KEY_NAMESPACE.to_string(),
            connection_timeout: Duration::from_secs(2),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    fn physical_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Glob matching every key written under the namespace
    fn owned_pattern(&self) -> String {
        self.physical_key(&format!("{}:*", self.namespace))
    }
}

/// Redis-backed cache tier
///
/// Entries are written with `PSETEX`, so sub-second TTLs are honored.
/// `clear` and `size` only touch keys under the configured namespace, never
/// the whole database. The connection manager reconnects on its own after
/// transport failures.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects, failing after `connection_timeout`
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Invalid Redis URL: {}", e)))?;

        let connection =
            match tokio::time::timeout(config.connection_timeout, ConnectionManager::new(client))
                .await
            {
                Ok(Ok(connection)) => connection,
                Ok(Err(e)) => {
                    return Err(DomainError::cache(format!("Redis connection failed: {}", e)));
                }
                Err(_) => {
                    return Err(DomainError::cache(format!(
                        "Redis connection timed out after {:?}",
                        config.connection_timeout
                    )));
                }
            };

        Ok(Self { connection, config })
    }

    pub fn config(&self) -> &RedisCacheConfig {
        &self.config
    }

    /// Runs one command on a cloned connection, tagging failures with `op`
    async fn run<T, F, Fut>(&self, op: &str, key: &str, command: F) -> Result<T, DomainError>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = Result<T, RedisError>>,
    {
        command(self.connection.clone())
            .await
            .map_err(|e| DomainError::cache(format!("Redis {} '{}' failed: {}", op, key, e)))
    }

    async fn owned_keys(&self) -> Result<Vec<String>, DomainError> {
        let pattern = self.config.owned_pattern();
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| DomainError::cache(format!("Redis SCAN '{}' failed: {}", pattern, e)))?;

            keys.extend(batch);
            cursor = next;

            if cursor == 0 {
                return Ok(keys);
            }
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let physical = self.config.physical_key(key);
        self.run("GET", key, |mut conn| async move { conn.get(physical).await })
            .await
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let physical = self.config.physical_key(key);
        let ttl_millis = (ttl.as_millis() as u64).max(1);

        self.run("PSETEX", key, |mut conn| async move {
            conn.pset_ex::<_, _, ()>(physical, value, ttl_millis).await
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let physical = self.config.physical_key(key);
        let removed: i64 = self
            .run("DEL", key, |mut conn| async move { conn.del(physical).await })
            .await?;

        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let physical = self.config.physical_key(key);
        self.run("EXISTS", key, |mut conn| async move { conn.exists(physical).await })
            .await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let keys = self.owned_keys().await?;
        if keys.is_empty() {
            return Ok(());
        }

        let pattern = self.config.owned_pattern();
        let _: i64 = self
            .run("DEL", &pattern, |mut conn| async move { conn.del(keys).await })
            .await?;

        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        Ok(self.owned_keys().await?.len())
    }
}
