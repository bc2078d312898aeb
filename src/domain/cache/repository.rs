//! Storage contract every cache tier implements

use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Key/value store holding JSON text with a per-write TTL
///
/// Values cross this boundary as strings so the trait stays object safe;
/// [`CacheExt`] layers typed access on top.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Replaces any previous value; the TTL restarts
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Returns whether an entry was removed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        self.get_raw(key).await.map(|found| found.is_some())
    }

    /// Drops every entry this tier owns
    async fn clear(&self) -> Result<(), DomainError>;

    /// Entry count; tiers may report an approximation
    async fn size(&self) -> Result<usize, DomainError>;
}

fn decode<V: DeserializeOwned>(key: &str, text: &str) -> Result<V, DomainError> {
    serde_json::from_str(text)
        .map_err(|e| DomainError::cache(format!("Undecodable cache entry '{}': {}", key, e)))
}

fn encode<V: Serialize + ?Sized>(key: &str, value: &V) -> Result<String, DomainError> {
    serde_json::to_string(value)
        .map_err(|e| DomainError::cache(format!("Unencodable cache entry '{}': {}", key, e)))
}

/// Typed reads and writes over any [`Cache`]
pub trait CacheExt: Cache {
    fn get<'a, V>(&'a self, key: &'a str) -> impl Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            self.get_raw(key)
                .await?
                .map(|text| decode(key, &text))
                .transpose()
        }
    }

    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let text = encode(key, value)?;
            self.set_raw(key, &text, ttl).await
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
