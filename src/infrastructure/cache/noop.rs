//! Placeholder tier for a disabled or unreachable backend

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Misses on every read and discards every write, so a tier slot can stay
/// wired while its backend is absent
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl NoopCache {
    pub fn new() -> Self {
        NoopCache
    }
}

#[async_trait]
impl Cache for NoopCache {
    async fn get_raw(&self, _: &str) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    async fn set_raw(&self, _: &str, _: &str, _: Duration) -> Result<(), DomainError> {
        Ok(())
    }

    async fn delete(&self, _: &str) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn size(&self) -> Result<usize, DomainError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_are_discarded() {
        let tier = NoopCache::new();

        tier.set_raw("catalog:query:x", "[]", Duration::from_secs(60)).await.unwrap();

        assert_eq!(tier.get_raw("catalog:query:x").await.unwrap(), None);
        assert!(!tier.exists("catalog:query:x").await.unwrap());
        assert!(!tier.delete("catalog:query:x").await.unwrap());
        assert_eq!(tier.size().await.unwrap(), 0);
    }
}
