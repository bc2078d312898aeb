//! Ordered composition of cache tiers

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::cache::{clamp_ttl, Cache, CacheEntry, CacheTier, DEFAULT_TTL_FLOOR};
use crate::domain::DomainError;

/// One tier in the lookup order
#[derive(Debug, Clone)]
pub struct TierSlot {
    tier: CacheTier,
    cache: Arc<dyn Cache>,
    default_ttl: Duration,
    timeout: Option<Duration>,
}

impl TierSlot {
    pub fn new(tier: CacheTier, cache: Arc<dyn Cache>, default_ttl: Duration) -> Self {
        Self {
            tier,
            cache,
            default_ttl,
            timeout: None,
        }
    }

    /// Bounds every call to this tier; an elapsed timeout counts as an error
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tier(&self) -> CacheTier {
        self.tier
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, DomainError>
    where
        F: std::future::Future<Output = Result<T, DomainError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                DomainError::cache(format!("{} tier timed out after {:?}", self.tier, limit))
            })?,
            None => fut.await,
        }
    }
}

/// Result of walking the tiers
#[derive(Debug)]
pub struct TierLookup<T> {
    /// First tier holding an unexpired entry, with the entry
    pub hit: Option<(CacheTier, CacheEntry<T>)>,
    /// Tiers consulted before the hit (or all of them on a full miss)
    pub missed: Vec<CacheTier>,
}

impl<T> TierLookup<T> {
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }
}

/// Lookup outcome label used for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Hit,
    Miss,
    Expired,
    Error,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Expired => "expired",
            Self::Error => "error",
        }
    }
}

/// Cache tiers walked in priority order
///
/// Any tier failure (transport error, timeout, undecodable payload) is a miss
/// for that tier only and never surfaces to the caller.
#[derive(Debug, Clone)]
pub struct TieredCache {
    tiers: Vec<TierSlot>,
    ttl_floor: Duration,
}

impl TieredCache {
    pub fn new(tiers: Vec<TierSlot>) -> Self {
        Self {
            tiers,
            ttl_floor: DEFAULT_TTL_FLOOR,
        }
    }

    pub fn with_ttl_floor(mut self, floor: Duration) -> Self {
        self.ttl_floor = floor;
        self
    }

    pub fn tiers(&self) -> &[TierSlot] {
        &self.tiers
    }

    pub fn ttl_floor(&self) -> Duration {
        self.ttl_floor
    }

    /// Walks the tiers in order, stopping at the first unexpired entry
    pub async fn lookup<T>(&self, key: &str) -> TierLookup<T>
    where
        T: DeserializeOwned,
    {
        let mut missed = Vec::with_capacity(self.tiers.len());

        for slot in &self.tiers {
            let (outcome, entry) = self.read_slot::<T>(slot, key).await;

            metrics::counter!(
                "catalog_cache_lookups_total",
                "tier" => slot.tier.as_str(),
                "outcome" => outcome.as_str()
            )
            .increment(1);

            if let Some(entry) = entry {
                debug!(tier = %slot.tier, key = %key, "Cache hit");
                return TierLookup {
                    hit: Some((slot.tier, entry)),
                    missed,
                };
            }

            debug!(tier = %slot.tier, key = %key, outcome = outcome.as_str(), "Cache miss");
            missed.push(slot.tier);
        }

        TierLookup { hit: None, missed }
    }

    async fn read_slot<T>(&self, slot: &TierSlot, key: &str) -> (Outcome, Option<CacheEntry<T>>)
    where
        T: DeserializeOwned,
    {
        let raw = match slot.bounded(slot.cache.get_raw(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return (Outcome::Miss, None),
            Err(e) => {
                warn!(tier = %slot.tier, key = %key, error = %e, "Cache tier lookup failed");
                return (Outcome::Error, None);
            }
        };

        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) if entry.is_expired() => (Outcome::Expired, None),
            Ok(entry) => (Outcome::Hit, Some(entry)),
            Err(e) => {
                warn!(tier = %slot.tier, key = %key, error = %e, "Undecodable cache entry");
                (Outcome::Error, None)
            }
        }
    }

    /// Writes the value into the given tiers, each with its own default TTL
    ///
    /// `ttl_cap` shortens every tier's TTL when set. All TTLs are clamped up to
    /// the floor. Failures are logged and otherwise ignored. Returns the number
    /// of tiers written.
    pub async fn backfill<T>(
        &self,
        key: &str,
        value: &T,
        tiers: &[CacheTier],
        ttl_cap: Option<Duration>,
    ) -> usize
    where
        T: Serialize,
    {
        let mut written = 0;

        for slot in self.tiers.iter().filter(|s| tiers.contains(&s.tier)) {
            let ttl = match ttl_cap {
                Some(cap) => slot.default_ttl.min(cap),
                None => slot.default_ttl,
            };

            match self.write(slot, key, value, ttl).await {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!(tier = %slot.tier, key = %key, error = %e, "Cache backfill failed");
                }
            }
        }

        written
    }

    async fn write<T>(
        &self,
        slot: &TierSlot,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), DomainError>
    where
        T: Serialize,
    {
        let ttl = clamp_ttl(ttl, self.ttl_floor);
        let entry = CacheEntry::new(value, ttl, self.ttl_floor);
        let payload = serde_json::to_string(&entry)
            .map_err(|e| DomainError::cache(format!("Failed to serialize cache entry: {}", e)))?;

        slot.bounded(slot.cache.set_raw(key, &payload, ttl)).await?;
        debug!(tier = %slot.tier, key = %key, ttl_ms = ttl.as_millis() as u64, "Cache backfilled");
        Ok(())
    }

    /// Removes the key from every tier; returns how many tiers held it
    pub async fn invalidate(&self, key: &str) -> usize {
        let mut removed = 0;

        for slot in &self.tiers {
            match slot.bounded(slot.cache.delete(key)).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(tier = %slot.tier, key = %key, error = %e, "Cache invalidation failed");
                }
            }
        }

        removed
    }

    /// Entry count per tier, used by readiness checks
    pub async fn sizes(&self) -> Vec<(CacheTier, Result<usize, DomainError>)> {
        join_all(self.tiers.iter().map(|slot| async move {
            (slot.tier, slot.bounded(slot.cache.size()).await)
        }))
        .await
    }
}
