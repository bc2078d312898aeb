//! Cache entry envelope and TTL policy

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default minimum TTL applied to every write
pub const DEFAULT_TTL_FLOOR: Duration = Duration::from_secs(1);

/// Clamps a TTL up to the floor; a zero floor is treated as one millisecond
pub fn clamp_ttl(ttl: Duration, floor: Duration) -> Duration {
    let floor = floor.max(Duration::from_millis(1));
    ttl.max(floor)
}

/// Payload stored in every tier, replaced wholesale on write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Wraps a value; the TTL is clamped to the floor
    pub fn new(value: T, ttl: Duration, floor: Duration) -> Self {
        Self::created_at(value, Utc::now(), ttl, floor)
    }

    pub fn created_at(value: T, now: DateTime<Utc>, ttl: Duration, floor: Duration) -> Self {
        let ttl = clamp_ttl(ttl, floor);
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Remaining lifetime, zero once expired
    pub fn remaining_ttl(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
