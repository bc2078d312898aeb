//! Query history entities

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::query::{CanonicalQuery, ServedBy};

/// Unique identifier for a query record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryRecordId(String);

impl QueryRecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique ID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a query was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    MemoryHit,
    SharedHit,
    Miss,
    Failed,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemoryHit => "memory_hit",
            Self::SharedHit => "shared_hit",
            Self::Miss => "miss",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memory_hit" => Some(Self::MemoryHit),
            "shared_hit" => Some(Self::SharedHit),
            "miss" => Some(Self::Miss),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::MemoryHit | Self::SharedHit)
    }
}

impl From<ServedBy> for ResolutionStatus {
    fn from(served_by: ServedBy) -> Self {
        match served_by {
            ServedBy::Memory => Self::MemoryHit,
            ServedBy::Shared => Self::SharedHit,
            ServedBy::Catalog => Self::Miss,
        }
    }
}

/// One resolved (or failed) query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: QueryRecordId,
    pub raw_text: String,
    pub canonical: CanonicalQuery,
    pub cache_key: String,
    pub status: ResolutionStatus,
    pub elapsed_ms: u64,
    pub result_count: usize,
    pub degraded: bool,
    pub timestamp: DateTime<Utc>,
}

impl QueryRecord {
    pub fn new(
        raw_text: impl Into<String>,
        canonical: CanonicalQuery,
        cache_key: impl Into<String>,
        status: ResolutionStatus,
    ) -> Self {
        let degraded = canonical.is_degraded();
        Self {
            id: QueryRecordId::generate(),
            raw_text: raw_text.into(),
            canonical,
            cache_key: cache_key.into(),
            status,
            elapsed_ms: 0,
            result_count: 0,
            degraded,
            timestamp: Utc::now(),
        }
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn with_result_count(mut self, count: usize) -> Self {
        self.result_count = count;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn canonical_form(&self) -> String {
        self.canonical.canonical_form()
    }
}

/// Count and average latency for one canonical query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalStats {
    pub canonical_form: String,
    pub count: u64,
    pub avg_elapsed_ms: f64,
}

/// Aggregate view over recorded queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_queries: u64,
    pub avg_elapsed_ms: f64,
    pub cache_hit_rate: f64,
    pub degraded_queries: u64,
    pub by_status: BTreeMap<String, u64>,
    /// Sorted by count desc, then canonical form
    pub by_canonical: Vec<CanonicalStats>,
}

impl HistoryStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a QueryRecord>,
    {
        let mut stats = Self::default();
        let mut total_elapsed: u128 = 0;
        let mut hits: u64 = 0;
        let mut per_canonical: HashMap<String, (u64, u128)> = HashMap::new();

        for record in records {
            stats.total_queries += 1;
            total_elapsed += record.elapsed_ms as u128;

            if record.status.is_cache_hit() {
                hits += 1;
            }
            if record.degraded {
                stats.degraded_queries += 1;
            }

            *stats
                .by_status
                .entry(record.status.as_str().to_string())
                .or_insert(0) += 1;

            let entry = per_canonical.entry(record.canonical_form()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += record.elapsed_ms as u128;
        }

        if stats.total_queries > 0 {
            stats.avg_elapsed_ms = total_elapsed as f64 / stats.total_queries as f64;
            stats.cache_hit_rate = hits as f64 / stats.total_queries as f64;
        }

        stats.by_canonical = per_canonical
            .into_iter()
            .map(|(canonical_form, (count, elapsed))| CanonicalStats {
                canonical_form,
                count,
                avg_elapsed_ms: elapsed as f64 / count as f64,
            })
            .collect();
        stats.sort_canonical();

        stats
    }

    pub(crate) fn sort_canonical(&mut self) {
        self.by_canonical.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.canonical_form.cmp(&b.canonical_form))
        });
    }
}
