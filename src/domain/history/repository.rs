//! Storage contract for query history

use std::fmt::Debug;

use async_trait::async_trait;

use super::{HistoryStats, QueryRecord};
use crate::domain::DomainError;

/// Append-only store of resolved queries
#[async_trait]
pub trait HistoryRepository: Send + Sync + Debug {
    async fn record(&self, record: QueryRecord) -> Result<(), DomainError>;

    /// Most recent records first
    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError>;

    /// Aggregates over every stored record
    async fn stats(&self) -> Result<HistoryStats, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;
}
