//! In-memory history repository

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::history::{HistoryRepository, HistoryStats, QueryRecord};
use crate::domain::DomainError;

/// Bounded record log; the oldest record is evicted once full
#[derive(Debug)]
pub struct InMemoryHistoryRepository {
    records: RwLock<VecDeque<QueryRecord>>,
    max_records: usize,
}

impl InMemoryHistoryRepository {
    pub fn new(max_records: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            max_records: max_records.max(1),
        }
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }
}

impl Default for InMemoryHistoryRepository {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn record(&self, record: QueryRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        while records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(record);

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    async fn stats(&self) -> Result<HistoryStats, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(HistoryStats::from_records(records.iter()))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let records = self.records.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(records.len())
    }
}
