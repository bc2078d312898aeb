//! In-memory catalog store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::catalog::{ranking, CatalogStore, Dataset, DatasetId, SampleRecord};
use crate::domain::query::{CanonicalQuery, CatalogPage};
use crate::domain::DomainError;

/// In-memory catalog backed by RwLock maps
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    datasets: RwLock<HashMap<DatasetId, Dataset>>,
    samples: RwLock<HashMap<DatasetId, Vec<SampleRecord>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with datasets
    pub fn with_datasets(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let map = datasets
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();

        Self {
            datasets: RwLock::new(map),
            samples: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::internal(format!("Failed to acquire read lock: {}", e))
    }

    fn write_lock_error(e: impl std::fmt::Display) -> DomainError {
        DomainError::internal(format!("Failed to acquire write lock: {}", e))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn find(&self, query: &CanonicalQuery) -> Result<CatalogPage, DomainError> {
        let datasets = self.datasets.read().map_err(Self::read_lock_error)?;

        Ok(ranking::rank(datasets.values().cloned(), query))
    }

    async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError> {
        let datasets = self.datasets.read().map_err(Self::read_lock_error)?;

        Ok(datasets.get(id).cloned())
    }

    async fn upsert(&self, mut dataset: Dataset) -> Result<Dataset, DomainError> {
        let mut datasets = self.datasets.write().map_err(Self::write_lock_error)?;

        if let Some(existing) = datasets.get(&dataset.id) {
            dataset.created_at = existing.created_at;
        }
        datasets.insert(dataset.id.clone(), dataset.clone());

        Ok(dataset)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let datasets = self.datasets.read().map_err(Self::read_lock_error)?;

        Ok(datasets.len())
    }

    async fn samples(&self, id: &DatasetId) -> Result<Vec<SampleRecord>, DomainError> {
        let samples = self.samples.read().map_err(Self::read_lock_error)?;

        Ok(samples.get(id).cloned().unwrap_or_default())
    }

    async fn upsert_samples(
        &self,
        id: &DatasetId,
        records: Vec<SampleRecord>,
    ) -> Result<(), DomainError> {
        let mut samples = self.samples.write().map_err(Self::write_lock_error)?;

        samples.insert(id.clone(), records);
        Ok(())
    }
}
