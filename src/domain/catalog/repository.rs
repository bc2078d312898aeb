//! Catalog store trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{Dataset, DatasetId, SampleRecord};
use crate::domain::query::{CanonicalQuery, CatalogPage};
use crate::domain::DomainError;

/// Durable record of dataset metadata
///
/// Implementations must order results identically for identical queries;
/// all of them delegate to [`super::ranking::rank`] for that. Backend failures
/// surface as `DomainError::CatalogUnavailable`.
#[async_trait]
pub trait CatalogStore: Send + Sync + Debug {
    /// Finds datasets matching the query, returning one page and the total
    async fn find(&self, query: &CanonicalQuery) -> Result<CatalogPage, DomainError>;

    /// Gets a dataset by id
    async fn get(&self, id: &DatasetId) -> Result<Option<Dataset>, DomainError>;

    /// Inserts or fully replaces a dataset
    async fn upsert(&self, dataset: Dataset) -> Result<Dataset, DomainError>;

    /// Number of datasets in the catalog
    async fn count(&self) -> Result<usize, DomainError>;

    /// Sample records of a dataset; empty when none were imported
    async fn samples(&self, id: &DatasetId) -> Result<Vec<SampleRecord>, DomainError>;

    /// Replaces the sample records of a dataset
    async fn upsert_samples(
        &self,
        id: &DatasetId,
        samples: Vec<SampleRecord>,
    ) -> Result<(), DomainError>;
}
