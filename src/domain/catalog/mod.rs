//! Catalog domain - datasets, ranking and sample filtering

mod dataset;
pub mod filter;
pub mod ranking;
mod repository;

pub use dataset::{Dataset, DatasetId, SampleRecord, MAX_DATASET_ID_LENGTH};
pub use filter::{Condition, SampleFilter, SamplePage, SampleQuery, SortOrder};
pub use repository::CatalogStore;

#[cfg(test)]
pub use repository::mock::MockCatalogStore;
