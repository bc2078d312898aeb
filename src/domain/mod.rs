//! Domain layer - Core business logic and entities

pub mod cache;
pub mod catalog;
pub mod error;
pub mod history;
pub mod query;

pub use cache::{
    Cache, CacheEntry, CacheExt, CacheKeyGenerator, CacheTier, Sha256KeyGenerator,
};
pub use catalog::{CatalogStore, Dataset, DatasetId, SampleFilter, SampleQuery, SampleRecord};
pub use error::DomainError;
pub use history::{HistoryRepository, HistoryStats, QueryRecord, ResolutionStatus};
pub use query::{
    CanonicalQuery, CatalogPage, Extraction, Intent, IntentExtractor, QueryNormalizer, ResultSet,
    ServedBy,
};
