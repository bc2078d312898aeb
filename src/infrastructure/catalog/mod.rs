//! Catalog store implementations

mod factory;
mod import;
mod in_memory;
mod postgres;

pub use factory::{CatalogBackend, CatalogConfig, CatalogFactory};
pub use import::{import_entries, import_file, ImportDocument, ImportEntry, ImportSummary};
pub use in_memory::InMemoryCatalogStore;
pub use postgres::{PostgresCatalogStore, PostgresConfig};
