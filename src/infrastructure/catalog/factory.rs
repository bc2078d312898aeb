//! Catalog store selection from configuration

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::catalog::CatalogStore;
use crate::domain::DomainError;

use super::import::import_file;
use super::in_memory::InMemoryCatalogStore;
use super::postgres::{PostgresCatalogStore, PostgresConfig};

/// Catalog backend kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogBackend {
    #[default]
    Memory,
    Postgres,
}

/// Catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub backend: CatalogBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// JSON document imported at startup
    #[serde(default)]
    pub seed_file: Option<String>,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            seed_file: None,
        }
    }
}

impl CatalogConfig {
    pub fn postgres(url: impl Into<String>) -> Self {
        Self {
            backend: CatalogBackend::Postgres,
            database_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_seed_file(mut self, path: impl Into<String>) -> Self {
        self.seed_file = Some(path.into());
        self
    }

    fn postgres_config(&self) -> Result<PostgresConfig, DomainError> {
        let url = self
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("catalog.database_url is required for postgres backend")
            })?;

        Ok(PostgresConfig::new(url)
            .with_max_connections(self.max_connections)
            .with_connect_timeout(self.connect_timeout_secs))
    }
}

/// Builds the configured catalog store
#[derive(Debug, Default)]
pub struct CatalogFactory;

impl CatalogFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates the store and applies the seed file, if any
    pub async fn create(&self, config: &CatalogConfig) -> Result<Arc<dyn CatalogStore>, DomainError> {
        let store: Arc<dyn CatalogStore> = match config.backend {
            CatalogBackend::Memory => {
                info!("Using in-memory catalog");
                Arc::new(InMemoryCatalogStore::new())
            }
            CatalogBackend::Postgres => {
                let store = PostgresCatalogStore::connect(&config.postgres_config()?).await?;
                store.ensure_tables().await?;
                info!("Using PostgreSQL catalog");
                Arc::new(store)
            }
        };

        if let Some(seed) = &config.seed_file {
            import_file(store.as_ref(), seed).await?;
        }

        Ok(store)
    }
}
