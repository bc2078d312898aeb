//! Query history storage and the background recorder

mod in_memory;
mod postgres;
mod recorder;

pub use in_memory::InMemoryHistoryRepository;
pub use postgres::PostgresHistoryRepository;
pub use recorder::HistoryRecorder;

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::history::HistoryRepository;
use crate::domain::DomainError;
use crate::infrastructure::catalog::PostgresConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryBackend {
    #[default]
    Memory,
    Postgres,
}

/// History configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub backend: HistoryBackend,
    #[serde(default)]
    pub database_url: Option<String>,
    /// Retention bound for the in-memory backend
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Queue length between request handlers and the writer task
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_max_records() -> usize {
    10_000
}

fn default_channel_capacity() -> usize {
    1024
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::default(),
            database_url: None,
            max_records: default_max_records(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Creates the repository and spawns its recorder
pub async fn create_recorder(config: &HistoryConfig) -> Result<HistoryRecorder, DomainError> {
    let repository: Arc<dyn HistoryRepository> = match config.backend {
        HistoryBackend::Memory => {
            info!(max_records = config.max_records, "Using in-memory query history");
            Arc::new(InMemoryHistoryRepository::new(config.max_records))
        }
        HistoryBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::configuration("history.database_url is required for postgres backend")
                })?;

            let repository = PostgresHistoryRepository::new(PostgresConfig::new(url).connect().await?);
            repository.ensure_table().await?;
            info!("Using PostgreSQL query history");
            Arc::new(repository)
        }
    };

    Ok(HistoryRecorder::spawn(repository, config.channel_capacity))
}
