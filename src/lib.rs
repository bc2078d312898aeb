//! Dataset Query Gateway
//!
//! Resolves natural-language dataset queries against a catalog:
//! - Intent/entity extraction with a keyword fallback
//! - Canonical queries keyed into a memory tier and an optional shared Redis tier
//! - PostgreSQL or in-memory catalog storage with sample filtering
//! - Asynchronous query history with aggregate statistics

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::cache::Sha256KeyGenerator;
use domain::query::QueryNormalizer;
use infrastructure::{
    cache::CacheFactory,
    catalog::CatalogFactory,
    history::{create_recorder, HistoryRecorder},
    intent::create_extractor,
    services::{DatasetService, ResolutionConfig, ResolutionService},
};
use tracing::info;

/// Wired application: HTTP state plus the handles needed at shutdown
#[derive(Debug, Clone)]
pub struct AppContext {
    pub state: AppState,
    pub recorder: HistoryRecorder,
}

/// Create the application with default configuration
pub async fn create_app_state() -> anyhow::Result<AppContext> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application from configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppContext> {
    let extractor = create_extractor(&config.intent)?;
    let normalizer = QueryNormalizer::new(extractor);

    let tiers = CacheFactory::new().create(&config.cache).await;
    let catalog = CatalogFactory::new().create(&config.catalog).await?;
    let keys = Arc::new(Sha256KeyGenerator::new(config.cache.key_namespace.clone()));
    let recorder = create_recorder(&config.history).await?;

    let resolver = ResolutionService::new(normalizer, tiers, catalog, keys)
        .with_recorder(recorder.clone())
        .with_config(ResolutionConfig::from_cache_config(&config.cache));

    info!(
        extractor = resolver.normalizer().extractor_name(),
        tiers = resolver.tiers().tiers().len(),
        "Resolution pipeline ready"
    );

    let state = AppState::new(Arc::new(DatasetService::new(resolver)));

    Ok(AppContext { state, recorder })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_app_state_with_defaults() {
        let context = create_app_state().await.unwrap();

        assert_eq!(context.state.dataset_service.catalog_size().await.unwrap(), 0);
        assert_eq!(context.state.dataset_service.cache_sizes().await.len(), 2);
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_http_intent_without_url() {
        let mut config = AppConfig::default();
        config.intent.provider = infrastructure::intent::IntentProvider::Http;

        assert!(create_app_state_with_config(&config).await.is_err());
    }
}
