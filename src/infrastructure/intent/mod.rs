//! Intent extractor implementations

mod http;
mod rule_based;

pub use http::HttpIntentExtractor;
pub use rule_based::RuleBasedIntentExtractor;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::domain::query::IntentExtractor;
use crate::domain::DomainError;

/// Which extractor backs the normalizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentProvider {
    #[default]
    RuleBased,
    Http,
}

/// Intent extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IntentConfig {
    #[serde(default)]
    pub provider: IntentProvider,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    1500
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            provider: IntentProvider::default(),
            url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl IntentConfig {
    pub fn http(url: impl Into<String>) -> Self {
        Self {
            provider: IntentProvider::Http,
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Creates the configured extractor
pub fn create_extractor(config: &IntentConfig) -> Result<Arc<dyn IntentExtractor>, DomainError> {
    match config.provider {
        IntentProvider::RuleBased => {
            info!("Using rule-based intent extractor");
            Ok(Arc::new(RuleBasedIntentExtractor::new()))
        }
        IntentProvider::Http => {
            let url = config
                .url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| DomainError::configuration("intent.url is required for http provider"))?;

            info!(url = %url, timeout_ms = config.timeout_ms, "Using HTTP intent extractor");
            Ok(Arc::new(HttpIntentExtractor::new(url, config.timeout())?))
        }
    }
}
