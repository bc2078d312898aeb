//! Error type shared by every layer below the HTTP surface

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Intent unresolved: {message}")]
    IntentUnresolved { message: String },

    #[error("Service unavailable: {service} - {message}")]
    ServiceUnavailable { service: String, message: String },

    #[error("Catalog unavailable: {message}")]
    CatalogUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },
}

/// Emits `fn $name(message) -> Self` for single-message variants
macro_rules! message_constructors {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            pub fn $name(message: impl Into<String>) -> Self {
                Self::$variant { message: message.into() }
            }
        )*
    };
}

impl DomainError {
    message_constructors! {
        not_found => NotFound,
        validation => Validation,
        intent_unresolved => IntentUnresolved,
        catalog_unavailable => CatalogUnavailable,
        configuration => Configuration,
        internal => Internal,
        storage => Storage,
        cache => Cache,
    }

    /// `service` names the upstream, e.g. `intent`
    pub fn service_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Whether the normalizer should fall back to keyword-only parsing
    pub fn is_normalizer_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IntentUnresolved { .. } | Self::ServiceUnavailable { .. }
        )
    }
}
