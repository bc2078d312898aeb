//! Error body returned by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Coarse failure class, serialized as `error.type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequestError,
    NotFoundError,
    ServerError,
    ServiceUnavailableError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequestError => "invalid_request_error",
            Self::NotFoundError => "not_found_error",
            Self::ServerError => "server_error",
            Self::ServiceUnavailableError => "service_unavailable_error",
        }
    }

    fn default_status(self) -> StatusCode {
        match self {
            Self::InvalidRequestError => StatusCode::BAD_REQUEST,
            Self::NotFoundError => StatusCode::NOT_FOUND,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailableError => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// `{ "error": { "message", "type", "param"?, "code"? } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorFields {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("{}: {}", .body.error.kind.as_str(), .body.error.message)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn of(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: kind.default_status(),
            body: ErrorBody {
                error: ErrorFields {
                    message: message.into(),
                    kind,
                    param: None,
                    code: None,
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::InvalidRequestError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::NotFoundError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::ServiceUnavailableError, message)
    }

    /// Names the offending request field
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.body.error.param = Some(param.into());
        self
    }

    /// Machine-readable reason
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.body.error.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self.body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::IntentUnresolved { message } => {
                Self::bad_request(message).with_code("intent_unresolved")
            }
            DomainError::ServiceUnavailable { service, message } => {
                Self::unavailable(format!("{}: {}", service, message))
            }
            DomainError::CatalogUnavailable { message } => {
                // Backend detail stays in the log
                tracing::error!(error = %message, "Catalog unavailable");
                Self::unavailable("Catalog temporarily unavailable, retry later")
                    .with_code("catalog_unavailable")
            }
            DomainError::Configuration { message }
            | DomainError::Internal { message }
            | DomainError::Storage { message }
            | DomainError::Cache { message } => Self::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_domain_error() {
        let cases = [
            (DomainError::not_found("Dataset 'x' not found"), StatusCode::NOT_FOUND),
            (DomainError::validation("bad id"), StatusCode::BAD_REQUEST),
            (DomainError::catalog_unavailable("pool timed out"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::service_unavailable("intent", "down"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::storage("disk full"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, status) in cases {
            assert_eq!(ApiError::from(domain_err).status, status);
        }
    }

    #[test]
    fn test_catalog_outage_message_is_generic() {
        let err = ApiError::from(DomainError::catalog_unavailable("password auth failed"));

        assert!(!err.body.error.message.contains("password"));
        assert_eq!(err.body.error.code.as_deref(), Some("catalog_unavailable"));
    }

    #[test]
    fn test_body_shape() {
        let err = ApiError::bad_request("limit must be positive")
            .with_param("limit")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "invalid_request_error: limit must be positive");

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["error"]["type"], "invalid_request_error");
        assert_eq!(json["error"]["param"], "limit");
        assert!(json["error"].get("code").is_none());
    }
}
