//! Liveness and readiness checks

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use super::types::Json;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Ordered from best to worst
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Outcome of probing one dependency
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
}

impl HealthCheck {
    /// Maps a size lookup; `on_error` is the status a failure earns
    fn from_size<E: std::fmt::Display>(
        name: impl Into<String>,
        result: Result<usize, E>,
        on_error: HealthStatus,
    ) -> Self {
        let name = name.into();
        match result {
            Ok(entries) => Self {
                name,
                status: HealthStatus::Healthy,
                message: None,
                entries: Some(entries),
            },
            Err(e) => Self {
                name,
                status: on_error,
                message: Some(e.to_string()),
                entries: None,
            },
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION"),
        checks: Vec::new(),
        latency_ms: None,
    })
}

/// 503 when the catalog is unreachable; a failing cache tier only degrades
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let service = &state.dataset_service;

    let mut checks = vec![HealthCheck::from_size(
        "catalog",
        service.catalog_size().await,
        HealthStatus::Unhealthy,
    )];
    checks.extend(service.cache_sizes().await.into_iter().map(|(tier, size)| {
        HealthCheck::from_size(format!("cache_{}", tier.as_str()), size, HealthStatus::Degraded)
    }));

    let status = overall(&checks);
    let code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks,
        latency_ms: Some(started.elapsed().as_millis() as u64),
    };

    (code, Json(body))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn overall(checks: &[HealthCheck]) -> HealthStatus {
    checks
        .iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(HealthStatus::Healthy)
}
