//! Prometheus recorder, scrape route and request metrics

use std::time::Duration;

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;

static DATASET_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/v1/datasets/|/admin/cache/datasets/)[^/]+").unwrap());

const MAX_PATH_LABEL: usize = 64;

/// Scrape handle for the installed recorder
#[derive(Clone)]
pub struct PrometheusMetrics(PrometheusHandle);

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrometheusMetrics")
    }
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.0.render()
    }
}

fn install(config: &MetricsConfig) -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &config.latency_buckets,
        )?
        .install_recorder()
}

/// Installs the global Prometheus recorder; `None` when disabled or on failure
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match install(config) {
        Ok(handle) => {
            describe_metrics();
            tracing::info!(path = %config.path, "Prometheus metrics initialized");
            Some(PrometheusMetrics(handle))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Prometheus metrics");
            None
        }
    }
}

fn describe_metrics() {
    describe_counter!(
        "catalog_cache_lookups_total",
        "Cache tier lookups by tier and outcome"
    );
    describe_histogram!(
        "catalog_resolve_duration_seconds",
        Unit::Seconds,
        "Query resolution latency by serving tier"
    );
    describe_counter!(
        "catalog_normalizer_fallbacks_total",
        "Queries normalized by the keyword fallback"
    );

    gauge!("dataset_query_gateway_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Serves the scrape endpoint at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics.render(),
    )
}

/// Counts a finished request; 5xx responses also bump the error counter
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Replaces dataset ids in paths so labels stay low-cardinality
fn sanitize_path(path: &str) -> String {
    let path = DATASET_SEGMENT.replace(path, "${1}{id}");

    path.chars().take(MAX_PATH_LABEL).collect()
}
