use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::admin;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;

/// Health-only router without application state
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Dataset API
        .nest("/v1", v1::create_v1_router())
        // Operator API
        .nest("/admin", admin::create_admin_router())
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::domain::cache::{CacheTier, MockCache, Sha256KeyGenerator};
    use crate::domain::catalog::{Dataset, MockCatalogStore};
    use crate::domain::query::QueryNormalizer;
    use crate::infrastructure::cache::{InMemoryCache, TierSlot, TieredCache};
    use crate::infrastructure::history::{HistoryRecorder, InMemoryHistoryRepository};
    use crate::infrastructure::intent::RuleBasedIntentExtractor;
    use crate::infrastructure::services::{DatasetService, ResolutionService};

    struct Harness {
        router: Router,
        catalog: Arc<MockCatalogStore>,
        recorder: HistoryRecorder,
    }

    fn harness_with_shared(shared: Arc<MockCache>) -> Harness {
        let catalog = Arc::new(
            MockCatalogStore::new()
                .with_datasets(vec![
                    Dataset::new("imagenet-1k", "ImageNet-1k")
                        .with_description("Large-scale image classification benchmark")
                        .with_category("vision")
                        .with_tags(vec!["classification".to_string()])
                        .with_sample_count(1_281_167),
                    Dataset::new("squad", "SQuAD")
                        .with_description("Reading comprehension question answering")
                        .with_category("nlp")
                        .with_sample_count(98_169),
                ])
                .with_samples(
                    "squad",
                    vec![
                        json!({ "question": "Who wrote Hamlet?", "answer_len": 11 })
                            .as_object()
                            .cloned()
                            .unwrap(),
                        json!({ "question": "When was Rome founded?", "answer_len": 6 })
                            .as_object()
                            .cloned()
                            .unwrap(),
                    ],
                ),
        );

        let tiers = TieredCache::new(vec![
            TierSlot::new(
                CacheTier::Memory,
                Arc::new(InMemoryCache::new()),
                Duration::from_secs(300),
            ),
            TierSlot::new(CacheTier::Shared, shared, Duration::from_secs(1800))
                .with_timeout(Duration::from_millis(50)),
        ]);

        let recorder = HistoryRecorder::spawn(Arc::new(InMemoryHistoryRepository::default()), 64);

        let resolver = ResolutionService::new(
            QueryNormalizer::new(Arc::new(RuleBasedIntentExtractor::new())),
            tiers,
            catalog.clone(),
            Arc::new(Sha256KeyGenerator::default()),
        )
        .with_recorder(recorder.clone());

        let state = AppState::new(Arc::new(DatasetService::new(resolver)));

        Harness {
            router: create_router_with_state(state),
            catalog,
            recorder,
        }
    }

    fn harness() -> Harness {
        harness_with_shared(Arc::new(MockCache::new()))
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_only_router() {
        let response = create_router().oneshot(get("/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let h = harness();
        let (status, body) = send(&h.router, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_catalog_and_tiers() {
        let h = harness();
        let (status, body) = send(&h.router, get("/ready")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let names: Vec<_> = body["checks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["catalog", "cache_memory", "cache_shared"]);
        assert_eq!(body["checks"][0]["entries"], 2);
    }

    #[tokio::test]
    async fn test_ready_degraded_when_shared_tier_fails() {
        let h = harness_with_shared(Arc::new(MockCache::new().with_error("connection refused")));
        let (status, body) = send(&h.router, get("/ready")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_ready_unavailable_when_catalog_fails() {
        let h = harness();
        h.catalog.set_error(Some("pool exhausted".to_string()));

        let (status, body) = send(&h.router, get("/ready")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_list_datasets() {
        let h = harness();
        let (status, body) = send(&h.router, get("/v1/datasets?limit=1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["object"], "list");
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["served_by"], "catalog");
    }

    #[tokio::test]
    async fn test_list_datasets_by_category() {
        let h = harness();
        let (status, body) = send(&h.router, get("/v1/datasets?category=NLP")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["id"], "squad");
        assert_eq!(body["query"]["category"], "nlp");
    }

    #[tokio::test]
    async fn test_list_datasets_by_search_words() {
        let h = harness();
        let (status, body) = send(&h.router, get("/v1/datasets?search=image%20benchmark")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["id"], "imagenet-1k");
    }

    #[tokio::test]
    async fn test_list_datasets_rejects_bad_query_string() {
        let h = harness();
        let (status, body) = send(&h.router, get("/v1/datasets?limit=many")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_query_string");
    }

    #[tokio::test]
    async fn test_get_dataset() {
        let h = harness();
        let (status, body) = send(&h.router, get("/v1/datasets/squad")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "squad");
        assert_eq!(body["display_name"], "SQuAD");
        assert!(body.get("samples").is_none());
    }

    #[tokio::test]
    async fn test_get_dataset_with_sample_preview() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            get("/v1/datasets/squad?include_samples=true&sample_limit=1"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "squad");
        assert_eq!(body["samples"].as_array().unwrap().len(), 1);
        assert_eq!(body["samples"][0]["question"], "Who wrote Hamlet?");
    }

    #[tokio::test]
    async fn test_sample_preview_of_unknown_dataset_is_404() {
        let h = harness();
        let (status, _) = send(&h.router, get("/v1/datasets/coco?include_samples=true")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_unknown_dataset_is_404() {
        let h = harness();
        let (status, body) = send(&h.router, get("/v1/datasets/coco")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found_error");
    }

    #[tokio::test]
    async fn test_get_dataset_with_invalid_id_is_400() {
        let h = harness();
        let (status, _) = send(&h.router, get("/v1/datasets/bad%20id")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_served_from_memory_on_repeat() {
        let h = harness();
        let request = json!({ "text": "find image classification datasets", "limit": 5 });

        let (status, first) = send(&h.router, post_json("/v1/query", request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["served_by"], "catalog");
        assert_eq!(first["data"][0]["id"], "imagenet-1k");

        let (_, second) = send(&h.router, post_json("/v1/query", request)).await;
        assert_eq!(second["served_by"], "memory");
        assert_eq!(second["data"], first["data"]);
        assert_eq!(h.catalog.find_calls(), 1);
    }

    #[tokio::test]
    async fn test_query_catalog_failure_is_503() {
        let h = harness();
        h.catalog.set_error(Some("connection reset".to_string()));

        let (status, body) = send(
            &h.router,
            post_json("/v1/query", json!({ "text": "question answering" })),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "catalog_unavailable");
    }

    #[tokio::test]
    async fn test_query_rejects_blank_text() {
        let h = harness();
        let (status, body) =
            send(&h.router, post_json("/v1/query", json!({ "text": "  " }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
    }

    #[tokio::test]
    async fn test_query_rejects_malformed_json() {
        let h = harness();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/query")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"text\":"))
            .unwrap();

        let (status, body) = send(&h.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_query_requires_json_content_type() {
        let h = harness();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/query")
            .body(Body::from(r#"{"text":"squad"}"#))
            .unwrap();

        let (status, body) = send(&h.router, request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_filter_samples() {
        let h = harness();
        let (status, body) = send(
            &h.router,
            post_json(
                "/v1/datasets/squad/samples/filter",
                json!({ "filters": { "answer_len": { "gt": 8 } } }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dataset_id"], "squad");
        assert_eq!(body["total_samples"], 2);
        assert_eq!(body["filtered_count"], 1);
        assert_eq!(body["samples"][0]["question"], "Who wrote Hamlet?");
    }

    #[tokio::test]
    async fn test_history_endpoints() {
        let h = harness();
        send(&h.router, post_json("/v1/query", json!({ "text": "question answering" }))).await;
        send(&h.router, post_json("/v1/query", json!({ "text": "question answering" }))).await;
        h.recorder.flush().await.unwrap();

        let (status, stats) = send(&h.router, get("/admin/history/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_queries"], 2);

        let (status, recent) = send(&h.router, get("/admin/history?limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(recent["data"].as_array().unwrap().len(), 1);
        assert_eq!(recent["data"][0]["raw_text"], "question answering");
    }

    #[tokio::test]
    async fn test_invalidate_dataset() {
        let h = harness();
        send(&h.router, get("/v1/datasets/squad")).await;

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/admin/cache/datasets/squad")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&h.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 2);

        send(&h.router, get("/v1/datasets/squad")).await;
        assert_eq!(h.catalog.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_query() {
        let h = harness();
        let request = json!({ "text": "image classification", "limit": 5 });
        send(&h.router, post_json("/v1/query", request.clone())).await;

        let (status, body) = send(
            &h.router,
            post_json("/admin/cache/queries/invalidate", request.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], 2);

        let (_, again) = send(&h.router, post_json("/v1/query", request)).await;
        assert_eq!(again["served_by"], "catalog");
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let h = harness();
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();

        let response = h.router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }
}
