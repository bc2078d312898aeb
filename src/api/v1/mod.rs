//! Public v1 API endpoints

pub mod datasets;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/datasets", get(datasets::list_datasets))
        .route("/datasets/{dataset_id}", get(datasets::get_dataset))
        .route(
            "/datasets/{dataset_id}/samples/filter",
            post(datasets::filter_samples),
        )
        .route("/query", post(query::query_datasets))
}
