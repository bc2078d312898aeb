//! Operator endpoints for history and cache maintenance

pub mod cache;
pub mod history;

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/history", get(history::recent_queries))
        .route("/history/stats", get(history::history_stats))
        .route(
            "/cache/datasets/{dataset_id}",
            delete(cache::invalidate_dataset),
        )
        .route("/cache/queries/invalidate", post(cache::invalidate_query))
}
