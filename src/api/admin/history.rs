//! Query history endpoints

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, HistoryParams, HistoryResponse, Json, Query, DEFAULT_HISTORY_LIMIT,
};
use crate::domain::history::HistoryStats;

const MAX_HISTORY_LIMIT: usize = 1000;

/// GET /admin/history
pub async fn recent_queries(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let records = state.dataset_service.recent_queries(limit).await?;

    Ok(Json(records.into()))
}

/// GET /admin/history/stats
pub async fn history_stats(State(state): State<AppState>) -> Result<Json<HistoryStats>, ApiError> {
    let stats = state.dataset_service.history_stats().await?;
    Ok(Json(stats))
}
