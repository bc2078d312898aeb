//! Cache invalidation endpoints

use axum::extract::State;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, InvalidateResponse, Json, Path, QueryRequest};

/// DELETE /admin/cache/datasets/{dataset_id}
pub async fn invalidate_dataset(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let removed = state.dataset_service.invalidate_dataset(&dataset_id).await?;

    info!(dataset_id = %dataset_id, removed, "Invalidated dataset cache entry");

    Ok(Json(InvalidateResponse { removed }))
}

/// POST /admin/cache/queries/invalidate
pub async fn invalidate_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    let removed = state
        .dataset_service
        .invalidate_query(&request.text, request.limit(), request.offset())
        .await?;

    info!(removed, "Invalidated query cache entry");

    Ok(Json(InvalidateResponse { removed }))
}
