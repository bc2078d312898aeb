//! Natural-language query endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, DatasetListResponse, Json, QueryRequest};

/// POST /v1/query
pub async fn query_datasets(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<DatasetListResponse>, ApiError> {
    debug!(limit = request.limit(), "Resolving query");

    let result = state
        .dataset_service
        .query_dataset(&request.text, request.limit(), request.offset())
        .await?;

    Ok(Json(result.into()))
}
