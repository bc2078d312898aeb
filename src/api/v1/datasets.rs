//! Dataset endpoint handlers

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{
    ApiError, DatasetInfoParams, DatasetInfoResponse, DatasetListResponse, FilterRequest,
    FilterResponse, Json, ListParams, Path, Query,
};

/// GET /v1/datasets
pub async fn list_datasets(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<DatasetListResponse>, ApiError> {
    debug!(
        limit = ?params.limit,
        offset = ?params.offset,
        category = ?params.category,
        source = ?params.source,
        "Listing datasets"
    );

    let result = state.dataset_service.list_datasets(params.into()).await?;

    Ok(Json(result.into()))
}

/// GET /v1/datasets/{dataset_id}
pub async fn get_dataset(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
    Query(params): Query<DatasetInfoParams>,
) -> Result<Json<DatasetInfoResponse>, ApiError> {
    debug!(dataset_id = %dataset_id, include_samples = params.include_samples, "Getting dataset");

    let service = &state.dataset_service;
    let dataset = service.get_dataset_info(&dataset_id).await?;
    let samples = if params.include_samples {
        Some(service.preview_samples(&dataset_id, params.sample_limit()).await?)
    } else {
        None
    };

    Ok(Json(DatasetInfoResponse { dataset, samples }))
}

/// POST /v1/datasets/{dataset_id}/samples/filter
pub async fn filter_samples(
    State(state): State<AppState>,
    Path(dataset_id): Path<String>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<FilterResponse>, ApiError> {
    debug!(dataset_id = %dataset_id, fields = request.filters.len(), "Filtering samples");

    let page = state
        .dataset_service
        .filter_samples(&dataset_id, request.into())
        .await?;

    Ok(Json(FilterResponse { dataset_id, page }))
}
