//! Request and response bodies for dataset endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::catalog::{Dataset, SamplePage, SampleRecord, SortOrder};
use crate::domain::history::QueryRecord;
use crate::domain::query::{CanonicalQuery, ResultSet, ServedBy, DEFAULT_LIMIT};
use crate::infrastructure::services::{
    FilterSamplesRequest, ListDatasetsRequest, DEFAULT_PREVIEW_SAMPLES,
};

/// Default page size for `GET /admin/history`
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// `GET /v1/datasets?limit=&offset=&category=&source=&search=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub category: Option<String>,
    pub source: Option<String>,
    pub search: Option<String>,
}

impl From<ListParams> for ListDatasetsRequest {
    fn from(params: ListParams) -> Self {
        let mut request = ListDatasetsRequest::new(
            params.limit.unwrap_or(DEFAULT_LIMIT),
            params.offset.unwrap_or(0),
        );
        request.category = params.category.filter(|c| !c.trim().is_empty());
        request.source = params.source.filter(|s| !s.trim().is_empty());
        request.search = params.search.filter(|s| !s.trim().is_empty());
        request
    }
}

/// `GET /v1/datasets/{id}?include_samples=&sample_limit=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetInfoParams {
    #[serde(default)]
    pub include_samples: bool,
    pub sample_limit: Option<usize>,
}

impl DatasetInfoParams {
    pub fn sample_limit(&self) -> usize {
        self.sample_limit.unwrap_or(DEFAULT_PREVIEW_SAMPLES)
    }
}

/// Dataset metadata, plus a sample preview when one was asked for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfoResponse {
    #[serde(flatten)]
    pub dataset: Dataset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<SampleRecord>>,
}

/// Free-text query body, shared by `/v1/query` and query invalidation
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub text: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl QueryRequest {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// A page of datasets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetListResponse {
    pub object: String,
    pub data: Vec<Dataset>,
    pub total: usize,
    pub served_by: ServedBy,
    pub query: CanonicalQuery,
}

impl From<ResultSet> for DatasetListResponse {
    fn from(result: ResultSet) -> Self {
        Self {
            object: "list".to_string(),
            data: result.datasets,
            total: result.total,
            served_by: result.served_by,
            query: result.query,
        }
    }
}

/// Body of `POST /v1/datasets/{id}/samples/filter`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub filters: Map<String, Value>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

impl From<FilterRequest> for FilterSamplesRequest {
    fn from(request: FilterRequest) -> Self {
        Self {
            filters: request.filters,
            limit: request.limit,
            offset: request.offset,
            sort_by: request.sort_by,
            sort_order: request.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    pub dataset_id: String,
    #[serde(flatten)]
    pub page: SamplePage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub object: String,
    pub data: Vec<QueryRecord>,
}

impl From<Vec<QueryRecord>> for HistoryResponse {
    fn from(records: Vec<QueryRecord>) -> Self {
        Self {
            object: "list".to_string(),
            data: records,
        }
    }
}

/// Number of cache tiers an invalidation removed an entry from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}
