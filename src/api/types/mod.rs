//! HTTP request/response types

pub mod datasets;
pub mod error;
pub mod json;

pub use datasets::{
    DatasetInfoParams, DatasetInfoResponse, DatasetListResponse, FilterRequest, FilterResponse,
    HistoryParams, HistoryResponse, InvalidateResponse, ListParams, QueryRequest,
    DEFAULT_HISTORY_LIMIT,
};
pub use error::{ApiError, ErrorBody, ErrorKind};
pub use json::{Json, Path, Query};
