//! Infrastructure services

mod dataset_service;
mod resolution_service;

pub use dataset_service::{
    DatasetService, DatasetServiceTrait, FilterSamplesRequest, ListDatasetsRequest,
    DEFAULT_PREVIEW_SAMPLES, DEFAULT_SAMPLE_LIMIT, MAX_SAMPLE_LIMIT,
};
pub use resolution_service::{ResolutionConfig, ResolutionService};
