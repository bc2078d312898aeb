//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::DatasetServiceTrait;

/// Application state holding services behind dynamic dispatch
#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset_service: Arc<dyn DatasetServiceTrait>,
}

impl AppState {
    pub fn new(dataset_service: Arc<dyn DatasetServiceTrait>) -> Self {
        Self { dataset_service }
    }
}
