//! Dataset operations exposed to transports

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::domain::cache::CacheTier;
use crate::domain::catalog::filter::{self, SamplePage, SampleQuery, SortOrder};
use crate::domain::catalog::{Dataset, DatasetId, SampleFilter, SampleRecord};
use crate::domain::history::{HistoryStats, QueryRecord};
use crate::domain::query::{is_stop_word, tokenize, CanonicalQuery, ResultSet};
use crate::domain::DomainError;

use super::resolution_service::ResolutionService;

/// Default number of samples returned by a filter request
pub const DEFAULT_SAMPLE_LIMIT: usize = 10;

/// Upper bound on samples returned by a filter request
pub const MAX_SAMPLE_LIMIT: usize = 1000;

/// Samples shown when a dataset lookup asks for a preview
pub const DEFAULT_PREVIEW_SAMPLES: usize = 3;

/// Structured listing filters; bypasses the normalizer
#[derive(Debug, Clone, Default)]
pub struct ListDatasetsRequest {
    pub limit: usize,
    pub offset: usize,
    pub category: Option<String>,
    /// `all` is the same as no source
    pub source: Option<String>,
    /// Free words matched like query keywords
    pub search: Option<String>,
}

impl ListDatasetsRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn into_query(self) -> CanonicalQuery {
        let keywords = self
            .search
            .as_deref()
            .map(tokenize)
            .unwrap_or_default()
            .into_iter()
            .filter(|word| !is_stop_word(word));

        let mut query = CanonicalQuery::new(keywords, self.limit, self.offset);
        if let Some(category) = self.category {
            query = query.with_category(category);
        }
        if let Some(source) = self.source.filter(|s| !s.trim().eq_ignore_ascii_case("all")) {
            query = query.with_source(source);
        }

        query
    }
}

/// Parameters for `filter_samples`
#[derive(Debug, Clone, Default)]
pub struct FilterSamplesRequest {
    pub filters: Map<String, Value>,
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

impl FilterSamplesRequest {
    pub fn new(filters: Map<String, Value>) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn into_query(self) -> Result<SampleQuery, DomainError> {
        let filter = SampleFilter::from_json(&self.filters)?;
        let limit = match self.limit {
            None | Some(0) => DEFAULT_SAMPLE_LIMIT,
            Some(limit) => limit.min(MAX_SAMPLE_LIMIT),
        };

        let mut query = SampleQuery::new(filter, limit).with_offset(self.offset);
        if let Some(field) = self.sort_by {
            query = query.with_sort(field, self.sort_order);
        }

        Ok(query)
    }
}

/// Trait for the dataset operation surface (for dynamic dispatch in AppState)
#[async_trait]
pub trait DatasetServiceTrait: Send + Sync + Debug {
    /// Lists datasets in catalog order, bypassing normalization
    async fn list_datasets(&self, request: ListDatasetsRequest) -> Result<ResultSet, DomainError>;

    /// Looks a dataset up by id
    async fn get_dataset_info(&self, id: &str) -> Result<Dataset, DomainError>;

    /// First `limit` sample records of an existing dataset
    async fn preview_samples(&self, id: &str, limit: usize)
        -> Result<Vec<SampleRecord>, DomainError>;

    /// Resolves a natural-language query
    async fn query_dataset(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ResultSet, DomainError>;

    /// Applies field conditions to a dataset's sample records
    async fn filter_samples(
        &self,
        id: &str,
        request: FilterSamplesRequest,
    ) -> Result<SamplePage, DomainError>;

    async fn history_stats(&self) -> Result<HistoryStats, DomainError>;

    async fn recent_queries(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError>;

    /// Drops cached entries for a dataset id; returns the number of tiers touched
    async fn invalidate_dataset(&self, id: &str) -> Result<usize, DomainError>;

    /// Drops the cached result set for a text query
    async fn invalidate_query(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> Result<usize, DomainError>;

    /// Number of datasets in the catalog, used by readiness checks
    async fn catalog_size(&self) -> Result<usize, DomainError>;

    /// Entry count per cache tier, used by readiness checks
    async fn cache_sizes(&self) -> Vec<(CacheTier, Result<usize, DomainError>)>;
}

/// Dataset service backed by the resolution orchestrator
#[derive(Debug, Clone)]
pub struct DatasetService {
    resolver: ResolutionService,
}

impl DatasetService {
    pub fn new(resolver: ResolutionService) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ResolutionService {
        &self.resolver
    }

    fn parse_id(id: &str) -> Result<DatasetId, DomainError> {
        DatasetId::new(id)
    }

    async fn load_samples(&self, id: &DatasetId) -> Result<Vec<SampleRecord>, DomainError> {
        self.resolver.catalog().samples(id).await.map_err(|e| match e {
            DomainError::CatalogUnavailable { .. } => e,
            other => DomainError::catalog_unavailable(other.to_string()),
        })
    }

    fn require_text(text: &str) -> Result<(), DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::validation("Query text cannot be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl DatasetServiceTrait for DatasetService {
    #[instrument(skip(self))]
    async fn list_datasets(&self, request: ListDatasetsRequest) -> Result<ResultSet, DomainError> {
        self.resolver
            .resolve_canonical("", request.into_query())
            .await
    }

    #[instrument(skip(self))]
    async fn get_dataset_info(&self, id: &str) -> Result<Dataset, DomainError> {
        let id = Self::parse_id(id)?;
        self.resolver.resolve_by_id(&id).await
    }

    #[instrument(skip(self))]
    async fn preview_samples(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<SampleRecord>, DomainError> {
        let id = Self::parse_id(id)?;
        self.resolver.resolve_by_id(&id).await?;

        let mut samples = self.load_samples(&id).await?;
        samples.truncate(limit.min(MAX_SAMPLE_LIMIT));
        Ok(samples)
    }

    async fn query_dataset(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ResultSet, DomainError> {
        Self::require_text(text)?;
        self.resolver.resolve(text, limit, offset).await
    }

    #[instrument(skip(self, request))]
    async fn filter_samples(
        &self,
        id: &str,
        request: FilterSamplesRequest,
    ) -> Result<SamplePage, DomainError> {
        let id = Self::parse_id(id)?;
        let query = request.into_query()?;

        self.resolver.resolve_by_id(&id).await?;

        let samples = self.load_samples(&id).await?;

        Ok(filter::apply(samples, &query))
    }

    async fn history_stats(&self) -> Result<HistoryStats, DomainError> {
        match self.resolver.recorder() {
            Some(recorder) => recorder.stats().await,
            None => Ok(HistoryStats::default()),
        }
    }

    async fn recent_queries(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError> {
        match self.resolver.recorder() {
            Some(recorder) => recorder.recent(limit).await,
            None => Ok(Vec::new()),
        }
    }

    async fn invalidate_dataset(&self, id: &str) -> Result<usize, DomainError> {
        let id = Self::parse_id(id)?;
        Ok(self.resolver.invalidate_dataset(&id).await)
    }

    async fn invalidate_query(
        &self,
        text: &str,
        limit: usize,
        offset: usize,
    ) -> Result<usize, DomainError> {
        Self::require_text(text)?;
        Ok(self.resolver.invalidate_text(text, limit, offset).await)
    }

    async fn catalog_size(&self) -> Result<usize, DomainError> {
        self.resolver.catalog().count().await
    }

    async fn cache_sizes(&self) -> Vec<(CacheTier, Result<usize, DomainError>)> {
        self.resolver.tiers().sizes().await
    }
}
