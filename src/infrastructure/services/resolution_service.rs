//! Resolution orchestrator: normalizer, cache tiers, catalog and history

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::cache::{CacheKeyGenerator, CacheTier};
use crate::domain::catalog::{CatalogStore, Dataset, DatasetId};
use crate::domain::history::{QueryRecord, ResolutionStatus};
use crate::domain::query::{CanonicalQuery, CatalogPage, QueryNormalizer, ResultSet, ServedBy};
use crate::domain::DomainError;
use crate::infrastructure::cache::{CacheConfig, TieredCache};
use crate::infrastructure::history::HistoryRecorder;

/// TTL policies applied on top of per-tier defaults
#[derive(Debug, Clone, Default)]
pub struct ResolutionConfig {
    /// Caps backfill TTL for queries normalized by the keyword fallback
    pub degraded_ttl: Option<Duration>,
    /// Caches unknown dataset ids for this long when set
    pub negative_ttl: Option<Duration>,
}

impl ResolutionConfig {
    pub fn from_cache_config(config: &CacheConfig) -> Self {
        Self {
            degraded_ttl: config.degraded_ttl(),
            negative_ttl: config.negative_ttl(),
        }
    }

    pub fn with_degraded_ttl(mut self, ttl: Duration) -> Self {
        self.degraded_ttl = Some(ttl);
        self
    }

    pub fn with_negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = Some(ttl);
        self
    }
}

/// Cached outcome of a lookup by id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "dataset", rename_all = "snake_case")]
enum DatasetLookup {
    Found(Dataset),
    Missing,
}

/// Entry owed to the tiers that missed during a lookup
#[derive(Debug)]
struct Backfill<T> {
    key: String,
    value: T,
    tiers: Vec<CacheTier>,
    cap: Option<Duration>,
}

impl<T> Backfill<T> {
    /// `None` when no tier missed
    fn new(key: &str, value: T, tiers: Vec<CacheTier>, cap: Option<Duration>) -> Option<Self> {
        (!tiers.is_empty()).then(|| Self {
            key: key.to_string(),
            value,
            tiers,
            cap,
        })
    }
}

/// Resolves free-text queries and dataset ids through the cache tiers
///
/// Tier walks stop at the first unexpired entry. Tiers that missed are
/// backfilled on spawned tasks so the writes complete even when the caller
/// goes away. Every text resolution emits a query record.
#[derive(Debug, Clone)]
pub struct ResolutionService {
    normalizer: QueryNormalizer,
    tiers: Arc<TieredCache>,
    catalog: Arc<dyn CatalogStore>,
    keys: Arc<dyn CacheKeyGenerator>,
    recorder: Option<HistoryRecorder>,
    config: ResolutionConfig,
}

impl ResolutionService {
    pub fn new(
        normalizer: QueryNormalizer,
        tiers: TieredCache,
        catalog: Arc<dyn CatalogStore>,
        keys: Arc<dyn CacheKeyGenerator>,
    ) -> Self {
        Self {
            normalizer,
            tiers: Arc::new(tiers),
            catalog,
            keys,
            recorder: None,
            config: ResolutionConfig::default(),
        }
    }

    pub fn with_recorder(mut self, recorder: HistoryRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_config(mut self, config: ResolutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn normalizer(&self) -> &QueryNormalizer {
        &self.normalizer
    }

    pub fn tiers(&self) -> &TieredCache {
        &self.tiers
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    pub fn recorder(&self) -> Option<&HistoryRecorder> {
        self.recorder.as_ref()
    }

    /// Resolves free text into a page of datasets
    #[instrument(skip(self), fields(extractor = self.normalizer.extractor_name()))]
    pub async fn resolve(
        &self,
        raw: &str,
        limit: usize,
        offset: usize,
    ) -> Result<ResultSet, DomainError> {
        let query = self.normalize(raw, limit, offset).await;
        self.resolve_canonical(raw, query).await
    }

    /// Resolves an already canonical query, skipping normalization
    ///
    /// The query record is handed to the recorder before any backfill is
    /// awaited, so a caller that goes away mid-backfill still leaves a record.
    pub async fn resolve_canonical(
        &self,
        raw: &str,
        query: CanonicalQuery,
    ) -> Result<ResultSet, DomainError> {
        let started = Instant::now();
        let key = self.keys.query_key(&query);

        let (result, pending) = match self.resolve_query(&query, &key).await {
            Ok((result_set, pending)) => (Ok(result_set), pending),
            Err(e) => (Err(e), None),
        };

        let served_by = match &result {
            Ok(result_set) => result_set.served_by.as_str(),
            Err(_) => "failed",
        };
        metrics::histogram!("catalog_resolve_duration_seconds", "served_by" => served_by)
            .record(started.elapsed().as_secs_f64());

        self.emit(raw, query, key, &result, started.elapsed());

        if let Some(pending) = pending {
            self.backfill(pending).await;
        }
        result
    }

    async fn normalize(&self, raw: &str, limit: usize, offset: usize) -> CanonicalQuery {
        match self.normalizer.normalize(raw, limit, offset).await {
            Ok(query) => query,
            Err(e) => {
                let reason = match &e {
                    DomainError::IntentUnresolved { .. } => "unresolved",
                    DomainError::ServiceUnavailable { .. } => "unavailable",
                    _ => "error",
                };
                metrics::counter!("catalog_normalizer_fallbacks_total", "reason" => reason)
                    .increment(1);
                warn!(error = %e, reason, "Normalizer failed, using keyword fallback");

                QueryNormalizer::fallback(raw, limit, offset)
            }
        }
    }

    /// Walks the tiers, then the catalog; returns the writes still owed to missed tiers
    async fn resolve_query(
        &self,
        query: &CanonicalQuery,
        key: &str,
    ) -> Result<(ResultSet, Option<Backfill<CatalogPage>>), DomainError> {
        let lookup = self.tiers.lookup::<CatalogPage>(key).await;

        if let Some((tier, entry)) = lookup.hit {
            let remaining = entry.remaining_ttl();
            let page = entry.into_value();
            let pending = Backfill::new(key, page.clone(), lookup.missed, Some(remaining));

            return Ok((ResultSet::from_page(query.clone(), page, tier.into()), pending));
        }

        let page = self.catalog.find(query).await.map_err(as_catalog_unavailable)?;
        debug!(key = %key, total = page.total, "Resolved from catalog");

        let cap = if query.is_degraded() {
            self.config.degraded_ttl
        } else {
            None
        };
        let pending = Backfill::new(key, page.clone(), lookup.missed, cap);

        Ok((ResultSet::from_page(query.clone(), page, ServedBy::Catalog), pending))
    }

    /// Looks a dataset up by id; an unknown id is `NotFound`
    #[instrument(skip(self, id), fields(dataset_id = %id))]
    pub async fn resolve_by_id(&self, id: &DatasetId) -> Result<Dataset, DomainError> {
        let key = self.keys.dataset_key(id);
        let lookup = self.tiers.lookup::<DatasetLookup>(&key).await;

        if let Some((_, entry)) = lookup.hit {
            let remaining = entry.remaining_ttl();
            let value = entry.into_value();
            if let Some(pending) =
                Backfill::new(&key, value.clone(), lookup.missed, Some(remaining))
            {
                self.backfill(pending).await;
            }

            return match value {
                DatasetLookup::Found(dataset) => Ok(dataset),
                DatasetLookup::Missing => Err(not_found(id)),
            };
        }

        match self.catalog.get(id).await.map_err(as_catalog_unavailable)? {
            Some(dataset) => {
                let found = DatasetLookup::Found(dataset.clone());
                if let Some(pending) = Backfill::new(&key, found, lookup.missed, None) {
                    self.backfill(pending).await;
                }
                Ok(dataset)
            }
            None => {
                let pending = self.config.negative_ttl.and_then(|ttl| {
                    Backfill::new(&key, DatasetLookup::Missing, lookup.missed, Some(ttl))
                });
                if let Some(pending) = pending {
                    self.backfill(pending).await;
                }
                Err(not_found(id))
            }
        }
    }

    /// Drops a dataset's cached entry from every tier
    pub async fn invalidate_dataset(&self, id: &DatasetId) -> usize {
        self.tiers.invalidate(&self.keys.dataset_key(id)).await
    }

    /// Drops a canonical query's cached result set from every tier
    pub async fn invalidate_query(&self, query: &CanonicalQuery) -> usize {
        self.tiers.invalidate(&self.keys.query_key(query)).await
    }

    /// Normalizes text the same way `resolve` does and drops its entry
    pub async fn invalidate_text(&self, raw: &str, limit: usize, offset: usize) -> usize {
        let query = self.normalize(raw, limit, offset).await;
        self.invalidate_query(&query).await
    }

    /// Writes owed entries on spawned tasks
    ///
    /// The memory write is awaited so the next call in this process hits it.
    /// Shared-tier writes are detached and never delay the response; another
    /// instance may miss until they land.
    async fn backfill<T>(&self, pending: Backfill<T>)
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let Backfill {
            key,
            value,
            tiers,
            cap,
        } = pending;
        let (local, remote): (Vec<CacheTier>, Vec<CacheTier>) =
            tiers.into_iter().partition(|tier| *tier == CacheTier::Memory);

        if !remote.is_empty() {
            let cache = Arc::clone(&self.tiers);
            let (key, value) = (key.clone(), value.clone());
            tokio::spawn(async move { cache.backfill(&key, &value, &remote, cap).await });
        }

        if !local.is_empty() {
            let cache = Arc::clone(&self.tiers);
            let task =
                tokio::spawn(async move { cache.backfill(&key, &value, &local, cap).await });

            if let Err(e) = task.await {
                warn!(error = %e, "Cache backfill task failed");
            }
        }
    }

    fn emit(
        &self,
        raw: &str,
        query: CanonicalQuery,
        key: String,
        result: &Result<ResultSet, DomainError>,
        elapsed: Duration,
    ) {
        let Some(recorder) = &self.recorder else {
            return;
        };

        let (status, count) = match result {
            Ok(result_set) => (ResolutionStatus::from(result_set.served_by), result_set.len()),
            Err(_) => (ResolutionStatus::Failed, 0),
        };

        recorder.record(
            QueryRecord::new(raw, query, key, status)
                .with_elapsed_ms(elapsed.as_millis().min(u64::MAX as u128) as u64)
                .with_result_count(count),
        );
    }
}

fn not_found(id: &DatasetId) -> DomainError {
    DomainError::not_found(format!("Dataset '{}' does not exist", id))
}

fn as_catalog_unavailable(error: DomainError) -> DomainError {
    match error {
        DomainError::CatalogUnavailable { .. } => error,
        other => DomainError::catalog_unavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{CacheEntry, MockCache, Sha256KeyGenerator};
    use crate::domain::catalog::MockCatalogStore;
    use crate::domain::query::{EntityKind, Extraction, Intent, MockIntentExtractor};
    use crate::infrastructure::cache::{InMemoryCache, NoopCache, TierSlot};
    use crate::infrastructure::history::InMemoryHistoryRepository;

    fn datasets() -> Vec<Dataset> {
        vec![
            Dataset::new("imagenet-1k", "ImageNet 1K")
                .with_description("Large scale image classification benchmark")
                .with_category("vision")
                .with_tags(["image", "classification"])
                .with_sample_count(1_281_167),
            Dataset::new("cifar-10", "CIFAR-10")
                .with_description("Small image classification dataset")
                .with_category("vision")
                .with_sample_count(60_000),
            Dataset::new("coco", "COCO")
                .with_description("Object detection and segmentation")
                .with_category("vision")
                .with_sample_count(330_000),
            Dataset::new("squad", "SQuAD")
                .with_description("Reading comprehension")
                .with_category("nlp"),
        ]
    }

    fn catalog() -> Arc<MockCatalogStore> {
        Arc::new(MockCatalogStore::new().with_datasets(datasets()))
    }

    fn understood_extractor() -> MockIntentExtractor {
        let mut extractor = MockIntentExtractor::new();
        extractor.expect_name().return_const("mock");
        extractor.expect_extract().returning(|_| {
            Ok(Extraction::new(Intent::SearchDatasets).with_entity(EntityKind::Task, "classification"))
        });
        extractor
    }

    fn unreachable_extractor() -> MockIntentExtractor {
        let mut extractor = MockIntentExtractor::new();
        extractor.expect_name().return_const("mock");
        extractor
            .expect_extract()
            .returning(|_| Err(DomainError::service_unavailable("intent", "connection refused")));
        extractor
    }

    fn tiers(memory: Arc<MockCache>, shared: Arc<MockCache>) -> TieredCache {
        TieredCache::new(vec![
            TierSlot::new(CacheTier::Memory, memory, Duration::from_secs(300)),
            TierSlot::new(CacheTier::Shared, shared, Duration::from_secs(1800)),
        ])
    }

    fn service(
        extractor: MockIntentExtractor,
        tiers: TieredCache,
        catalog: Arc<MockCatalogStore>,
    ) -> ResolutionService {
        ResolutionService::new(
            QueryNormalizer::new(Arc::new(extractor)),
            tiers,
            catalog,
            Arc::new(Sha256KeyGenerator::default()),
        )
    }

    #[tokio::test]
    async fn test_first_call_misses_then_memory_serves() {
        let memory = Arc::new(MockCache::new());
        let shared = Arc::new(MockCache::new());
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), shared.clone()),
            catalog.clone(),
        );

        let first = service
            .resolve("find image classification datasets", 5, 0)
            .await
            .unwrap();

        assert_eq!(first.served_by, ServedBy::Catalog);
        assert_eq!(first.query.keywords(), ["classification", "find", "image"]);
        assert_eq!(first.query.limit(), 5);
        assert_eq!(catalog.find_calls(), 1);
        assert_eq!(memory.keys().len(), 1);
        assert_eq!(shared.keys().len(), 1);
        assert_eq!(memory.ttl_of(&memory.keys()[0]), Some(Duration::from_secs(300)));
        assert_eq!(shared.ttl_of(&shared.keys()[0]), Some(Duration::from_secs(1800)));

        let second = service
            .resolve("find image classification datasets", 5, 0)
            .await
            .unwrap();

        assert_eq!(second.served_by, ServedBy::Memory);
        assert_eq!(catalog.find_calls(), 1);
        assert_eq!(second.query, first.query);
        assert_eq!(second.datasets, first.datasets);
        assert_eq!(second.total, first.total);
    }

    #[tokio::test]
    async fn test_word_order_shares_cache_entry() {
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(Arc::new(MockCache::new()), Arc::new(MockCache::new())),
            catalog.clone(),
        );

        service.resolve("image classification", 10, 0).await.unwrap();
        let reordered = service.resolve("classification image", 10, 0).await.unwrap();

        assert_eq!(reordered.served_by, ServedBy::Memory);
        assert_eq!(catalog.find_calls(), 1);
    }

    #[tokio::test]
    async fn test_shared_hit_backfills_memory_with_remaining_ttl() {
        let query = CanonicalQuery::new(["classification", "image"], 10, 0)
            .with_task_type("classification");
        let key = Sha256KeyGenerator::default().query_key(&query);
        let page = CatalogPage::new(vec![Dataset::new("cifar-10", "CIFAR-10")], 1);
        let entry = CacheEntry::new(page, Duration::from_secs(20), Duration::from_secs(1));

        let memory = Arc::new(MockCache::new());
        let shared = Arc::new(
            MockCache::new().with_raw_entry(&key, &serde_json::to_string(&entry).unwrap()),
        );
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), shared.clone()),
            catalog.clone(),
        );

        let result = service.resolve("image classification", 10, 0).await.unwrap();

        assert_eq!(result.served_by, ServedBy::Shared);
        assert_eq!(result.datasets[0].id.as_str(), "cifar-10");
        assert_eq!(catalog.find_calls(), 0);

        let ttl = memory.ttl_of(&key).unwrap();
        assert!(ttl <= Duration::from_secs(20));
        assert!(ttl > Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_unreachable_normalizer_falls_back() {
        let catalog = catalog();
        let service = service(
            unreachable_extractor(),
            tiers(Arc::new(MockCache::new()), Arc::new(MockCache::new())),
            catalog.clone(),
        );

        let result = service.resolve("中文 文本分类", 10, 0).await.unwrap();

        assert!(result.query.is_degraded());
        assert_eq!(result.query.keywords(), ["中文", "文本分类"]);
        assert!(result.is_empty());
        assert_eq!(result.served_by, ServedBy::Catalog);
    }

    #[tokio::test]
    async fn test_degraded_ttl_caps_backfill() {
        let memory = Arc::new(MockCache::new());
        let service = service(
            unreachable_extractor(),
            tiers(memory.clone(), Arc::new(MockCache::new())),
            catalog(),
        )
        .with_config(ResolutionConfig::default().with_degraded_ttl(Duration::from_secs(30)));

        service.resolve("imagenet", 10, 0).await.unwrap();

        let key = memory.keys().pop().unwrap();
        assert_eq!(memory.ttl_of(&key), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_disabling_shared_tier_keeps_results() {
        // One dataset set for both catalogs so timestamps compare equal
        let shared_datasets = datasets();
        let with_shared = service(
            understood_extractor(),
            tiers(Arc::new(MockCache::new()), Arc::new(MockCache::new())),
            Arc::new(MockCatalogStore::new().with_datasets(shared_datasets.clone())),
        );
        let without_shared = service(
            understood_extractor(),
            TieredCache::new(vec![
                TierSlot::new(
                    CacheTier::Memory,
                    Arc::new(InMemoryCache::new()),
                    Duration::from_secs(300),
                ),
                TierSlot::new(CacheTier::Shared, Arc::new(NoopCache::new()), Duration::from_secs(1800)),
            ]),
            Arc::new(MockCatalogStore::new().with_datasets(shared_datasets)),
        );

        for _ in 0..2 {
            let a = with_shared.resolve("image classification", 3, 0).await.unwrap();
            let b = without_shared.resolve("image classification", 3, 0).await.unwrap();

            assert_eq!(a.datasets, b.datasets);
            assert_eq!(a.total, b.total);
            assert_eq!(a.query, b.query);
        }
    }

    #[tokio::test]
    async fn test_broken_tiers_fall_through_to_catalog() {
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(
                Arc::new(MockCache::new().with_error("memory broken")),
                Arc::new(MockCache::new().with_error("redis down")),
            ),
            catalog.clone(),
        );

        let result = service.resolve("image classification", 10, 0).await.unwrap();

        assert_eq!(result.served_by, ServedBy::Catalog);
        assert!(!result.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_without_cache_is_unavailable() {
        let catalog = Arc::new(MockCatalogStore::new().with_error("connection reset"));
        let service = service(
            understood_extractor(),
            tiers(Arc::new(MockCache::new()), Arc::new(MockCache::new())),
            catalog,
        );

        let result = service.resolve("image classification", 10, 0).await;

        assert!(matches!(result, Err(DomainError::CatalogUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_cached_result_survives_catalog_failure() {
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(Arc::new(MockCache::new()), Arc::new(MockCache::new())),
            catalog.clone(),
        );

        service.resolve("image classification", 10, 0).await.unwrap();
        catalog.set_error(Some("connection reset".to_string()));

        let result = service.resolve("image classification", 10, 0).await.unwrap();
        assert_eq!(result.served_by, ServedBy::Memory);
    }

    #[tokio::test]
    async fn test_resolve_by_id_caches_found_dataset() {
        let memory = Arc::new(MockCache::new());
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), Arc::new(MockCache::new())),
            catalog.clone(),
        );
        let id = DatasetId::new("coco").unwrap();

        assert_eq!(service.resolve_by_id(&id).await.unwrap().display_name, "COCO");
        assert_eq!(service.resolve_by_id(&id).await.unwrap().display_name, "COCO");

        assert_eq!(catalog.get_calls(), 1);
        assert_eq!(memory.keys(), vec!["catalog:dataset:coco".to_string()]);
    }

    #[tokio::test]
    async fn test_resolve_by_id_unknown_leaves_no_placeholder() {
        let memory = Arc::new(MockCache::new());
        let shared = Arc::new(MockCache::new());
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), shared.clone()),
            catalog.clone(),
        );
        let id = DatasetId::new("nonexistent").unwrap();

        let result = service.resolve_by_id(&id).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert!(memory.keys().is_empty());
        assert!(shared.keys().is_empty());
    }

    #[tokio::test]
    async fn test_negative_caching_uses_shorter_ttl() {
        let memory = Arc::new(MockCache::new());
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), Arc::new(MockCache::new())),
            catalog.clone(),
        )
        .with_config(ResolutionConfig::default().with_negative_ttl(Duration::from_secs(10)));
        let id = DatasetId::new("nonexistent").unwrap();

        assert!(service.resolve_by_id(&id).await.is_err());
        assert!(matches!(
            service.resolve_by_id(&id).await,
            Err(DomainError::NotFound { .. })
        ));

        assert_eq!(catalog.get_calls(), 1);
        assert_eq!(
            memory.ttl_of("catalog:dataset:nonexistent"),
            Some(Duration::from_secs(10))
        );
    }

    #[tokio::test]
    async fn test_invalidate_dataset() {
        let memory = Arc::new(MockCache::new());
        let catalog = catalog();
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), Arc::new(MockCache::new())),
            catalog.clone(),
        );
        let id = DatasetId::new("coco").unwrap();

        service.resolve_by_id(&id).await.unwrap();
        assert_eq!(service.invalidate_dataset(&id).await, 2);
        service.resolve_by_id(&id).await.unwrap();

        assert_eq!(catalog.get_calls(), 2);
    }

    #[tokio::test]
    async fn test_records_history() {
        let recorder = HistoryRecorder::spawn(Arc::new(InMemoryHistoryRepository::default()), 16);
        let service = service(
            understood_extractor(),
            tiers(Arc::new(MockCache::new()), Arc::new(MockCache::new())),
            catalog(),
        )
        .with_recorder(recorder.clone());

        service.resolve("image classification", 10, 0).await.unwrap();
        service.resolve("image classification", 10, 0).await.unwrap();
        recorder.flush().await.unwrap();

        let stats = recorder.stats().await.unwrap();
        assert_eq!(stats.total_queries, 2);
        assert_eq!(stats.by_status.get("miss"), Some(&1));
        assert_eq!(stats.by_status.get("memory_hit"), Some(&1));
        assert_eq!(stats.by_canonical.len(), 1);
    }

    #[tokio::test]
    async fn test_record_survives_caller_dropping_mid_backfill() {
        let recorder = HistoryRecorder::spawn(Arc::new(InMemoryHistoryRepository::default()), 16);
        let memory = Arc::new(MockCache::new().with_delay(Duration::from_millis(200)));
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), Arc::new(MockCache::new())),
            catalog(),
        )
        .with_recorder(recorder.clone());

        // Lookup takes ~200ms, the memory write another ~200ms
        let call = tokio::spawn(async move { service.resolve("image classification", 10, 0).await });
        tokio::time::sleep(Duration::from_millis(300)).await;
        call.abort();
        assert!(call.await.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_millis(300)).await;
        recorder.flush().await.unwrap();

        assert_eq!(recorder.count().await.unwrap(), 1);
        assert_eq!(memory.keys().len(), 1);
    }

    #[tokio::test]
    async fn test_slow_shared_write_does_not_delay_response() {
        let memory = Arc::new(MockCache::new());
        let shared = Arc::new(MockCache::new().with_write_delay(Duration::from_millis(500)));
        let service = service(
            understood_extractor(),
            tiers(memory.clone(), shared.clone()),
            catalog(),
        );

        let started = std::time::Instant::now();
        let result = service.resolve("image classification", 10, 0).await.unwrap();

        assert_eq!(result.served_by, ServedBy::Catalog);
        assert!(started.elapsed() < Duration::from_millis(250));
        assert_eq!(memory.keys().len(), 1);
        assert!(shared.keys().is_empty());

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(shared.keys().len(), 1);
    }
}
