//! Catalog import from JSON documents

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::catalog::{CatalogStore, Dataset, SampleRecord};
use crate::domain::DomainError;

/// One dataset with its optional sample records
#[derive(Debug, Clone, Deserialize)]
pub struct ImportEntry {
    #[serde(flatten)]
    pub dataset: Dataset,
    #[serde(default)]
    pub samples: Option<Vec<SampleRecord>>,
}

/// Accepted document shapes: `{ "datasets": [...] }` or a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImportDocument {
    Wrapped { datasets: Vec<ImportEntry> },
    Bare(Vec<ImportEntry>),
}

impl ImportDocument {
    pub fn parse(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("Invalid catalog document: {}", e)))
    }

    pub fn into_entries(self) -> Vec<ImportEntry> {
        match self {
            Self::Wrapped { datasets } => datasets,
            Self::Bare(entries) => entries,
        }
    }
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub datasets: usize,
    pub sample_sets: usize,
    pub samples: usize,
}

/// Upserts every entry into the store
pub async fn import_entries(
    store: &dyn CatalogStore,
    entries: Vec<ImportEntry>,
) -> Result<ImportSummary, DomainError> {
    let mut summary = ImportSummary::default();

    for entry in entries {
        let mut dataset = entry.dataset;

        if let Some(samples) = entry.samples {
            if dataset.sample_count == 0 {
                dataset.sample_count = samples.len() as u64;
            }
            summary.sample_sets += 1;
            summary.samples += samples.len();
            store.upsert_samples(&dataset.id, samples).await?;
        }

        debug!(dataset_id = %dataset.id, "Importing dataset");
        store.upsert(dataset).await?;
        summary.datasets += 1;
    }

    Ok(summary)
}

/// Reads a JSON file and upserts its contents
pub async fn import_file(
    store: &dyn CatalogStore,
    path: impl AsRef<Path>,
) -> Result<ImportSummary, DomainError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::configuration(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let summary = import_entries(store, ImportDocument::parse(&content)?.into_entries()).await?;

    info!(
        path = %path.display(),
        datasets = summary.datasets,
        samples = summary.samples,
        "Catalog import complete"
    );

    Ok(summary)
}
