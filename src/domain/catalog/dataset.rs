//! Dataset entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Maximum identifier length
pub const MAX_DATASET_ID_LENGTH: usize = 128;

/// A single sample row belonging to a dataset
pub type SampleRecord = serde_json::Map<String, serde_json::Value>;

/// Dataset identifier - alphanumeric plus `-`, `_` and `.`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetId(String);

impl DatasetId {
    /// Create a new DatasetId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        validate_dataset_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DatasetId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DatasetId> for String {
    fn from(id: DatasetId) -> Self {
        id.0
    }
}

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_dataset_id(id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::validation("Dataset id cannot be empty"));
    }

    if id.len() > MAX_DATASET_ID_LENGTH {
        return Err(DomainError::validation(format!(
            "Dataset id exceeds {} characters",
            MAX_DATASET_ID_LENGTH
        )));
    }

    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(DomainError::validation(format!(
            "Dataset id '{}' contains invalid character '{}'",
            id, c
        )));
    }

    Ok(())
}

/// Dataset metadata as held by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sample_count: u64,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Dataset {
    /// Creates a dataset with the given id and display name
    pub fn with_id(id: DatasetId, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name: display_name.into(),
            description: String::new(),
            source: String::new(),
            category: None,
            tags: Vec::new(),
            sample_count: 0,
            size_bytes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn try_new(
        id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self::with_id(DatasetId::new(id)?, display_name))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sample_count(mut self, count: u64) -> Self {
        self.sample_count = count;
        self
    }

    pub fn with_size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = size;
        self
    }

    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Lowercased text searched by keyword matching
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(
            self.id.as_str().len() + self.display_name.len() + self.description.len() + 32,
        );
        text.push_str(self.id.as_str());
        text.push('\n');
        text.push_str(&self.display_name);
        text.push('\n');
        text.push_str(&self.description);
        for tag in &self.tags {
            text.push('\n');
            text.push_str(tag);
        }
        text.to_lowercase()
    }
}

#[cfg(test)]
impl Dataset {
    /// Test helper; panics on an invalid id
    pub fn new(id: &str, display_name: &str) -> Self {
        Self::try_new(id, display_name).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dataset_ids() {
        assert!(DatasetId::new("coco-2017").is_ok());
        assert!(DatasetId::new("squad_v2.0").is_ok());
        assert!(DatasetId::new("MNIST").is_ok());
    }

    #[test]
    fn test_invalid_dataset_ids() {
        assert!(DatasetId::new("").is_err());
        assert!(DatasetId::new("has space").is_err());
        assert!(DatasetId::new("owner/name").is_err());
        assert!(DatasetId::new("a".repeat(MAX_DATASET_ID_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_dataset_id_deserialization_validates() {
        let ok: Result<DatasetId, _> = serde_json::from_str("\"imagenet\"");
        assert!(ok.is_ok());

        let bad: Result<DatasetId, _> = serde_json::from_str("\"bad id\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_dataset_builder() {
        let dataset = Dataset::new("coco", "COCO")
            .with_description("Common Objects in Context")
            .with_source("modelscope")
            .with_category("vision")
            .with_tags(["detection", "segmentation"])
            .with_sample_count(330_000)
            .with_size_bytes(25_000_000_000);

        assert_eq!(dataset.id.as_str(), "coco");
        assert_eq!(dataset.category.as_deref(), Some("vision"));
        assert_eq!(dataset.tags, vec!["detection", "segmentation"]);
        assert_eq!(dataset.sample_count, 330_000);
    }

    #[test]
    fn test_search_text_covers_all_fields() {
        let dataset = Dataset::new("coco", "COCO Captions")
            .with_description("Image CAPTIONING")
            .with_tags(["Vision"]);

        let text = dataset.search_text();
        assert!(text.contains("coco captions"));
        assert!(text.contains("image captioning"));
        assert!(text.contains("vision"));
    }

    #[test]
    fn test_dataset_deserialization_defaults() {
        let dataset: Dataset =
            serde_json::from_str(r#"{"id":"mnist","display_name":"MNIST"}"#).unwrap();

        assert_eq!(dataset.sample_count, 0);
        assert!(dataset.tags.is_empty());
        assert!(dataset.category.is_none());
    }
}
