//! Query normalization: raw text to canonical query

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::CanonicalQuery;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Words dropped from the understood path before building keywords
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "up", "about", "into", "through", "during", "before", "after", "above", "below",
        "between", "among", "dataset", "datasets", "data", "all", "some", "any", "that", "this",
        "these", "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us",
        "them", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "will", "would", "could", "should", "may", "might", "must", "can",
        "cannot",
    ]
    .into_iter()
    .collect()
});

/// What the user is trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ListDatasets,
    SearchDatasets,
    GetDatasetInfo,
    FilterSamples,
    CompareDatasets,
    RecommendDatasets,
    GetStatistics,
    Unknown,
}

impl Intent {
    /// Parses an intent label, mapping anything unrecognized to `Unknown`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "list_datasets" | "list" => Self::ListDatasets,
            "search_datasets" | "search" => Self::SearchDatasets,
            "get_dataset_info" | "info" => Self::GetDatasetInfo,
            "filter_samples" | "filter" => Self::FilterSamples,
            "compare_datasets" | "compare" => Self::CompareDatasets,
            "recommend_datasets" | "recommend" => Self::RecommendDatasets,
            "get_statistics" | "statistics" => Self::GetStatistics,
            _ => Self::Unknown,
        }
    }
}

/// Kind of entity an extractor can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Keyword,
    Category,
    Task,
    Language,
    Dataset,
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub value: String,
}

impl Entity {
    pub fn new(kind: EntityKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Output of an intent extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub intent: Intent,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub confidence: f32,
}

impl Extraction {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            entities: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn with_entity(mut self, kind: EntityKind, value: impl Into<String>) -> Self {
        self.entities.push(Entity::new(kind, value));
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// First entity value of the given kind
    pub fn first(&self, kind: EntityKind) -> Option<&str> {
        self.entities
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.value.as_str())
    }

    pub fn all(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.entities
            .iter()
            .filter(move |e| e.kind == kind)
            .map(|e| e.value.as_str())
    }
}

/// Capability to classify intent and extract entities from free text
///
/// Fails with `IntentUnresolved` when the text cannot be classified and
/// `ServiceUnavailable` when the backing service cannot be reached.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Extraction, DomainError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Turns raw text into a `CanonicalQuery`
#[derive(Clone)]
pub struct QueryNormalizer {
    extractor: Arc<dyn IntentExtractor>,
}

impl fmt::Debug for QueryNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryNormalizer")
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

impl QueryNormalizer {
    pub fn new(extractor: Arc<dyn IntentExtractor>) -> Self {
        Self { extractor }
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Normalizes through the extractor; fails when it cannot understand the text
    pub async fn normalize(
        &self,
        raw: &str,
        limit: usize,
        offset: usize,
    ) -> Result<CanonicalQuery, DomainError> {
        let extraction = self.extractor.extract(raw).await?;

        if extraction.intent == Intent::Unknown {
            return Err(DomainError::intent_unresolved(format!(
                "No intent recognized for '{}'",
                raw
            )));
        }

        Ok(canonicalize(raw, &extraction, limit, offset))
    }

    /// Degraded keyword-only normalization; never fails
    pub fn fallback(raw: &str, limit: usize, offset: usize) -> CanonicalQuery {
        CanonicalQuery::new(tokenize(raw), limit, offset).degraded()
    }
}

/// Applies the fixed ruleset to an extractor response
pub fn canonicalize(
    raw: &str,
    extraction: &Extraction,
    limit: usize,
    offset: usize,
) -> CanonicalQuery {
    let text_keywords = tokenize(raw)
        .into_iter()
        .filter(|token| !STOP_WORDS.contains(token.as_str()));

    let entity_keywords = extraction
        .all(EntityKind::Keyword)
        .flat_map(tokenize)
        .collect::<Vec<_>>();

    let mut query = CanonicalQuery::new(text_keywords.chain(entity_keywords), limit, offset);

    if let Some(category) = extraction.first(EntityKind::Category) {
        query = query.with_category(category);
    }
    if let Some(task) = extraction.first(EntityKind::Task) {
        query = query.with_task_type(task);
    }
    if let Some(language) = extraction.first(EntityKind::Language) {
        query = query.with_language(language);
    }

    query
}

/// Splits on anything that is not alphanumeric, `_` or `-`, lowercasing each token
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .map(|token| token.trim_matches('-'))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}
