//! Canonical query representation

use serde::{Deserialize, Serialize};

/// Default number of results when the caller does not specify a limit
pub const DEFAULT_LIMIT: usize = 10;

/// Upper bound on a single page of results
pub const MAX_LIMIT: usize = 100;

/// Normalized, order-independent form of a search request
///
/// Keywords are always stored sorted and deduplicated so that two requests
/// differing only in word order produce equal values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalQuery {
    keywords: Vec<String>,
    category: Option<String>,
    task_type: Option<String>,
    language: Option<String>,
    /// Set only by structured listings, never by text normalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    limit: usize,
    offset: usize,
    /// Produced by the keyword-only fallback; not part of the cache key
    #[serde(default)]
    degraded: bool,
}

/// Fixed-order projection of the fields that identify a query
#[derive(Serialize)]
struct KeyFields<'a> {
    keywords: &'a [String],
    category: Option<&'a str>,
    task_type: Option<&'a str>,
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    limit: usize,
    offset: usize,
}

impl CanonicalQuery {
    /// Creates a query from keywords; they are lowercased, sorted and deduplicated
    pub fn new<I, S>(keywords: I, limit: usize, offset: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.into().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        keywords.sort();
        keywords.dedup();

        Self {
            keywords,
            category: None,
            task_type: None,
            language: None,
            source: None,
            limit: clamp_limit(limit),
            offset,
            degraded: false,
        }
    }

    /// Query matching every dataset, used for plain listings
    pub fn match_all(limit: usize, offset: usize) -> Self {
        Self::new(Vec::<String>::new(), limit, offset)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = normalize_tag(category.into());
        self
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = normalize_tag(task_type.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = normalize_tag(language.into());
        self
    }

    /// Restricts matches to datasets from one source, e.g. `huggingface`
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = normalize_tag(source.into());
        self
    }

    /// Marks the query as produced by the degraded keyword-only path
    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn task_type(&self) -> Option<&str> {
        self.task_type.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Terms that contribute to relevance scoring: keywords, task type, language
    pub fn match_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.keywords.iter().map(String::as_str).collect();

        for slot in [self.task_type.as_deref(), self.language.as_deref()]
            .into_iter()
            .flatten()
        {
            if !terms.contains(&slot) {
                terms.push(slot);
            }
        }

        terms
    }

    /// Stable serialization of the identifying fields in a fixed order
    ///
    /// Used both as the cache key input and as the grouping key for history
    /// statistics. The `degraded` flag is intentionally excluded.
    pub fn canonical_form(&self) -> String {
        let fields = KeyFields {
            keywords: &self.keywords,
            category: self.category.as_deref(),
            task_type: self.task_type.as_deref(),
            language: self.language.as_deref(),
            source: self.source.as_deref(),
            limit: self.limit,
            offset: self.offset,
        };

        serde_json::to_string(&fields).unwrap_or_else(|_| "{}".to_string())
    }
}

fn clamp_limit(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    }
}

fn normalize_tag(value: String) -> Option<String> {
    let value = value.trim().to_lowercase();

    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_sorted_and_deduplicated() {
        let query = CanonicalQuery::new(["image", "Find", "classification", "image"], 5, 0);

        assert_eq!(query.keywords(), &["classification", "find", "image"]);
        assert_eq!(query.limit(), 5);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_word_order_does_not_change_query() {
        let a = CanonicalQuery::new(["image", "classification"], 5, 0);
        let b = CanonicalQuery::new(["classification", "image"], 5, 0);

        assert_eq!(a, b);
        assert_eq!(a.canonical_form(), b.canonical_form());
    }

    #[test]
    fn test_canonical_form_field_order() {
        let query = CanonicalQuery::new(["speech"], 10, 20)
            .with_category("Audio")
            .with_task_type("recognition")
            .with_language("en");

        assert_eq!(
            query.canonical_form(),
            r#"{"keywords":["speech"],"category":"audio","task_type":"recognition","language":"en","limit":10,"offset":20}"#
        );
    }

    #[test]
    fn test_source_only_in_form_when_set() {
        let plain = CanonicalQuery::match_all(10, 0);
        let filtered = CanonicalQuery::match_all(10, 0).with_source(" HuggingFace ");

        assert_eq!(filtered.source(), Some("huggingface"));
        assert!(!plain.canonical_form().contains("source"));
        assert!(filtered.canonical_form().contains(r#""source":"huggingface""#));
        assert_ne!(plain.canonical_form(), filtered.canonical_form());
    }

    #[test]
    fn test_degraded_flag_not_in_canonical_form() {
        let normal = CanonicalQuery::new(["text"], 10, 0);
        let degraded = CanonicalQuery::new(["text"], 10, 0).degraded();

        assert!(degraded.is_degraded());
        assert_eq!(normal.canonical_form(), degraded.canonical_form());
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(CanonicalQuery::match_all(0, 0).limit(), DEFAULT_LIMIT);
        assert_eq!(CanonicalQuery::match_all(10_000, 0).limit(), MAX_LIMIT);
    }

    #[test]
    fn test_blank_category_ignored() {
        let query = CanonicalQuery::match_all(10, 0).with_category("  ");
        assert_eq!(query.category(), None);
    }

    #[test]
    fn test_match_terms_include_task_and_language_once() {
        let query = CanonicalQuery::new(["classification", "image"], 5, 0)
            .with_task_type("classification");
        assert_eq!(query.match_terms(), vec!["classification", "image"]);

        let query = CanonicalQuery::new(["image"], 5, 0).with_task_type("detection");
        assert_eq!(query.match_terms(), vec!["image", "detection"]);

        let query = CanonicalQuery::new(["chinese", "qa"], 5, 0)
            .with_task_type("question answering")
            .with_language("Chinese");
        assert_eq!(query.match_terms(), vec!["chinese", "qa", "question answering"]);
    }
}
