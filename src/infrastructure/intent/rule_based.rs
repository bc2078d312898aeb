//! Local regex intent classifier

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::query::{EntityKind, Extraction, Intent, IntentExtractor};
use crate::domain::DomainError;

/// Confidence reported when only entities were recognized
const ENTITY_ONLY_CONFIDENCE: f32 = 0.5;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
        .collect()
}

static INTENT_RULES: Lazy<Vec<(Intent, Vec<Regex>)>> = Lazy::new(|| {
    vec![
        (
            Intent::ListDatasets,
            compile(&[
                r"\b(list|show|display|get all|enumerate)\b.*\b(datasets?|data)\b",
                r"\bwhat\s+(datasets?|data)\s+(are\s+)?available\b",
                r"\bshow\s+me\s+(all\s+)?(datasets?|data)\b",
            ]),
        ),
        (
            Intent::SearchDatasets,
            compile(&[
                r"\b(find|search|look for|locate)\b.*\b(datasets?|data)\b",
                r"\bi\s+(need|want|am looking for)\b.*\b(datasets?|data)\b",
                r"\bdo\s+you\s+have\b.*\b(datasets?|data)\b",
            ]),
        ),
        (
            Intent::GetDatasetInfo,
            compile(&[
                r"\b(info|information|details|about|describe)\b.*\b(dataset|data)\b",
                r"\btell\s+me\s+about\b.*\b(dataset|data)\b",
                r"\bwhat\s+is\b.*\b(dataset|data)\b",
            ]),
        ),
        (
            Intent::FilterSamples,
            compile(&[
                r"\b(filter|where|with|having)\b.*\b(samples?|records?)\b",
                r"\bshow\s+me\s+(samples?|data|records?)\s+(where|with|that)\b",
                r"\bget\s+(samples?|data|records?)\s+(where|with|that)\b",
            ]),
        ),
        (
            Intent::CompareDatasets,
            compile(&[
                r"\b(compare|vs|versus|difference between)\b.*\b(datasets?|data)\b",
                r"\bwhich\s+is\s+better\b.*\b(datasets?|data)\b",
                r"\bwhat.*difference.*between\b.*\b(datasets?|data)\b",
            ]),
        ),
        (
            Intent::RecommendDatasets,
            compile(&[
                r"\b(recommend|suggest|best)\b.*\b(datasets?|data)\b",
                r"\bwhat.*best.*\b(datasets?|data)\b",
                r"\bwhich.*\b(datasets?|data).*should\s+i\s+use\b",
            ]),
        ),
        (
            Intent::GetStatistics,
            compile(&[
                r"\b(statistics|stats|metrics|numbers)\b.*\b(datasets?|data)\b",
                r"\bhow\s+many\b.*\b(datasets?|samples?|records?)\b",
            ]),
        ),
    ]
});

/// (kind, canonical value, synonyms)
const VOCABULARY: &[(EntityKind, &str, &[&str])] = &[
    (EntityKind::Category, "vision", &["vision", "image", "visual", "photo", "picture", "cv", "computer vision"]),
    (EntityKind::Category, "nlp", &["nlp", "text", "natural language"]),
    (EntityKind::Category, "audio", &["audio", "speech", "sound", "music", "voice", "acoustic"]),
    (EntityKind::Category, "multimodal", &["multimodal", "multi-modal", "vision-language"]),
    (EntityKind::Task, "classification", &["classification", "classify", "categorize"]),
    (EntityKind::Task, "detection", &["detection", "detect", "object detection"]),
    (EntityKind::Task, "segmentation", &["segmentation", "segment", "semantic segmentation"]),
    (EntityKind::Task, "qa", &["question answering", "qa"]),
    (EntityKind::Task, "sentiment", &["sentiment", "emotion"]),
    (EntityKind::Task, "translation", &["translation", "translate", "machine translation"]),
    (EntityKind::Language, "english", &["english", "en"]),
    (EntityKind::Language, "chinese", &["chinese", "zh", "mandarin"]),
    (EntityKind::Source, "modelscope", &["modelscope"]),
    (EntityKind::Source, "huggingface", &["huggingface", "hugging face"]),
    (EntityKind::Source, "kaggle", &["kaggle"]),
    (EntityKind::Source, "github", &["github"]),
    (EntityKind::Dataset, "coco", &["coco"]),
    (EntityKind::Dataset, "imagenet", &["imagenet"]),
    (EntityKind::Dataset, "squad", &["squad"]),
    (EntityKind::Dataset, "mnist", &["mnist"]),
    (EntityKind::Dataset, "cifar", &["cifar"]),
    (EntityKind::Dataset, "glue", &["glue"]),
];

static ENTITY_PATTERNS: Lazy<Vec<(EntityKind, &'static str, Regex)>> = Lazy::new(|| {
    VOCABULARY
        .iter()
        .map(|(kind, value, synonyms)| {
            let alternatives = synonyms
                .iter()
                .map(|s| regex::escape(s).replace(' ', r"\s+"))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&format!(r"(?i)\b({})\b", alternatives)).unwrap();
            (*kind, *value, regex)
        })
        .collect()
});

/// Pattern-based intent and entity extraction with no external dependency
///
/// Each intent scores the fraction of its patterns that match; the highest
/// score wins and becomes the confidence. Text that matches no intent but
/// names known entities is treated as a search.
#[derive(Debug, Default, Clone)]
pub struct RuleBasedIntentExtractor;

impl RuleBasedIntentExtractor {
    pub fn new() -> Self {
        Self
    }

    fn classify(text: &str) -> Option<(Intent, f32)> {
        let mut best: Option<(Intent, f32)> = None;

        for (intent, patterns) in INTENT_RULES.iter() {
            let matched = patterns.iter().filter(|p| p.is_match(text)).count();
            if matched == 0 {
                continue;
            }

            let score = matched as f32 / patterns.len() as f32;
            if best.is_none_or(|(_, current)| score > current) {
                best = Some((*intent, score));
            }
        }

        best
    }

    fn entities(text: &str, mut extraction: Extraction) -> Extraction {
        for (kind, value, regex) in ENTITY_PATTERNS.iter() {
            if regex.is_match(text) {
                extraction = extraction.with_entity(*kind, *value);
            }
        }
        extraction
    }
}

#[async_trait]
impl IntentExtractor for RuleBasedIntentExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction, DomainError> {
        let classified = Self::classify(text);
        let (intent, confidence) = classified.unwrap_or((Intent::SearchDatasets, ENTITY_ONLY_CONFIDENCE));

        let extraction = Self::entities(text, Extraction::new(intent).with_confidence(confidence));

        if classified.is_none() && extraction.entities.is_empty() {
            return Err(DomainError::intent_unresolved(format!(
                "No intent pattern or known entity in '{}'",
                text
            )));
        }

        Ok(extraction)
    }

    fn name(&self) -> &'static str {
        "rule_based"
    }
}
