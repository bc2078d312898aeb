//! Query domain - canonical queries, normalization and results

mod canonical;
mod normalizer;
mod result;

pub use canonical::{CanonicalQuery, DEFAULT_LIMIT, MAX_LIMIT};
pub use normalizer::{
    canonicalize, is_stop_word, tokenize, Entity, EntityKind, Extraction, Intent,
    IntentExtractor, QueryNormalizer,
};
pub use result::{CatalogPage, ResultSet, ServedBy};

#[cfg(test)]
pub use normalizer::MockIntentExtractor;
