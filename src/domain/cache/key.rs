//! Cache key derivation

use std::fmt::Debug;

use sha2::{Digest, Sha256};

use crate::domain::catalog::DatasetId;
use crate::domain::query::CanonicalQuery;

/// Default namespace prepended to every key
pub const DEFAULT_KEY_NAMESPACE: &str = "catalog";

/// Trait for deriving cache keys from domain values
///
/// Keys must be stable across processes so that shared-tier entries written by
/// one instance are found by every other.
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Key for a canonical query's result set
    fn query_key(&self, query: &CanonicalQuery) -> String;

    /// Key for a single dataset looked up by id
    fn dataset_key(&self, id: &DatasetId) -> String;
}

/// Hashes the canonical form with SHA-256 under a namespace
#[derive(Debug, Clone)]
pub struct Sha256KeyGenerator {
    namespace: String,
}

impl Default for Sha256KeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_NAMESPACE)
    }
}

impl Sha256KeyGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn digest(input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }
}

impl CacheKeyGenerator for Sha256KeyGenerator {
    fn query_key(&self, query: &CanonicalQuery) -> String {
        format!(
            "{}:query:{}",
            self.namespace,
            Self::digest(&query.canonical_form())
        )
    }

    fn dataset_key(&self, id: &DatasetId) -> String {
        format!("{}:dataset:{}", self.namespace, id)
    }
}
