//! Cache tier identity

use serde::{Deserialize, Serialize};

use crate::domain::query::ServedBy;

/// Position of a cache in the lookup order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    /// Process-local, bounded, short TTL
    Memory,
    /// External, shared by all instances, medium TTL
    Shared,
}

impl CacheTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Shared => "shared",
        }
    }
}

impl std::fmt::Display for CacheTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<CacheTier> for ServedBy {
    fn from(tier: CacheTier) -> Self {
        match tier {
            CacheTier::Memory => ServedBy::Memory,
            CacheTier::Shared => ServedBy::Shared,
        }
    }
}
