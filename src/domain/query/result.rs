//! Query result types

use serde::{Deserialize, Serialize};

use super::CanonicalQuery;
use crate::domain::catalog::Dataset;

/// Where a result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServedBy {
    Memory,
    Shared,
    Catalog,
}

impl ServedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Shared => "shared",
            Self::Catalog => "catalog",
        }
    }
}

impl std::fmt::Display for ServedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One page of matching datasets plus the total before slicing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub datasets: Vec<Dataset>,
    pub total: usize,
}

impl CatalogPage {
    pub fn new(datasets: Vec<Dataset>, total: usize) -> Self {
        Self { datasets, total }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

/// A resolved query annotated with the tier that served it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub query: CanonicalQuery,
    pub datasets: Vec<Dataset>,
    pub total: usize,
    pub served_by: ServedBy,
}

impl ResultSet {
    pub fn from_page(query: CanonicalQuery, page: CatalogPage, served_by: ServedBy) -> Self {
        Self {
            query,
            datasets: page.datasets,
            total: page.total,
            served_by,
        }
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}
