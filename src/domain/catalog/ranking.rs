//! Matching and ordering shared by every catalog backend

use std::cmp::Ordering;

use super::Dataset;
use crate::domain::query::{CanonicalQuery, CatalogPage};

/// Number of distinct query terms found in the dataset's searchable text
pub fn relevance(dataset: &Dataset, query: &CanonicalQuery) -> usize {
    let text = dataset.search_text();

    query
        .match_terms()
        .into_iter()
        .filter(|term| text.contains(term))
        .count()
}

/// Whether the dataset satisfies the query's filters
///
/// Returns the relevance when it does. A query with no terms matches every
/// dataset with relevance zero.
pub fn score(dataset: &Dataset, query: &CanonicalQuery) -> Option<usize> {
    if let Some(category) = query.category() {
        let matches = dataset
            .category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(category));
        if !matches {
            return None;
        }
    }

    if let Some(source) = query.source() {
        if !dataset.source.eq_ignore_ascii_case(source) {
            return None;
        }
    }

    let has_terms = !query.match_terms().is_empty();
    let relevance = relevance(dataset, query);

    if has_terms && relevance == 0 {
        None
    } else {
        Some(relevance)
    }
}

/// Relevance desc, sample count desc, id asc
fn compare(a: &(usize, Dataset), b: &(usize, Dataset)) -> Ordering {
    b.0.cmp(&a.0)
        .then_with(|| b.1.sample_count.cmp(&a.1.sample_count))
        .then_with(|| a.1.id.cmp(&b.1.id))
}

/// Filters, orders and slices a set of candidate datasets
pub fn rank<I>(candidates: I, query: &CanonicalQuery) -> CatalogPage
where
    I: IntoIterator<Item = Dataset>,
{
    let mut scored: Vec<(usize, Dataset)> = candidates
        .into_iter()
        .filter_map(|dataset| score(&dataset, query).map(|s| (s, dataset)))
        .collect();

    scored.sort_by(compare);

    let total = scored.len();
    let datasets = scored
        .into_iter()
        .skip(query.offset())
        .take(query.limit())
        .map(|(_, dataset)| dataset)
        .collect();

    CatalogPage::new(datasets, total)
}
