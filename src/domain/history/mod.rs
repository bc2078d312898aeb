//! History domain - resolved query records and aggregates

mod record;
mod repository;

pub use record::{CanonicalStats, HistoryStats, QueryRecord, QueryRecordId, ResolutionStatus};
pub use repository::HistoryRepository;

#[cfg(test)]
pub use repository::mock::MockHistoryRepository;
