//! Non-blocking history recorder

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::domain::history::{HistoryRepository, HistoryStats, QueryRecord};
use crate::domain::DomainError;

enum Command {
    Record(QueryRecord),
    Flush(oneshot::Sender<()>),
}

/// Queues query records for a background writer task
///
/// `record` never blocks the caller: a full queue drops the record with a
/// warning, and repository failures are logged by the writer.
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    sender: mpsc::Sender<Command>,
    repository: Arc<dyn HistoryRepository>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record(record) => f.debug_tuple("Record").field(&record.id).finish(),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl HistoryRecorder {
    /// Spawns the writer task on the current runtime
    pub fn spawn(repository: Arc<dyn HistoryRepository>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        tokio::spawn(Self::run(Arc::clone(&repository), receiver));

        Self { sender, repository }
    }

    async fn run(repository: Arc<dyn HistoryRepository>, mut receiver: mpsc::Receiver<Command>) {
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Record(record) => {
                    let id = record.id.clone();
                    if let Err(e) = repository.record(record).await {
                        warn!(record_id = %id, error = %e, "Failed to store query record");
                    }
                }
                Command::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }

        debug!("History writer stopped");
    }

    /// Queues a record; drops it when the queue is full
    pub fn record(&self, record: QueryRecord) {
        match self.sender.try_send(Command::Record(record)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(Command::Record(record))) => {
                warn!(record_id = %record.id, "History queue full, dropping query record");
            }
            Err(e) => {
                warn!(error = %e, "History writer unavailable, dropping query record");
            }
        }
    }

    /// Waits until every record queued before this call has been written
    pub async fn flush(&self) -> Result<(), DomainError> {
        let (done, wait) = oneshot::channel();

        self.sender
            .send(Command::Flush(done))
            .await
            .map_err(|_| DomainError::internal("History writer stopped"))?;

        wait.await
            .map_err(|_| DomainError::internal("History writer stopped"))
    }

    pub async fn stats(&self) -> Result<HistoryStats, DomainError> {
        self.repository.stats().await
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<QueryRecord>, DomainError> {
        self.repository.recent(limit).await
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
