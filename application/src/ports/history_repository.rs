//! History repository port

use async_trait::async_trait;
use deliberation_domain::HistoryRecord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History storage error: {0}")]
    Storage(String),

    #[error("History serialization error: {0}")]
    Serialization(String),
}

/// Store of completed questions
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn insert(&self, record: &HistoryRecord) -> Result<(), HistoryError>;

    /// Newest first, at most `limit` records for `user_id`
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError>;
}

/// Discards every record
pub struct NoHistory;

#[async_trait]
impl HistoryRepository for NoHistory {
    async fn insert(&self, _record: &HistoryRecord) -> Result<(), HistoryError> {
        Ok(())
    }

    async fn recent(&self, _user_id: &str, _limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        Ok(Vec::new())
    }
}
