//! Append-only JSONL history file

use async_trait::async_trait;
use deliberation_application::{HistoryError, HistoryRepository};
use deliberation_domain::HistoryRecord;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct JsonlHistoryRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlHistoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage(path: &Path, e: std::io::Error) -> HistoryError {
    HistoryError::Storage(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl HistoryRepository for JsonlHistoryRepository {
    async fn insert(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage(parent, e))?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| storage(&self.path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| storage(&self.path, e))?;
        file.flush().await.map_err(|e| storage(&self.path, e))?;

        debug!("History saved to {}", self.path.display());
        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage(&self.path, e)),
        };

        let mut records: Vec<HistoryRecord> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<HistoryRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping malformed history line: {}", e);
                    None
                }
            })
            .filter(|record| record.user_id == user_id)
            .collect();

        // File order is insertion order; the reverse keeps ties newest first
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}
