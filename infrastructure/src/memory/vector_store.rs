//! In-process vector store with optional JSONL persistence

use deliberation_application::MemoryError;
use deliberation_domain::{MemoryRecord, cosine_similarity};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Memory records searched by cosine similarity.
///
/// Records live in memory; when opened on a file, every insert is appended to
/// it as one JSON line and the file is replayed on the next open.
pub struct VectorMemoryStore {
    records: Mutex<Vec<MemoryRecord>>,
    path: Option<PathBuf>,
}

impl VectorMemoryStore {
    pub fn in_memory() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            path: None,
        }
    }

    /// Load `path` if it exists; later inserts are appended to it
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        let records = match std::fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .filter_map(|line| match serde_json::from_str::<MemoryRecord>(line) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("Skipping malformed memory record in {}: {}", path.display(), e);
                        None
                    }
                })
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(MemoryError::Backend(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        debug!("Loaded {} memories from {}", records.len(), path.display());

        Ok(Self {
            records: Mutex::new(records),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        if let Some(path) = &self.path {
            append_line(path, &record)
                .map_err(|e| MemoryError::Backend(format!("cannot write {}: {}", path.display(), e)))?;
        }
        self.lock().push(record);
        Ok(())
    }

    /// Up to `limit` records of `user_id` with similarity `>= threshold`, most similar first
    pub fn nearest(
        &self,
        user_id: &str,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
    ) -> Vec<(f32, MemoryRecord)> {
        let mut scored: Vec<(f32, MemoryRecord)> = self
            .lock()
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| (cosine_similarity(&r.embedding, embedding), r))
            .filter(|(score, _)| *score >= threshold)
            .map(|(score, r)| (score, r.clone()))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);
        scored
    }

    pub fn count_for(&self, user_id: &str) -> usize {
        self.lock().iter().filter(|r| r.user_id == user_id).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MemoryRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn append_line(path: &Path, record: &MemoryRecord) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}
