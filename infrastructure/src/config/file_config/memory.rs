//! Memory configuration from TOML (`[memory]` section)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    pub enabled: bool,
    /// Token this client presents to the memory service
    pub access_token: Option<String>,
    /// JSONL file backing the vector store; in-memory only when unset
    pub store_path: Option<String>,
    pub dedup_threshold: f32,
    pub recall_threshold: f32,
    pub recall_limit: usize,
    /// Accepted access tokens and the user id each one maps to
    pub tokens: HashMap<String, String>,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            access_token: None,
            store_path: None,
            dedup_threshold: 0.85,
            recall_threshold: 0.5,
            recall_limit: 10,
            tokens: HashMap::new(),
        }
    }
}
