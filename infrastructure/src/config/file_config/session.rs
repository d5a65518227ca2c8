//! Session configuration from TOML (`[session]` section)

use serde::{Deserialize, Serialize};

/// Raw session configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Number of agents in the crowd
    pub agents: usize,
    /// Characters JSON to draw personas from (built-in roster when unset)
    pub personas_file: Option<String>,
    /// Owner of history and memory records
    pub user_id: String,
    /// Seed for every random decision; entropy when unset
    pub seed: Option<u64>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            agents: 70,
            personas_file: None,
            user_id: "local".to_string(),
            seed: None,
        }
    }
}
