//! Simulated world bounds from TOML (`[world]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorldConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FileWorldConfig {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 1200.0,
        }
    }
}
