//! Output configuration from TOML (`[output]` section)

use deliberation_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// How results are printed when the CLI does not say otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// `full`, `themes` or `json`; `--output` wins
    pub format: Option<OutputFormat>,
    /// ANSI colors in console output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}
