//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for deliberation results
///
/// This is a domain concept representing how the output should be formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Themes plus every agent's answer and trace (default)
    #[default]
    Full,
    /// Only the final themes
    Themes,
    /// JSON output
    Json,
}
