//! Run summary

use crate::clustering::theme::ThemeCluster;
use serde::{Deserialize, Serialize};

/// What one pipeline run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliberationSummary {
    pub question: String,
    pub themes: Vec<ThemeCluster>,
    pub total_agents: usize,
    pub answered: usize,
    pub groups_formed: usize,
    pub follow_ups: usize,
    /// Think or discuss calls that failed and were skipped
    pub failed_calls: usize,
    /// True when the discussion round was skipped for a queued follow-up
    pub short_circuited: bool,
}

impl DeliberationSummary {
    pub fn theme_total(&self) -> usize {
        self.themes.iter().map(|t| t.count).sum()
    }

    pub fn leading_theme(&self) -> Option<&ThemeCluster> {
        self.themes.iter().max_by_key(|t| t.count)
    }
}
