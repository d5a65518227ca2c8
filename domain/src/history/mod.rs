//! Question history

use crate::clustering::theme::ThemeCluster;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed question and its final themes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub user_id: String,
    pub question: String,
    pub themes: Vec<ThemeCluster>,
    pub total_agents: usize,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(
        user_id: impl Into<String>,
        question: impl Into<String>,
        themes: Vec<ThemeCluster>,
        total_agents: usize,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            question: question.into(),
            themes,
            total_agents,
            created_at: Utc::now(),
        }
    }
}
