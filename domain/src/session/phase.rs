//! Deliberation phase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a deliberation currently is
///
/// ```text
/// idle -> thinking -> discussing -> re-thinking -> clustering -> complete
/// ```
///
/// A queued follow-up at a boundary short-circuits straight from thinking or
/// discussing to a follow-up thinking round and then clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Idle,
    Thinking,
    Discussing,
    ReThinking,
    Clustering,
    Complete,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Thinking => "thinking",
            Phase::Discussing => "discussing",
            Phase::ReThinking => "re-thinking",
            Phase::Clustering => "clustering",
            Phase::Complete => "complete",
        }
    }

    /// Label shown to the user while the phase is active
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Waiting for a question",
            Phase::Thinking => "Agents are thinking...",
            Phase::Discussing => "Groups are discussing...",
            Phase::ReThinking => "Agents are reconsidering...",
            Phase::Clustering => "Summarizing answers...",
            Phase::Complete => "Deliberation complete",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Phase::Idle => "💤",
            Phase::Thinking => "💭",
            Phase::Discussing => "🗣️",
            Phase::ReThinking => "🔄",
            Phase::Clustering => "📊",
            Phase::Complete => "✅",
        }
    }

    /// Once here, background results must no longer be written
    pub fn is_final_stretch(&self) -> bool {
        matches!(self, Phase::Clustering | Phase::Complete)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
