//! Trace entries
//!
//! An agent's trace mixes three kinds of records. They are kept typed in the
//! domain and rendered to tagged strings only when sent to a remote call.

use serde::{Deserialize, Serialize};

/// Prefix marking reasoning produced in response to a user follow-up
pub const FOLLOW_UP_PREFIX: &str = "[Follow-up] ";

/// Header marking a group discussion transcript
pub const DISCUSSION_HEADER: &str = "--- Group Discussion ---\n";

/// One record in an agent's trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum TraceEntry {
    /// Organic reasoning from a think or re-think call
    Reasoning(String),
    /// Reasoning from a think call that incorporated a user follow-up
    FollowUp(String),
    /// Full transcript of a discussion group the agent took part in
    Discussion(String),
}

impl TraceEntry {
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning(text.into())
    }

    pub fn follow_up(text: impl Into<String>) -> Self {
        Self::FollowUp(text.into())
    }

    pub fn discussion(transcript: impl Into<String>) -> Self {
        Self::Discussion(transcript.into())
    }

    /// Text form used in prompts and request payloads
    pub fn render(&self) -> String {
        match self {
            TraceEntry::Reasoning(text) => text.clone(),
            TraceEntry::FollowUp(text) => format!("{FOLLOW_UP_PREFIX}{text}"),
            TraceEntry::Discussion(transcript) => format!("{DISCUSSION_HEADER}{transcript}"),
        }
    }

    pub fn is_follow_up(&self) -> bool {
        matches!(self, TraceEntry::FollowUp(_))
    }

    pub fn is_discussion(&self) -> bool {
        matches!(self, TraceEntry::Discussion(_))
    }
}
