//! Agent entities

use crate::agent::trace::TraceEntry;
use serde::{Deserialize, Serialize};

/// Stable agent identifier, unique within a session (e.g. `character_0001`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Who an agent is. Set at creation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: AgentId,
    #[serde(default)]
    pub name: String,
    pub persona: String,
}

impl AgentProfile {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, persona: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            persona: persona.into(),
        }
    }

    /// Name used in prompts and transcripts.
    ///
    /// Falls back to `Agent #<suffix>` when the profile has no name, where the
    /// suffix is the id without its `character_` prefix.
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            format!("Agent #{}", self.id.as_str().trim_start_matches("character_"))
        } else {
            name.to_string()
        }
    }
}

/// Runtime state of one agent during a question session (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    profile: AgentProfile,
    trace: Vec<TraceEntry>,
    answer: Option<String>,
}

impl AgentRecord {
    pub fn new(profile: AgentProfile) -> Self {
        Self {
            profile,
            trace: Vec::new(),
            answer: None,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.profile.id
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn display_name(&self) -> String {
        self.profile.display_name()
    }

    pub fn persona(&self) -> &str {
        &self.profile.persona
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// Trace rendered as the plain strings sent to remote calls
    pub fn rendered_trace(&self) -> Vec<String> {
        self.trace.iter().map(TraceEntry::render).collect()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Append a trace entry. The trace is append-only until [`reset`](Self::reset).
    pub fn push_trace(&mut self, entry: TraceEntry) {
        self.trace.push(entry);
    }

    /// Replace the current answer with the latest think result
    pub fn set_answer(&mut self, answer: impl Into<String>) {
        let answer = answer.into();
        self.answer = if answer.trim().is_empty() {
            None
        } else {
            Some(answer)
        };
    }

    /// Clear per-question state (trace and answer); the profile is kept
    pub fn reset(&mut self) {
        self.trace.clear();
        self.answer = None;
    }
}
