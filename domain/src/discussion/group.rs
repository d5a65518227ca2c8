//! Discussion group entity

use crate::agent::entities::AgentId;
use crate::world::geometry::Position;
use serde::{Deserialize, Serialize};

/// A circle of 2–6 agents discussing the question (Entity)
///
/// Membership and center are fixed at formation. The conversation log only
/// grows, and `completed` flips to true exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionGroup {
    member_ids: Vec<AgentId>,
    center: Position,
    conversation_log: Vec<String>,
    completed: bool,
}

impl DiscussionGroup {
    /// Create a group. The first member is the seed the others were found around.
    pub fn new(member_ids: Vec<AgentId>, center: Position) -> Self {
        Self {
            member_ids,
            center,
            conversation_log: Vec::new(),
            completed: false,
        }
    }

    pub fn member_ids(&self) -> &[AgentId] {
        &self.member_ids
    }

    pub fn seed(&self) -> Option<&AgentId> {
        self.member_ids.first()
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.member_ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }

    pub fn center(&self) -> Position {
        self.center
    }

    pub fn conversation_log(&self) -> &[String] {
        &self.conversation_log
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Append a `speaker: message` line. Ignored once the group is completed.
    pub fn record_line(&mut self, speaker: &str, message: &str) -> Option<String> {
        if self.completed {
            return None;
        }
        let line = format!("{speaker}: {message}");
        self.conversation_log.push(line.clone());
        Some(line)
    }

    /// Transcript in the form passed to the next speaker and stored in traces
    pub fn transcript(&self) -> String {
        self.conversation_log
            .iter()
            .map(|line| format!("{line}\n\n"))
            .collect()
    }

    /// Mark the discussion finished. Returns true only on the first call.
    pub fn complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }
}
