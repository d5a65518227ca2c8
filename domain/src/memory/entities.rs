//! Memory and conversation entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message in the session's conversation thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    System,
}

impl MessageRole {
    /// Speaker label used when a conversation is rendered as plain text
    pub fn speaker(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::System => "System",
        }
    }
}

/// One entry of the conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub text: String,
}

impl ConversationMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            text: text.into(),
        }
    }
}

/// Render a thread as `User: ...` / `System: ...` lines
pub fn render_conversation(messages: &[ConversationMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.speaker(), m.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A stored fact about a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub user_id: String,
    pub memory: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub source_question: String,
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn new(
        user_id: impl Into<String>,
        memory: impl Into<String>,
        embedding: Vec<f32>,
        source_question: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            memory: memory.into(),
            embedding,
            source_question: source_question.into(),
            created_at: Utc::now(),
        }
    }
}
