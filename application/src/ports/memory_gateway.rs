//! Memory gateway port
//!
//! Long-term facts about the person asking: extracted from finished
//! conversations and recalled as context for later think calls.

use async_trait::async_trait;
use deliberation_domain::ConversationMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    /// Required fields missing or empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The access token was rejected
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Memory backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    /// A fact stated outright; skips LLM extraction when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_memory: Option<String>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub stored: usize,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallRequest {
    pub question: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallResponse {
    #[serde(default)]
    pub memories: Vec<String>,
}

/// Gateway to the memory store
#[async_trait]
pub trait MemoryGateway: Send + Sync {
    /// Extract facts from a conversation and store the new ones
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse, MemoryError>;

    /// Memories relevant to a question, most similar first
    async fn recall(&self, request: &RecallRequest) -> Result<RecallResponse, MemoryError>;
}
