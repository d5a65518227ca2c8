//! Deliberation gateway port
//!
//! Defines the four remote calls the pipeline makes: think, discuss, cluster
//! and chat. Each is a black box with a JSON request/response contract; the
//! request and response types here are that contract (camelCase on the wire).

use async_trait::async_trait;
use deliberation_domain::{AnswerEntry, ClusterMode, ThemeCluster};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during remote deliberation calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Timeout")]
    Timeout,
}

impl GatewayError {
    /// Whether retrying the same call later might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Transport(_) | GatewayError::Timeout => true,
            GatewayError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkRequest {
    pub name: String,
    pub persona: String,
    pub trace: Vec<String>,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkResponse {
    pub reasoning: String,
    pub answer: String,
}

/// A member of a discussion circle as other speakers see them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub persona: String,
}

/// The agent whose turn it is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerContext {
    pub name: String,
    pub persona: String,
    pub trace: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussRequest {
    pub participants: Vec<Participant>,
    pub question: String,
    pub conversation_so_far: String,
    pub current_speaker: SpeakerContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussResponse {
    /// Name the model claims to speak as; the orchestrator uses its own record instead
    #[serde(default)]
    pub speaker: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRequest {
    pub answers: Vec<AnswerEntry>,
    pub question: String,
    pub mode: ClusterMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterResponse {
    #[serde(default)]
    pub themes: Vec<ThemeCluster>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub name: String,
    pub persona: String,
    pub trace: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub user_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Gateway for the deliberation's remote calls
///
/// All calls are read-style and safe to retry. The pipeline itself never
/// retries within a round: a failed call skips that agent's turn.
#[async_trait]
pub trait DeliberationGateway: Send + Sync {
    /// One agent forms (or revises) its opinion
    async fn think(&self, request: &ThinkRequest) -> Result<ThinkResponse, GatewayError>;

    /// One turn of a group discussion
    async fn discuss(&self, request: &DiscussRequest) -> Result<DiscussResponse, GatewayError>;

    /// Group current answers into themes
    async fn cluster(&self, request: &ClusterRequest) -> Result<ClusterResponse, GatewayError>;

    /// Direct conversation between the user and one agent
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError>;
}
