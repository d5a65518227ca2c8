//! Chat with agent use case
//!
//! A direct one-on-one conversation between the user and a single agent. The
//! agent answers in character, drawing on its trace and current position.

use crate::ports::deliberation_gateway::{ChatRequest, DeliberationGateway, GatewayError};
use crate::session::SessionContext;
use deliberation_domain::AgentId;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Empty message")]
    EmptyMessage,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

pub struct ChatWithAgentUseCase<G: DeliberationGateway + 'static> {
    gateway: Arc<G>,
    context: Arc<SessionContext>,
}

impl<G: DeliberationGateway + 'static> ChatWithAgentUseCase<G> {
    pub fn new(gateway: Arc<G>, context: Arc<SessionContext>) -> Self {
        Self { gateway, context }
    }

    /// Send `message` to `agent` and return its reply
    pub async fn execute(&self, agent: &AgentId, message: &str) -> Result<String, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let record = self
            .context
            .agent(agent)
            .ok_or_else(|| ChatError::UnknownAgent(agent.clone()))?;

        let request = ChatRequest {
            name: record.display_name(),
            persona: record.persona().to_string(),
            trace: record.rendered_trace(),
            answer: record.answer().map(str::to_string),
            user_message: message.to_string(),
        };
        debug!("Chatting with {}", agent);
        let response = self.gateway.chat(&request).await?;
        Ok(response.reply)
    }
}
