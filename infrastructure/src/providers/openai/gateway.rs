//! Deliberation gateway backed by an OpenAI-compatible chat model

use super::client::{OpenAiClient, Sampling};
use async_trait::async_trait;
use deliberation_application::{
    ChatRequest, ChatResponse, ClusterRequest, ClusterResponse, DeliberationGateway,
    DiscussRequest, DiscussResponse, GatewayError, ThinkRequest, ThinkResponse,
};
use deliberation_domain::{ParticipantRef, PromptTemplate};

pub struct OpenAiDeliberationGateway {
    client: OpenAiClient,
}

impl OpenAiDeliberationGateway {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &OpenAiClient {
        &self.client
    }
}

fn require(field: &str, value: &str) -> Result<(), GatewayError> {
    if value.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}

#[async_trait]
impl DeliberationGateway for OpenAiDeliberationGateway {
    async fn think(&self, request: &ThinkRequest) -> Result<ThinkResponse, GatewayError> {
        require("persona", &request.persona)?;
        require("question", &request.question)?;

        let system = PromptTemplate::think_system(
            &request.name,
            &request.persona,
            &request.trace,
            &request.question,
            request.extra_context.as_deref(),
        );
        Ok(self.client.chat_json(&system, None, Sampling::THINK).await?)
    }

    async fn discuss(&self, request: &DiscussRequest) -> Result<DiscussResponse, GatewayError> {
        require("question", &request.question)?;
        require("currentSpeaker.name", &request.current_speaker.name)?;

        let participants: Vec<ParticipantRef<'_>> = request
            .participants
            .iter()
            .map(|p| ParticipantRef {
                name: &p.name,
                persona: &p.persona,
            })
            .collect();
        let speaker = ParticipantRef {
            name: &request.current_speaker.name,
            persona: &request.current_speaker.persona,
        };
        let system = PromptTemplate::discuss_system(
            &participants,
            &request.question,
            &request.conversation_so_far,
            speaker,
            &request.current_speaker.trace,
        );

        let mut response: DiscussResponse =
            self.client.chat_json(&system, None, Sampling::DISCUSS).await?;
        if response.speaker.trim().is_empty() {
            response.speaker = request.current_speaker.name.clone();
        }
        Ok(response)
    }

    async fn cluster(&self, request: &ClusterRequest) -> Result<ClusterResponse, GatewayError> {
        require("question", &request.question)?;
        if request.answers.is_empty() {
            return Ok(ClusterResponse::default());
        }

        let system =
            PromptTemplate::cluster_system(&request.answers, &request.question, request.mode);
        let mut response: ClusterResponse =
            self.client.chat_json(&system, None, Sampling::CLUSTER).await?;

        // Models sometimes omit or miscount `count`; the id list is authoritative
        for theme in &mut response.themes {
            theme.count = theme.agent_ids.len();
        }
        Ok(response)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        require("userMessage", &request.user_message)?;

        let system = PromptTemplate::chat_system(
            &request.name,
            &request.persona,
            &request.trace,
            request.answer.as_deref(),
        );
        Ok(self
            .client
            .chat_json(&system, Some(&request.user_message), Sampling::CHAT)
            .await?)
    }
}
