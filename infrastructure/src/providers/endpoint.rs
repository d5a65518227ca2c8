//! Deliberation gateway over a remote HTTP service.
//!
//! Each call is a `POST {base_url}/{think|discuss|cluster|chat}` with the
//! request serialized as camelCase JSON. Failures come back as a non-2xx
//! status with an `{"error": "..."}` body.

use super::{ProviderError, error_message, http_client};
use async_trait::async_trait;
use deliberation_application::{
    ChatRequest, ChatResponse, ClusterRequest, ClusterResponse, DeliberationGateway,
    DiscussRequest, DiscussResponse, GatewayError, ThinkRequest, ThinkResponse,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct RemoteDeliberationGateway {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteDeliberationGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req, Resp>(&self, route: &str, request: &Req) -> Result<Resp, ProviderError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), route);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(format!("{route}: {e}")))
    }
}

#[async_trait]
impl DeliberationGateway for RemoteDeliberationGateway {
    async fn think(&self, request: &ThinkRequest) -> Result<ThinkResponse, GatewayError> {
        Ok(self.post("think", request).await?)
    }

    async fn discuss(&self, request: &DiscussRequest) -> Result<DiscussResponse, GatewayError> {
        Ok(self.post("discuss", request).await?)
    }

    async fn cluster(&self, request: &ClusterRequest) -> Result<ClusterResponse, GatewayError> {
        Ok(self.post("cluster", request).await?)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        Ok(self.post("chat", request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deliberation_domain::{AnswerEntry, ClusterMode};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> RemoteDeliberationGateway {
        RemoteDeliberationGateway::new(server.uri(), Duration::from_secs(5))
    }

    fn think_request() -> ThinkRequest {
        ThinkRequest {
            name: "Ada".to_string(),
            persona: "A baker.".to_string(),
            trace: vec![],
            question: "Should I move?".to_string(),
            extra_context: None,
        }
    }

    #[tokio::test]
    async fn test_think_posts_camel_case_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/think"))
            .and(body_partial_json(json!({"name": "Ada", "question": "Should I move?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reasoning": "Bread travels well.",
                "answer": "Yes, go."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = gateway(&server).think(&think_request()).await.unwrap();
        assert_eq!(response.answer, "Yes, go.");
        assert_eq!(response.reasoning, "Bread travels well.");
    }

    #[tokio::test]
    async fn test_cluster_round_trips_themes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cluster"))
            .and(body_partial_json(json!({"mode": "exclusive"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "themes": [
                    {"label": "Yes", "count": 2, "agentIds": ["a1", "a3"]},
                    {"label": "No", "count": 1, "agentIds": ["a2"]}
                ]
            })))
            .mount(&server)
            .await;

        let request = ClusterRequest {
            answers: vec![
                AnswerEntry::new("a1", "yes"),
                AnswerEntry::new("a2", "no"),
                AnswerEntry::new("a3", "yes"),
            ],
            question: "Move?".to_string(),
            mode: ClusterMode::Exclusive,
        };
        let response = gateway(&server).cluster(&request).await.unwrap();
        assert_eq!(response.themes.len(), 2);
        assert_eq!(response.themes[0].count, 2);
        assert_eq!(response.themes[0].agent_ids[1].as_str(), "a3");
    }

    #[tokio::test]
    async fn test_error_body_becomes_invalid_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "userMessage is required"})),
            )
            .mount(&server)
            .await;

        let request = ChatRequest {
            name: "Ada".to_string(),
            persona: "A baker.".to_string(),
            trace: vec![],
            answer: None,
            user_message: String::new(),
        };
        let err = gateway(&server).chat(&request).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::InvalidRequest("userMessage is required".to_string())
        );
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/think"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;

        let err = gateway(&server).think(&think_request()).await.unwrap_err();
        assert_eq!(
            err,
            GatewayError::Status {
                status: 500,
                message: "boom".to_string()
            }
        );
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unauthorized_and_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/think"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/discuss"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        assert_eq!(
            gateway.think(&think_request()).await.unwrap_err(),
            GatewayError::Unauthorized
        );

        let request = DiscussRequest {
            participants: vec![],
            question: "Move?".to_string(),
            conversation_so_far: String::new(),
            current_speaker: deliberation_application::SpeakerContext {
                name: "Ada".to_string(),
                persona: "A baker.".to_string(),
                trace: vec![],
            },
        };
        let err = gateway.discuss(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(msg) if msg.starts_with("discuss")));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let gateway = RemoteDeliberationGateway::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = gateway.think(&think_request()).await.unwrap_err();
        assert!(err.is_transient());
    }
}
