//! Chat completions and embeddings client

use crate::providers::{ProviderError, error_message, http_client};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Temperature and token cap of one completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Sampling {
    pub const THINK: Sampling = Sampling::new(0.9, 300);
    pub const DISCUSS: Sampling = Sampling::new(1.0, 200);
    pub const CLUSTER: Sampling = Sampling::new(0.3, 500);
    pub const CHAT: Sampling = Sampling::new(0.9, 200);
    pub const EXTRACT: Sampling = Sampling::new(0.3, 500);

    pub const fn new(temperature: f64, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible API
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: embedding_model.into(),
        }
    }

    /// Build from the API key held in `api_key_env`
    pub fn from_env(
        api_key_env: &str,
        base_url: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey(api_key_env.to_string()))?;
        Ok(Self::new(base_url, api_key, model, embedding_model, timeout))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), route)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        route: &str,
        body: &serde_json::Value,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .post(self.url(route))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }
        serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// One completion in JSON mode, parsed into `T`
    pub async fn chat_json<T: DeserializeOwned>(
        &self,
        system: &str,
        user: Option<&str>,
        sampling: Sampling,
    ) -> Result<T, ProviderError> {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: system,
        }];
        if let Some(user) = user {
            messages.push(ChatMessage {
                role: "user",
                content: user,
            });
        }

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": sampling.temperature,
            "max_tokens": sampling.max_tokens,
            "response_format": {"type": "json_object"},
        });

        debug!(
            "Chat completion: model={}, temperature={}, max_tokens={}",
            self.model, sampling.temperature, sampling.max_tokens
        );
        let completion: CompletionResponse = self.post("chat/completions", &body).await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Decode("completion has no content".to_string()))?;

        serde_json::from_str(strip_fences(&content))
            .map_err(|e| ProviderError::Decode(format!("{e}: {content}")))
    }

    /// Embeddings for `inputs`, in input order
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let mut response: EmbeddingResponse = self.post("embeddings", &body).await?;
        if response.data.len() != inputs.len() {
            return Err(ProviderError::Decode(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                response.data.len()
            )));
        }
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Content inside a ```json fence, or the trimmed input
fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        reply: String,
    }

    fn client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(
            server.uri(),
            "sk-test",
            "gpt-4o-mini",
            "text-embedding-3-small",
            Duration::from_secs(5),
        )
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_chat_json_sends_json_mode_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 200,
                "response_format": {"type": "json_object"},
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"reply": "Hello."}"#)))
            .expect(1)
            .mount(&server)
            .await;

        let reply: Reply = client(&server)
            .chat_json("be brief", Some("hi"), Sampling::CHAT)
            .await
            .unwrap();
        assert_eq!(reply.reply, "Hello.");
    }

    #[tokio::test]
    async fn test_chat_json_rejects_non_json_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("I refuse.")))
            .mount(&server)
            .await;

        let err = client(&server)
            .chat_json::<Reply>("sys", None, Sampling::THINK)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(msg) if msg.contains("I refuse.")));
    }

    #[tokio::test]
    async fn test_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client
            .chat_json::<Reply>("sys", None, Sampling::THINK)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status { status: 429, ref message } if message == "Rate limit reached"
        ));

        let err = client.embed(&["fact".to_string()]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized));
    }

    #[tokio::test]
    async fn test_embed_orders_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(json!({"model": "text-embedding-3-small"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            })))
            .mount(&server)
            .await;

        let vectors = client(&server)
            .embed(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_nothing_skips_the_request() {
        let server = MockServer::start().await;
        let vectors = client(&server).embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_from_env_requires_key() {
        let err = OpenAiClient::from_env(
            "DELIBERATION_TEST_KEY_THAT_IS_NEVER_SET",
            "http://localhost",
            "m",
            "e",
            Duration::from_secs(1),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ProviderError::MissingApiKey(var) if var.contains("NEVER_SET")));
    }
}
