//! Remote providers for the deliberation gateway.
//!
//! - [`endpoint`]: a deliberation service that already implements the four
//!   calls, reached over plain JSON POSTs
//! - [`openai`]: prompts rendered locally and sent to an OpenAI-compatible
//!   chat completions API

pub mod endpoint;
pub mod error;
pub mod openai;

pub use endpoint::RemoteDeliberationGateway;
pub use error::ProviderError;
pub use openai::{OpenAiClient, OpenAiDeliberationGateway};

use std::time::Duration;

/// Shared HTTP client with a request timeout
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Message for a non-success response: the `error` field of a JSON body, or the raw text
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| match v.get("error") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Object(o)) => o
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        })
        .unwrap_or_else(|| body.trim().to_string())
}
