//! OpenAI-compatible provider
//!
//! [`OpenAiClient`] speaks the chat completions and embeddings APIs;
//! [`OpenAiDeliberationGateway`] renders the deliberation prompts and parses
//! the JSON the model returns.

mod client;
mod gateway;

pub use client::{OpenAiClient, Sampling};
pub use gateway::OpenAiDeliberationGateway;
