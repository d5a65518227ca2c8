//! Error types shared by the HTTP provider adapters

use deliberation_application::{GatewayError, MemoryError};
use thiserror::Error;

/// Errors raised while talking to a remote provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Provider rejected the credentials")]
    Unauthorized,

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            ProviderError::Http(e) => GatewayError::Transport(e.to_string()),
            ProviderError::Status { status: 400, message } => GatewayError::InvalidRequest(message),
            ProviderError::Status { status, message } => GatewayError::Status { status, message },
            ProviderError::Unauthorized | ProviderError::MissingApiKey(_) => {
                GatewayError::Unauthorized
            }
            ProviderError::Decode(message) => GatewayError::MalformedResponse(message),
        }
    }
}

impl From<ProviderError> for MemoryError {
    fn from(err: ProviderError) -> Self {
        MemoryError::Backend(err.to_string())
    }
}
