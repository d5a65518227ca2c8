//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid group size bounds: min {min}, max {max}")]
    InvalidGroupBounds { min: usize, max: usize },

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("No agents in session")]
    NoAgents,
}

impl DomainError {
    /// Whether the error comes from caller input rather than session state
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidQuestion(_) | DomainError::InvalidGroupBounds { .. }
        )
    }
}
