//! Question value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A question put to the crowd (Value Object)
///
/// The first message of a session becomes the question; everything the user
/// submits afterwards is a follow-up and never replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a question, rejecting empty or whitespace-only text.
    ///
    /// Surrounding whitespace is trimmed.
    pub fn parse(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidQuestion(
                "question cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            content: trimmed.to_string(),
        })
    }

    /// Try to create a question, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        Self::parse(content).ok()
    }

    /// Get the question content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl std::str::FromStr for Question {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_creation_trims() {
        let q = Question::parse("  Should I move to Berlin?  ").unwrap();
        assert_eq!(q.content(), "Should I move to Berlin?");
    }

    #[test]
    fn test_empty_question_rejected() {
        assert!(matches!(
            Question::parse(""),
            Err(DomainError::InvalidQuestion(_))
        ));
        assert!(Question::try_new("   ").is_none());
    }

    #[test]
    fn test_from_str() {
        let q: Question = "Is remote work better?".parse().unwrap();
        assert_eq!(q.to_string(), "Is remote work better?");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let q = Question::parse("Buy or rent?").unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"Buy or rent?\"");
    }
}
