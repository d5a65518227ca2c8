//! Memory access use case
//!
//! Wraps the memory gateway with the session's access token. A rejected token
//! turns memory off for the rest of the session; the pipeline carries on
//! without it.

use crate::ports::memory_gateway::{
    ExtractRequest, ExtractResponse, MemoryError, MemoryGateway, RecallRequest,
};
use deliberation_domain::{ConversationMessage, PromptTemplate};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

pub struct MemoryAccess {
    gateway: Arc<dyn MemoryGateway>,
    access_token: String,
    disabled: AtomicBool,
}

impl MemoryAccess {
    pub fn new(gateway: Arc<dyn MemoryGateway>, access_token: impl Into<String>) -> Self {
        Self {
            gateway,
            access_token: access_token.into(),
            disabled: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled.load(Ordering::Acquire)
    }

    fn note_failure(&self, operation: &str, error: &MemoryError) {
        if matches!(error, MemoryError::Unauthorized) {
            if !self.disabled.swap(true, Ordering::AcqRel) {
                warn!("Memory {} unauthorized; memory disabled for this session", operation);
            }
        } else {
            warn!("Memory {} failed: {}", operation, error);
        }
    }

    /// Extra think context built from memories relevant to `question`
    pub async fn recall_context(&self, question: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let request = RecallRequest {
            question: question.to_string(),
            access_token: self.access_token.clone(),
        };
        match self.gateway.recall(&request).await {
            Ok(response) => {
                debug!("Recalled {} memories", response.memories.len());
                PromptTemplate::memory_context(&response.memories)
            }
            Err(e) => {
                self.note_failure("recall", &e);
                None
            }
        }
    }

    /// Extract and store facts from a finished conversation
    pub async fn extract(
        &self,
        thread: &[ConversationMessage],
        question: &str,
    ) -> Result<ExtractResponse, MemoryError> {
        if !self.is_enabled() {
            return Err(MemoryError::Unauthorized);
        }
        let request = ExtractRequest {
            messages: thread.to_vec(),
            direct_memory: None,
            question: question.to_string(),
            access_token: self.access_token.clone(),
        };
        match self.gateway.extract(&request).await {
            Ok(response) => {
                info!("Stored {} of {} extracted memories", response.stored, response.total);
                Ok(response)
            }
            Err(e) => {
                self.note_failure("extract", &e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedMemory;

    #[tokio::test]
    async fn test_recall_formats_context() {
        let gateway = Arc::new(ScriptedMemory::with_memories(vec!["User is a nurse"]));
        let access = MemoryAccess::new(gateway, "token");

        let context = access.recall_context("Should I switch jobs?").await.unwrap();
        assert!(context.contains("- User is a nurse"));
    }

    #[tokio::test]
    async fn test_no_memories_no_context() {
        let gateway = Arc::new(ScriptedMemory::with_memories(vec![]));
        let access = MemoryAccess::new(gateway, "token");
        assert!(access.recall_context("Anything?").await.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_disables_memory() {
        let gateway = Arc::new(ScriptedMemory::unauthorized());
        let access = MemoryAccess::new(Arc::clone(&gateway) as Arc<dyn MemoryGateway>, "bad");

        assert!(access.recall_context("Anything?").await.is_none());
        assert!(!access.is_enabled());

        let result = access.extract(&[ConversationMessage::user("hi")], "Anything?").await;
        assert_eq!(result, Err(MemoryError::Unauthorized));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_backend_error_keeps_memory_enabled() {
        let gateway = Arc::new(ScriptedMemory::failing());
        let access = MemoryAccess::new(gateway, "token");

        assert!(access.recall_context("Anything?").await.is_none());
        assert!(access.is_enabled());
    }

    #[tokio::test]
    async fn test_extract_sends_thread() {
        let gateway = Arc::new(ScriptedMemory::with_memories(vec![]));
        let access = MemoryAccess::new(Arc::clone(&gateway) as Arc<dyn MemoryGateway>, "token");

        let thread = vec![ConversationMessage::user("I'm a nurse in Lyon")];
        let response = access.extract(&thread, "Move?").await.unwrap();
        assert_eq!(response.total, 1);
        let sent = gateway.last_extract().unwrap();
        assert_eq!(sent.messages, thread);
        assert_eq!(sent.access_token, "token");
    }
}
