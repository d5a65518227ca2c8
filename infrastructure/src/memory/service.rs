//! Memory service: extraction, deduplication and recall

use super::tokens::AccessTokens;
use super::vector_store::VectorMemoryStore;
use crate::providers::{OpenAiClient, ProviderError, openai::Sampling};
use async_trait::async_trait;
use deliberation_application::{
    ExtractRequest, ExtractResponse, MemoryError, MemoryGateway, RecallRequest, RecallResponse,
};
use deliberation_domain::{MemoryRecord, PromptTemplate, render_conversation};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pulls personal facts out of a conversation
#[async_trait]
pub trait FactExtractor: Send + Sync {
    async fn extract_facts(&self, question: &str, conversation: &str)
    -> Result<Vec<String>, ProviderError>;
}

/// Turns texts into embedding vectors, one per input in order
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

#[derive(Deserialize)]
struct ExtractedFacts {
    #[serde(default)]
    memories: Vec<String>,
}

#[async_trait]
impl FactExtractor for OpenAiClient {
    async fn extract_facts(
        &self,
        question: &str,
        conversation: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let user = PromptTemplate::extract_user(question, conversation);
        let facts: ExtractedFacts = self
            .chat_json(PromptTemplate::extract_system(), Some(&user), Sampling::EXTRACT)
            .await?;
        Ok(facts.memories)
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        OpenAiClient::embed(self, inputs).await
    }
}

/// Similarity cut-offs of the memory service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryThresholds {
    /// A fact this similar to an existing memory is not stored again
    pub dedup: f32,
    /// Minimum similarity for recall
    pub recall: f32,
    pub recall_limit: usize,
}

impl Default for MemoryThresholds {
    fn default() -> Self {
        Self {
            dedup: 0.85,
            recall: 0.5,
            recall_limit: 10,
        }
    }
}

pub struct LocalMemoryService {
    store: Arc<VectorMemoryStore>,
    tokens: AccessTokens,
    extractor: Arc<dyn FactExtractor>,
    embedder: Arc<dyn Embedder>,
    thresholds: MemoryThresholds,
}

impl LocalMemoryService {
    pub fn new(
        store: Arc<VectorMemoryStore>,
        tokens: AccessTokens,
        extractor: Arc<dyn FactExtractor>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            store,
            tokens,
            extractor,
            embedder,
            thresholds: MemoryThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: MemoryThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn authorize(&self, token: &str) -> Result<String, MemoryError> {
        if token.trim().is_empty() {
            return Err(MemoryError::InvalidInput("accessToken is required".to_string()));
        }
        self.tokens
            .resolve(token)
            .map(str::to_string)
            .ok_or(MemoryError::Unauthorized)
    }

    async fn facts_for(&self, request: &ExtractRequest) -> Result<Vec<String>, MemoryError> {
        let facts = match request.direct_memory.as_deref().map(str::trim) {
            Some(fact) if !fact.is_empty() => vec![fact.to_string()],
            _ => {
                let conversation = render_conversation(&request.messages);
                self.extractor
                    .extract_facts(&request.question, &conversation)
                    .await?
            }
        };
        Ok(facts
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect())
    }
}

#[async_trait]
impl MemoryGateway for LocalMemoryService {
    async fn extract(&self, request: &ExtractRequest) -> Result<ExtractResponse, MemoryError> {
        let has_direct = request
            .direct_memory
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty());
        if request.messages.is_empty() && !has_direct {
            return Err(MemoryError::InvalidInput(
                "messages or directMemory is required".to_string(),
            ));
        }
        let user_id = self.authorize(&request.access_token)?;

        let facts = self.facts_for(request).await?;
        if facts.is_empty() {
            debug!("No facts extracted for {}", user_id);
            return Ok(ExtractResponse::default());
        }

        let embeddings = self.embedder.embed(&facts).await?;
        if embeddings.len() != facts.len() {
            return Err(MemoryError::Backend(format!(
                "expected {} embeddings, got {}",
                facts.len(),
                embeddings.len()
            )));
        }

        let mut stored = 0;
        for (fact, embedding) in facts.iter().zip(embeddings) {
            if !self
                .store
                .nearest(&user_id, &embedding, self.thresholds.dedup, 1)
                .is_empty()
            {
                debug!("Skipping near-duplicate memory: {}", fact);
                continue;
            }
            let record = MemoryRecord::new(&user_id, fact, embedding, &request.question);
            match self.store.insert(record) {
                Ok(()) => stored += 1,
                Err(e) => warn!("Failed to store memory: {}", e),
            }
        }

        info!("Stored {} of {} extracted memories", stored, facts.len());
        Ok(ExtractResponse {
            stored,
            total: facts.len(),
        })
    }

    async fn recall(&self, request: &RecallRequest) -> Result<RecallResponse, MemoryError> {
        if request.question.trim().is_empty() {
            return Err(MemoryError::InvalidInput("question is required".to_string()));
        }
        let user_id = self.authorize(&request.access_token)?;

        let embedding = self
            .embedder
            .embed(std::slice::from_ref(&request.question))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Backend("no embedding returned".to_string()))?;

        let memories = self
            .store
            .nearest(
                &user_id,
                &embedding,
                self.thresholds.recall,
                self.thresholds.recall_limit,
            )
            .into_iter()
            .map(|(_, record)| record.memory)
            .collect();
        Ok(RecallResponse { memories })
    }
}
