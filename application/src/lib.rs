//! Application layer for crowd-deliberation
//!
//! This crate contains use cases, port definitions, the shared session
//! context and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod session;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::PipelineParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    deliberation_gateway::{
        ChatRequest, ChatResponse, ClusterRequest, ClusterResponse, DeliberationGateway,
        DiscussRequest, DiscussResponse, GatewayError, Participant, SpeakerContext, ThinkRequest,
        ThinkResponse,
    },
    history_repository::{HistoryError, HistoryRepository, NoHistory},
    memory_gateway::{
        ExtractRequest, ExtractResponse, MemoryError, MemoryGateway, RecallRequest, RecallResponse,
    },
    progress::{DeliberationProgress, NoProgress},
    world::{WorldError, WorldPort},
};
pub use session::{PhaseReader, SessionContext};
pub use use_cases::background_clusterer::BackgroundHandle;
pub use use_cases::chat_with_agent::{ChatError, ChatWithAgentUseCase};
pub use use_cases::controller::{DeliberationController, SubmitOutcome};
pub use use_cases::memory_access::MemoryAccess;
pub use use_cases::orchestrator::{DeliberationError, DeliberationOrchestrator};
