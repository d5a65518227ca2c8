//! Infrastructure layer for crowd-deliberation
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod history;
pub mod logging;
pub mod memory;
pub mod providers;
pub mod world;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig, ProviderKind,
    Severity,
};
pub use history::{InMemoryHistoryRepository, JsonlHistoryRepository};
pub use logging::JsonlEventLogger;
pub use memory::{AccessTokens, LocalMemoryService, MemoryThresholds, VectorMemoryStore};
pub use providers::{
    OpenAiClient, OpenAiDeliberationGateway, ProviderError, RemoteDeliberationGateway,
};
pub use world::{PersonaCatalog, PersonaError, SimulatedWorld};
