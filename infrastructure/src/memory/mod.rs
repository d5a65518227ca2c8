//! Long-term memory about the person asking.
//!
//! [`LocalMemoryService`] implements the
//! [`MemoryGateway`](deliberation_application::MemoryGateway) port on top of a
//! [`VectorMemoryStore`] and an embedding model.

mod service;
mod tokens;
mod vector_store;

pub use service::{Embedder, FactExtractor, LocalMemoryService, MemoryThresholds};
pub use tokens::AccessTokens;
pub use vector_store::VectorMemoryStore;
