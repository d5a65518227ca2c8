//! Use cases (application services)

pub mod background_clusterer;
pub mod chat_with_agent;
pub mod controller;
pub mod memory_access;
pub mod orchestrator;
