//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod deliberation_gateway;
pub mod history_repository;
pub mod memory_gateway;
pub mod progress;
pub mod world;
